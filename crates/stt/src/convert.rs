//! Translation between the `OpenAI` request/response shapes and the backend job shapes
//!
//! Everything here is pure: no I/O, no clocks, no failure paths beyond the
//! completed-job contract check.

use crate::{
    error::SttError,
    types::{
        BackendJob, BackendJobRequest, JobStatus, ResponseFormat, Segment, TRANSCRIBE_TASK, TimedSpan,
        TranscriptionOutput, TranscriptionRequest, TranscriptionResponse,
    },
};

/// Backend job that reached `completed` with a transcript
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedJob {
    pub id: String,
    /// May be empty for silent audio
    pub text: String,
    pub audio_duration: Option<f64>,
    pub language_code: Option<String>,
    pub utterances: Vec<TimedSpan>,
    pub words: Vec<TimedSpan>,
}

impl TryFrom<BackendJob> for CompletedJob {
    type Error = SttError;

    fn try_from(job: BackendJob) -> Result<Self, Self::Error> {
        if job.status != JobStatus::Completed {
            return Err(SttError::MalformedResponse(format!(
                "job {} is {}, not completed",
                job.id, job.status
            )));
        }

        let text = job
            .text
            .ok_or_else(|| SttError::MalformedResponse(format!("completed job {} has no text", job.id)))?;

        Ok(Self {
            id: job.id,
            text,
            audio_duration: job.audio_duration,
            language_code: job.language_code,
            utterances: job.utterances.unwrap_or_default(),
            words: job.words.unwrap_or_default(),
        })
    }
}

/// Map a caller request onto the backend submission body
///
/// `model` and `temperature` are intentionally left behind.
pub fn to_backend_request(request: &TranscriptionRequest) -> BackendJobRequest {
    BackendJobRequest {
        audio_url: request.audio_url.clone(),
        language_code: request
            .language
            .as_deref()
            .map(str::trim)
            .filter(|language| !language.is_empty())
            .map(ToOwned::to_owned),
        word_boost: parse_word_boost(request.prompt.as_deref()),
    }
}

/// Split a prompt into vocabulary hints
///
/// Commas take precedence as separators; a prompt without commas is split on
/// whitespace. Empty tokens are dropped and order is kept.
pub fn parse_word_boost(prompt: Option<&str>) -> Vec<String> {
    let Some(prompt) = prompt else {
        return Vec::new();
    };

    let tokens: Box<dyn Iterator<Item = &str>> = if prompt.contains(',') {
        Box::new(prompt.split(','))
    } else {
        Box::new(prompt.split_whitespace())
    };

    tokens
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Shape a completed job into the caller-facing body
///
/// `request_language` is echoed when the backend does not report a language.
pub fn to_caller_output(
    job: CompletedJob,
    format: ResponseFormat,
    request_language: Option<&str>,
) -> TranscriptionOutput {
    match format {
        ResponseFormat::Text => TranscriptionOutput::Text(job.text),
        ResponseFormat::Json => TranscriptionOutput::Json(to_caller_response(job, request_language)),
    }
}

pub fn to_caller_response(job: CompletedJob, request_language: Option<&str>) -> TranscriptionResponse {
    let segments = if job.utterances.is_empty() {
        build_segments(&job.words)
    } else {
        build_segments(&job.utterances)
    };

    TranscriptionResponse {
        text: job.text,
        task: TRANSCRIBE_TASK.to_string(),
        language: job.language_code.or_else(|| request_language.map(ToOwned::to_owned)),
        duration: job.audio_duration,
        segments,
    }
}

fn build_segments(spans: &[TimedSpan]) -> Vec<Segment> {
    spans
        .iter()
        .enumerate()
        .map(|(id, span)| Segment {
            id,
            seek: span.start,
            start: millis_to_seconds(span.start),
            end: millis_to_seconds(span.end),
            text: span.text.clone(),
            speaker: span.speaker.clone(),
            tokens: Vec::new(),
            temperature: 0.0,
            avg_logprob: 0.0,
            compression_ratio: 1.0,
            no_speech_prob: 0.0,
        })
        .collect()
}

fn millis_to_seconds(millis: u32) -> f64 {
    f64::from(millis) / 1000.0
}

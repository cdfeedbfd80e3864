use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Value of `task` in every transcription response
pub const TRANSCRIBE_TASK: &str = "transcribe";

/// Validated transcription request in `OpenAI` audio API shape
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    /// Remote audio location, an absolute http(s) URL kept exactly as sent
    pub audio_url: String,
    /// Accepted for compatibility, never forwarded
    pub model: Option<String>,
    /// Optional language hint (ISO 639-1)
    pub language: Option<String>,
    /// Free text used as vocabulary hints
    pub prompt: Option<String>,
    pub response_format: ResponseFormat,
    /// Accepted for compatibility, never forwarded
    pub temperature: Option<f64>,
}

/// Body encoding of a successful transcription
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(ascii_case_insensitive)]
pub enum ResponseFormat {
    /// JSON envelope with text, language, duration and segments
    #[default]
    #[strum(to_string = "json", serialize = "verbose_json")]
    Json,
    /// Bare transcript text
    #[strum(to_string = "text")]
    Text,
}

/// Job submission body for the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendJobRequest {
    pub audio_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub word_boost: Vec<String>,
}

/// Lifecycle status reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Error,
    /// Any status this proxy does not know about
    #[serde(other)]
    Unknown,
}

/// Backend transcript job as returned by the status endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct BackendJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "error")]
    pub error_detail: Option<String>,
    /// Audio length in seconds
    #[serde(default)]
    pub audio_duration: Option<f64>,
    /// Language used or detected by the backend
    #[serde(default)]
    pub language_code: Option<String>,
    /// Speaker turns, present when diarization ran
    #[serde(default)]
    pub utterances: Option<Vec<TimedSpan>>,
    #[serde(default)]
    pub words: Option<Vec<TimedSpan>>,
}

/// Span of recognized text with millisecond offsets
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TimedSpan {
    #[serde(default)]
    pub start: u32,
    #[serde(default)]
    pub end: u32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub speaker: Option<String>,
}

/// Transcription response following `OpenAI` Whisper API format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
    pub task: String,
    pub language: Option<String>,
    /// Audio length in seconds
    pub duration: Option<f64>,
    pub segments: Vec<Segment>,
}

/// Whisper-style timed segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    /// Start offset in milliseconds
    pub seek: u32,
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub tokens: Vec<u32>,
    pub temperature: f64,
    pub avg_logprob: f64,
    pub compression_ratio: f64,
    pub no_speech_prob: f64,
}

/// Caller-facing success body
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptionOutput {
    Json(TranscriptionResponse),
    Text(String),
}

impl IntoResponse for TranscriptionOutput {
    fn into_response(self) -> Response {
        match self {
            Self::Json(body) => Json(body).into_response(),
            Self::Text(text) => text.into_response(),
        }
    }
}

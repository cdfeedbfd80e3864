use async_trait::async_trait;
use http::{HeaderValue, header};
use murmur_config::BackendConfig;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    error::SttError,
    http_client::http_client,
    types::{BackendJob, BackendJobRequest},
};

use super::TranscriptBackend;

/// `AssemblyAI` v2 transcript API
pub struct AssemblyAiProvider {
    client: Client,
    name: String,
    base_url: Url,
    api_key: SecretString,
    punctuate: bool,
    format_text: bool,
    speaker_labels: bool,
}

impl AssemblyAiProvider {
    pub fn new(config: &BackendConfig) -> crate::error::Result<Self> {
        let client = http_client(config.request_timeout)
            .map_err(|e| SttError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            name: "assemblyai".to_string(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            punctuate: config.punctuate,
            format_text: config.format_text,
            speaker_labels: config.speaker_labels,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn auth_header(&self) -> crate::error::Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.api_key.expose_secret())
            .map_err(|_| SttError::ConfigError("backend API key is not a valid header value".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[derive(Serialize)]
struct SubmitBody<'a> {
    #[serde(flatten)]
    job: &'a BackendJobRequest,
    punctuate: bool,
    format_text: bool,
    speaker_labels: bool,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[async_trait]
impl TranscriptBackend for AssemblyAiProvider {
    async fn submit(&self, request: &BackendJobRequest) -> crate::error::Result<String> {
        let url = self.endpoint(&["transcript"]);

        tracing::debug!(
            audio_url = %request.audio_url,
            language_code = ?request.language_code,
            word_boost = request.word_boost.len(),
            "submitting AssemblyAI transcript job"
        );

        let body = SubmitBody {
            job: request,
            punctuate: self.punctuate,
            format_text: self.format_text,
            speaker_labels: self.speaker_labels,
        };

        let response = self
            .client
            .post(url)
            .header(header::AUTHORIZATION, self.auth_header()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("AssemblyAI submit request failed: {e}");
                SttError::UpstreamUnavailable(format!("failed to send request to AssemblyAI: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let submitted: SubmitResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse AssemblyAI submit response: {e}");
            SttError::MalformedResponse(format!("unreadable submit response: {e}"))
        })?;

        let id = submitted
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| SttError::MalformedResponse("submit response has no job id".to_string()))?;

        tracing::info!(job_id = %id, "AssemblyAI transcript job submitted");

        Ok(id)
    }

    async fn poll(&self, job_id: &str) -> crate::error::Result<BackendJob> {
        let url = self.endpoint(&["transcript", job_id]);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth_header()?)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(job_id, "AssemblyAI status request failed: {e}");
                SttError::UpstreamUnavailable(format!("failed to fetch job status from AssemblyAI: {e}"))
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json().await.map_err(|e| {
            tracing::error!(job_id, "Failed to parse AssemblyAI status response: {e}");
            SttError::MalformedResponse(format!("unreadable status response: {e}"))
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Classify a non-success backend response
async fn error_from_response(response: Response) -> SttError {
    let status = response.status();

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok());

    let raw = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&raw)
        .map(|body| body.error)
        .ok()
        .or_else(|| Some(raw.trim().to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    tracing::error!("AssemblyAI API error ({status}): {message}");

    match status.as_u16() {
        401 | 403 => SttError::AuthenticationFailed(message),
        429 => SttError::RateLimited { message, retry_after },
        code @ 400..=499 => SttError::UpstreamRejected { status: code, message },
        _ => SttError::UpstreamUnavailable(format!("AssemblyAI returned {status}: {message}")),
    }
}

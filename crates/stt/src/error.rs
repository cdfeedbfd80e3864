use std::time::Duration;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

/// Transcription errors with their caller-facing classification
#[derive(Debug, Error)]
pub enum SttError {
    /// Caller request failed validation
    #[error("{message}")]
    InvalidRequest { code: &'static str, message: String },

    /// Request body is not in a supported encoding
    #[error("Unsupported Content-Type '{0}', expected application/json, multipart/form-data or application/x-www-form-urlencoded")]
    UnsupportedMediaType(String),

    /// Backend rejected the configured API key
    #[error("Authentication with the transcription backend failed: {0}")]
    AuthenticationFailed(String),

    /// Backend finished the job with an error status
    #[error("Transcription failed: {0}")]
    JobFailed(String),

    /// Backend answered a call with a 4xx
    #[error("Transcription backend rejected the request ({status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Backend could not be reached or answered with a 5xx
    #[error("Transcription backend is unreachable: {0}")]
    UpstreamUnavailable(String),

    /// Backend throttled the call
    #[error("Transcription backend rate limit exceeded: {message}")]
    RateLimited { message: String, retry_after: Option<u64> },

    /// Backend response is missing fields its status promises
    #[error("Malformed response from transcription backend: {0}")]
    MalformedResponse(String),

    /// Job did not finish before the deadline
    #[error("Transcription timed out after {} seconds", after.as_secs())]
    TimedOut { job_id: String, after: Duration },

    /// Server could not be built from configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl SttError {
    pub(crate) fn invalid(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            code,
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error
    ///
    /// The status follows the error type; `code` carries the finer subtype.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } | Self::UnsupportedMediaType(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::JobFailed(_)
            | Self::UpstreamRejected { .. }
            | Self::UpstreamUnavailable(_)
            | Self::RateLimited { .. }
            | Self::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } | Self::UnsupportedMediaType(_) => "invalid_request_error",
            Self::AuthenticationFailed(_) => "authentication_error",
            Self::TimedOut { .. } => "timeout_error",
            Self::JobFailed(_)
            | Self::UpstreamRejected { .. }
            | Self::UpstreamUnavailable(_)
            | Self::RateLimited { .. }
            | Self::MalformedResponse(_)
            | Self::ConfigError(_) => "api_error",
        }
    }

    /// Short machine-readable token
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { code, .. } => *code,
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::AuthenticationFailed(_) => "invalid_api_key",
            Self::JobFailed(_) => "transcription_failed",
            Self::UpstreamRejected { .. } => "upstream_rejected",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
            Self::RateLimited { .. } => "upstream_rate_limited",
            Self::MalformedResponse(_) => "malformed_upstream_response",
            Self::TimedOut { .. } => "transcription_timeout",
            Self::ConfigError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::UpstreamUnavailable(_) => "Transcription backend is unreachable".to_string(),
            Self::ConfigError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Whether a status poll failing this way may succeed on a later attempt
    pub(crate) const fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_))
    }
}

/// Error response format compatible with `OpenAI` API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: &'static str,
    code: &'static str,
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type(),
                code: self.code(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let Self::RateLimited {
            retry_after: Some(seconds),
            ..
        } = self
        {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }

        response
    }
}

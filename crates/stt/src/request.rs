use axum::{
    body::Body,
    extract::{FromRequest, Multipart},
};
use http_body_util::LengthLimitError;
use serde::Deserialize;
use url::Url;

use crate::{
    error::SttError,
    types::{ResponseFormat, TranscriptionRequest},
};

/// Body limit for transcription requests (1 MiB)
///
/// Requests carry a URL, never audio bytes.
const BODY_LIMIT_BYTES: usize = 1 << 20;

/// Extractor for a validated transcription request
///
/// Accepts JSON, urlencoded and multipart bodies. A missing `Content-Type`
/// is read as JSON.
pub struct ExtractTranscription(pub TranscriptionRequest);

impl<S> FromRequest<S> for ExtractTranscription
where
    S: Send + Sync,
{
    type Rejection = SttError;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        let content_type = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let encoding = BodyEncoding::from_content_type(&content_type)
            .ok_or_else(|| SttError::UnsupportedMediaType(content_type.clone()))?;

        let bytes = axum::body::to_bytes(body, BODY_LIMIT_BYTES).await.map_err(|err| {
            let inner = err.into_inner();
            if inner.downcast_ref::<LengthLimitError>().is_some() {
                SttError::invalid(
                    "invalid_request_body",
                    format!("Request body exceeds the {BODY_LIMIT_BYTES} byte limit"),
                )
            } else {
                SttError::invalid("invalid_request_body", format!("Failed to read request body: {inner}"))
            }
        })?;

        let raw = match encoding {
            BodyEncoding::Json => serde_json::from_slice::<RawTranscriptionRequest>(&bytes)
                .map_err(|e| SttError::invalid("invalid_request_body", format!("Invalid JSON body: {e}")))?,
            BodyEncoding::Form => {
                let mut raw = RawTranscriptionRequest::default();
                for (name, value) in url::form_urlencoded::parse(&bytes) {
                    raw.set_field(&name, value.into_owned())?;
                }
                raw
            }
            BodyEncoding::Multipart => {
                // Reassemble the request for multipart parsing
                let mut rebuilt = http::Request::builder()
                    .method(parts.method.clone())
                    .uri(parts.uri.clone());

                for (key, value) in &parts.headers {
                    rebuilt = rebuilt.header(key, value);
                }

                let rebuilt = rebuilt.body(Body::from(bytes)).map_err(|e| {
                    SttError::invalid("invalid_request_body", format!("Failed to rebuild request: {e}"))
                })?;

                let multipart = Multipart::from_request(rebuilt, &()).await.map_err(|e| {
                    SttError::invalid("invalid_request_body", format!("Failed to parse multipart form: {e}"))
                })?;

                RawTranscriptionRequest::from_multipart(multipart).await?
            }
        };

        Ok(Self(raw.validate()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEncoding {
    Json,
    Form,
    Multipart,
}

impl BodyEncoding {
    fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

        match essence.as_str() {
            "application/x-www-form-urlencoded" => Some(Self::Form),
            "multipart/form-data" => Some(Self::Multipart),
            json if json.is_empty() || json == "application/json" || json.ends_with("+json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Request fields as sent, before validation
#[derive(Debug, Default, Deserialize)]
struct RawTranscriptionRequest {
    #[serde(default)]
    audio_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    response_format: Option<String>,
    #[serde(default)]
    temperature: Option<NumberOrText>,
}

/// JSON clients send numbers, form clients send strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl RawTranscriptionRequest {
    fn set_field(&mut self, name: &str, value: String) -> crate::error::Result<()> {
        match name {
            "audio_url" => self.audio_url = Some(value),
            "model" => self.model = Some(value),
            "language" => self.language = Some(value),
            "prompt" => self.prompt = Some(value),
            "response_format" => self.response_format = Some(value),
            "temperature" => self.temperature = Some(NumberOrText::Text(value)),
            "file" => return Err(file_upload_unsupported()),
            _ => tracing::trace!(field = name, "Ignoring unknown form field"),
        }

        Ok(())
    }

    async fn from_multipart(mut multipart: Multipart) -> crate::error::Result<Self> {
        let mut raw = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| SttError::invalid("invalid_request_body", format!("Failed to parse multipart form: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                return Err(file_upload_unsupported());
            }

            let value = field.text().await.map_err(|e| {
                SttError::invalid("invalid_request_body", format!("Failed to read {name} field: {e}"))
            })?;

            raw.set_field(&name, value)?;
        }

        Ok(raw)
    }

    fn validate(self) -> crate::error::Result<TranscriptionRequest> {
        let audio_url = non_blank(self.audio_url)
            .ok_or_else(|| SttError::invalid("missing_audio_url", "'audio_url' is required"))?;
        check_audio_url(&audio_url)?;

        let response_format = match non_blank(self.response_format) {
            None => ResponseFormat::default(),
            Some(format) => format.parse().map_err(|_| {
                SttError::invalid(
                    "invalid_response_format",
                    format!("Unsupported response_format '{format}', expected 'json' or 'text'"),
                )
            })?,
        };

        let temperature = match self.temperature {
            None => None,
            Some(NumberOrText::Number(value)) => Some(finite_temperature(value)?),
            Some(NumberOrText::Text(text)) if text.trim().is_empty() => None,
            Some(NumberOrText::Text(text)) => {
                let value = text.trim().parse::<f64>().map_err(|_| invalid_temperature())?;
                Some(finite_temperature(value)?)
            }
        };

        Ok(TranscriptionRequest {
            audio_url,
            model: non_blank(self.model),
            language: non_blank(self.language),
            prompt: non_blank(self.prompt),
            response_format,
            temperature,
        })
    }
}

/// Reject anything but an absolute http(s) URL
///
/// The parsed form is discarded; the backend receives the caller's text.
fn check_audio_url(raw: &str) -> crate::error::Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| SttError::invalid("invalid_audio_url", format!("'audio_url' is not a valid URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(SttError::invalid(
            "invalid_audio_url",
            "'audio_url' must be an http or https URL",
        ));
    }

    Ok(())
}

fn finite_temperature(value: f64) -> crate::error::Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid_temperature())
    }
}

fn invalid_temperature() -> SttError {
    SttError::invalid("invalid_temperature", "'temperature' must be a number")
}

fn file_upload_unsupported() -> SttError {
    SttError::invalid(
        "file_upload_unsupported",
        "Audio file uploads are not supported, pass 'audio_url' instead",
    )
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

pub mod convert;
mod error;
mod http_client;
mod poll;
mod provider;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{Router, extract::State, routing::post};

pub use error::{Result, SttError};
pub use poll::{JobRunner, JobState, PollPolicy, Step, advance};
pub use provider::{TranscriptBackend, assemblyai::AssemblyAiProvider};
pub use request::ExtractTranscription;
pub use server::{Server, SttServerBuilder};
pub use types::{
    BackendJob, BackendJobRequest, JobStatus, ResponseFormat, Segment, TimedSpan, TranscriptionOutput,
    TranscriptionRequest, TranscriptionResponse,
};

/// Build the STT server from configuration
///
/// # Errors
///
/// Returns an error if the server fails to initialize
pub fn build_server(config: &murmur_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        SttServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize STT server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for STT
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new().route("/v1/audio/transcriptions", post(transcribe))
}

/// Handle transcription requests
async fn transcribe(
    State(server): State<Arc<Server>>,
    ExtractTranscription(request): ExtractTranscription,
) -> Result<TranscriptionOutput> {
    tracing::debug!(
        audio_url = %request.audio_url,
        response_format = %request.response_format,
        "STT transcription handler called"
    );

    server.transcribe(request).await
}

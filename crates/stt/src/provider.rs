pub(crate) mod assemblyai;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;

use crate::types::{BackendJob, BackendJobRequest};

/// Asynchronous transcription job API
///
/// A backend-reported job error is a successful [`poll`](Self::poll) that
/// yields a job with status `error`; only failed calls return `Err`.
#[async_trait]
pub trait TranscriptBackend: Send + Sync {
    /// Create a job and return its identifier
    async fn submit(&self, request: &BackendJobRequest) -> crate::error::Result<String>;

    /// Fetch the current state of a job
    async fn poll(&self, job_id: &str) -> crate::error::Result<BackendJob>;

    /// Get the provider name
    fn name(&self) -> &str;
}

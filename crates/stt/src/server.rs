use std::sync::Arc;

use crate::{
    convert::{to_backend_request, to_caller_output},
    poll::{JobRunner, PollPolicy},
    provider::{TranscriptBackend, assemblyai::AssemblyAiProvider},
    types::{TranscriptionOutput, TranscriptionRequest},
};

/// Translates caller requests into backend jobs and back
pub struct Server {
    runner: JobRunner,
}

impl Server {
    pub fn new(backend: Arc<dyn TranscriptBackend>, policy: PollPolicy) -> Self {
        Self {
            runner: JobRunner::new(backend, policy),
        }
    }

    /// Run one transcription end to end
    pub(crate) async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> crate::error::Result<TranscriptionOutput> {
        if request.model.is_some() || request.temperature.is_some() {
            tracing::debug!(
                model = ?request.model,
                temperature = ?request.temperature,
                "Accepted but ignored transcription parameters"
            );
        }

        let job_request = to_backend_request(&request);
        let job = self.runner.run(&job_request).await?;

        tracing::debug!(
            job_id = %job.id,
            chars = job.text.len(),
            duration = ?job.audio_duration,
            "Transcription complete"
        );

        Ok(to_caller_output(job, request.response_format, request.language.as_deref()))
    }
}

/// Builder for constructing the STT server from configuration
pub struct SttServerBuilder<'a> {
    config: &'a murmur_config::Config,
}

impl<'a> SttServerBuilder<'a> {
    pub fn new(config: &'a murmur_config::Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> crate::error::Result<Server> {
        let backend = AssemblyAiProvider::new(&self.config.backend)?;
        let policy = PollPolicy::from(&self.config.polling);

        tracing::debug!(
            backend = backend.name(),
            base_url = %self.config.backend.base_url,
            timeout = ?policy.timeout,
            interval = ?policy.interval,
            "STT server initialized"
        );

        Ok(Server::new(Arc::new(backend), policy))
    }
}

//! In-memory backend that replays a fixed script of replies

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::{
    error::SttError,
    types::{BackendJob, BackendJobRequest, JobStatus},
};

use super::TranscriptBackend;

pub(crate) struct ScriptedBackend {
    submit_error: Mutex<Option<SttError>>,
    replies: Mutex<VecDeque<Result<BackendJob, SttError>>>,
    submitted: Mutex<Vec<BackendJobRequest>>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl ScriptedBackend {
    /// Backend whose job stays `processing` once the script runs out
    pub(crate) fn new() -> Self {
        Self {
            submit_error: Mutex::new(None),
            replies: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    pub(crate) fn failing_submit(error: SttError) -> Self {
        let backend = Self::new();
        *backend.submit_error.lock().unwrap() = Some(error);
        backend
    }

    pub(crate) fn then(self, status: JobStatus) -> Self {
        self.replies.lock().unwrap().push_back(Ok(job(status)));
        self
    }

    pub(crate) fn then_job(self, job: BackendJob) -> Self {
        self.replies.lock().unwrap().push_back(Ok(job));
        self
    }

    pub(crate) fn then_err(self, error: SttError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub(crate) fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn submitted(&self) -> Vec<BackendJobRequest> {
        self.submitted.lock().unwrap().clone()
    }
}

pub(crate) fn job(status: JobStatus) -> BackendJob {
    BackendJob {
        id: "tx_test".to_string(),
        status,
        text: None,
        error_detail: None,
        audio_duration: None,
        language_code: None,
        utterances: None,
        words: None,
    }
}

pub(crate) fn completed(text: &str, duration: f64) -> BackendJob {
    BackendJob {
        text: Some(text.to_string()),
        audio_duration: Some(duration),
        ..job(JobStatus::Completed)
    }
}

pub(crate) fn failed(detail: &str) -> BackendJob {
    BackendJob {
        error_detail: Some(detail.to_string()),
        ..job(JobStatus::Error)
    }
}

#[async_trait]
impl TranscriptBackend for ScriptedBackend {
    async fn submit(&self, request: &BackendJobRequest) -> crate::error::Result<String> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request.clone());

        match self.submit_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok("tx_test".to_string()),
        }
    }

    async fn poll(&self, _job_id: &str) -> crate::error::Result<BackendJob> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(job(JobStatus::Processing)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

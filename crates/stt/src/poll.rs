//! Submit/poll loop driving a backend job to a terminal state

use std::{sync::Arc, time::Duration};

use murmur_config::PollingConfig;
use tokio::time::Instant;

use crate::{
    convert::CompletedJob,
    error::SttError,
    provider::TranscriptBackend,
    types::{BackendJob, BackendJobRequest, JobStatus},
};

/// Deadline and pacing of the polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Budget counted from successful submission
    pub timeout: Duration,
    /// Pause between consecutive polls
    pub interval: Duration,
    /// Consecutive transient poll failures tolerated
    pub max_poll_failures: u32,
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            timeout: config.timeout(),
            interval: config.interval,
            max_poll_failures: config.max_poll_failures,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingConfig::default())
    }
}

/// Non-terminal position of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JobState {
    Submitting,
    Queued,
    Processing,
}

/// Outcome of applying one status reply
#[derive(Debug)]
pub enum Step {
    Pending(JobState),
    Done(crate::error::Result<CompletedJob>),
}

/// Transition for a single poll reply
///
/// Statuses this proxy does not recognize leave the state untouched so the
/// deadline still bounds the job.
pub fn advance(state: JobState, job: BackendJob) -> Step {
    match job.status {
        JobStatus::Queued => Step::Pending(JobState::Queued),
        JobStatus::Processing => Step::Pending(JobState::Processing),
        JobStatus::Completed => Step::Done(CompletedJob::try_from(job)),
        JobStatus::Error => {
            let detail = job.error_detail.unwrap_or_else(|| "unknown error".to_string());
            Step::Done(Err(SttError::JobFailed(detail)))
        }
        JobStatus::Unknown => {
            tracing::warn!(job_id = %job.id, %state, "Backend reported an unrecognized job status");
            Step::Pending(state)
        }
    }
}

/// Runs one job per call; holds no per-job state between calls
pub struct JobRunner {
    backend: Arc<dyn TranscriptBackend>,
    policy: PollPolicy,
}

impl JobRunner {
    pub fn new(backend: Arc<dyn TranscriptBackend>, policy: PollPolicy) -> Self {
        Self { backend, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Submit a job and poll it until it completes, fails or runs out of time
    ///
    /// Dropping the returned future abandons the job and any in-flight call.
    pub async fn run(&self, request: &BackendJobRequest) -> crate::error::Result<CompletedJob> {
        let backend = self.backend.name();
        tracing::debug!(backend, state = %JobState::Submitting, "Starting transcription job");

        let job_id = self.backend.submit(request).await?;
        let deadline = Instant::now() + self.policy.timeout;

        let mut state = JobState::Queued;
        let mut failures = 0_u32;
        let mut polls = 0_u32;

        loop {
            if Instant::now() > deadline {
                tracing::warn!(backend, job_id = %job_id, polls, "Transcription job exceeded its deadline");

                return Err(SttError::TimedOut {
                    job_id,
                    after: self.policy.timeout,
                });
            }

            polls += 1;

            match self.backend.poll(&job_id).await {
                Ok(job) => {
                    failures = 0;

                    match advance(state, job) {
                        Step::Pending(next) => {
                            if next != state {
                                tracing::debug!(backend, job_id = %job_id, from = %state, to = %next, "Job state changed");
                            }
                            state = next;
                        }
                        Step::Done(outcome) => {
                            match &outcome {
                                Ok(_) => tracing::debug!(backend, job_id = %job_id, polls, "Transcription job completed"),
                                Err(e) => tracing::warn!(backend, job_id = %job_id, polls, "Transcription job failed: {e}"),
                            }
                            return outcome;
                        }
                    }
                }
                Err(e) if e.is_transient() && failures < self.policy.max_poll_failures => {
                    failures += 1;
                    tracing::warn!(backend, job_id = %job_id, failures, "Status poll failed, will retry: {e}");
                }
                Err(e) => return Err(e),
            }

            tokio::time::sleep(self.policy.interval).await;
        }
    }
}

//! Mock AssemblyAI backend for integration tests
//!
//! Accepts transcript submissions and replays a scripted sequence of job
//! states on each status poll; the last entry repeats once the script runs out.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Job id handed out by every submission
pub const JOB_ID: &str = "tx_mock";

/// Mock transcript API with scripted job states
pub struct MockAssemblyAi {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    submit_count: AtomicU32,
    poll_count: AtomicU32,
    /// Status and message returned for every submission instead of a job
    reject_submit: Option<(StatusCode, String)>,
    polls: Vec<Value>,
    last_submission: Mutex<Option<Value>>,
    last_authorization: Mutex<Option<String>>,
}

impl MockAssemblyAi {
    /// Start a backend whose polls walk through `polls`
    pub async fn start(polls: Vec<Value>) -> anyhow::Result<Self> {
        Self::start_inner(polls, None).await
    }

    /// Start a backend that rejects every submission
    pub async fn start_rejecting(status: u16, message: &str) -> anyhow::Result<Self> {
        let status = StatusCode::from_u16(status)?;
        Self::start_inner(Vec::new(), Some((status, message.to_owned()))).await
    }

    async fn start_inner(polls: Vec<Value>, reject_submit: Option<(StatusCode, String)>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            submit_count: AtomicU32::new(0),
            poll_count: AtomicU32::new(0),
            reject_submit,
            polls,
            last_submission: Mutex::new(None),
            last_authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v2/transcript", routing::post(handle_submit))
            .route("/v2/transcript/{id}", routing::get(handle_poll))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the backend
    pub fn base_url(&self) -> String {
        format!("http://{}/v2", self.addr)
    }

    /// Number of transcript submissions received
    pub fn submit_count(&self) -> u32 {
        self.state.submit_count.load(Ordering::Relaxed)
    }

    /// Number of status polls received
    pub fn poll_count(&self) -> u32 {
        self.state.poll_count.load(Ordering::Relaxed)
    }

    /// Body of the most recent submission
    pub fn last_submission(&self) -> Option<Value> {
        self.state.last_submission.lock().unwrap().clone()
    }

    /// `authorization` header of the most recent request
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

impl Drop for MockAssemblyAi {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Job reply with only a status
pub fn status(status: &str) -> Value {
    json!({ "id": JOB_ID, "status": status })
}

/// Completed job reply with word timings
pub fn completed(text: &str, audio_duration: f64) -> Value {
    let words: Vec<Value> = text
        .split_whitespace()
        .enumerate()
        .map(|(i, word)| {
            let start = i * 500;
            json!({ "start": start, "end": start + 400, "text": word, "confidence": 0.97, "speaker": null })
        })
        .collect();

    json!({
        "id": JOB_ID,
        "status": "completed",
        "text": text,
        "audio_duration": audio_duration,
        "language_code": "en_us",
        "utterances": null,
        "words": words,
        "error": null
    })
}

/// Failed job reply
pub fn failed(detail: &str) -> Value {
    json!({ "id": JOB_ID, "status": "error", "error": detail })
}

fn record_authorization(state: &MockState, headers: &HeaderMap) {
    let value = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    *state.last_authorization.lock().unwrap() = value;
}

async fn handle_submit(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.submit_count.fetch_add(1, Ordering::Relaxed);
    record_authorization(&state, &headers);
    *state.last_submission.lock().unwrap() = Some(body);

    if let Some((status, message)) = &state.reject_submit {
        return (*status, Json(json!({ "error": message })));
    }

    (StatusCode::OK, Json(status("queued")))
}

async fn handle_poll(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let index = state.poll_count.fetch_add(1, Ordering::Relaxed) as usize;
    record_authorization(&state, &headers);

    if id != JOB_ID {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Transcript not found" })));
    }

    let reply = state
        .polls
        .get(index)
        .or_else(|| state.polls.last())
        .cloned()
        .unwrap_or_else(|| status("processing"));

    (StatusCode::OK, Json(reply))
}

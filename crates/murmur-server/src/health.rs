use axum::{Json, response::IntoResponse};
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    /// RFC 3339, UTC
    timestamp: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let body = HealthStatus {
        status: "healthy",
        timestamp: jiff::Timestamp::now().to_string(),
    };

    (StatusCode::OK, Json(body))
}

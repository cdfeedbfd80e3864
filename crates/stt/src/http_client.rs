use std::time::Duration;

use axum::http;
use reqwest::Client;

/// HTTP client shared by all calls to one backend
///
/// `request_timeout` bounds each individual submit or status call; the
/// job-level deadline is enforced by the polling loop.
pub fn http_client(request_timeout: Duration) -> reqwest::Result<Client> {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(request_timeout)
        .pool_idle_timeout(Some(Duration::from_secs(30)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
}

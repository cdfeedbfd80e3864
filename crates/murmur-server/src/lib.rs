mod health;

use std::net::SocketAddr;

use axum::Router;
use murmur_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the transcription backend client cannot be built
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config.server.listen_address();

        let stt_state = stt::build_server(config)?;

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Transcription routes
        app = app.merge(stt::endpoint_router().with_state(stt_state));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Replace the listen address, e.g. from a command-line override
    #[must_use]
    pub fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered. Requests still
    /// polling a backend job are dropped together with their connection.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http_body_util::BodyExt;
    use murmur_config::{BackendConfig, HealthConfig, PollingConfig, ServerConfig, TelemetryConfig};
    use secrecy::SecretString;
    use tower::ServiceExt;

    use super::*;

    fn config(health: HealthConfig) -> Config {
        Config {
            server: ServerConfig {
                listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 9090))),
                health,
            },
            backend: BackendConfig::with_api_key(SecretString::from("test-key")),
            polling: PollingConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }

    async fn get(router: Router, path: &str) -> (http::StatusCode, Vec<u8>) {
        let request = http::Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn health_reports_status_and_timestamp() {
        let server = Server::new(&config(HealthConfig::default())).unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([127, 0, 0, 1], 9090)));

        let (status, body) = get(server.into_router(), "/health").await;
        assert_eq!(status, http::StatusCode::OK);

        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["status"], "healthy");

        let timestamp = body["timestamp"].as_str().unwrap();
        assert!(timestamp.parse::<jiff::Timestamp>().is_ok(), "timestamp: {timestamp}");
        assert!(timestamp.ends_with('Z'));
    }

    #[tokio::test]
    async fn health_path_is_configurable() {
        let health = HealthConfig {
            enabled: true,
            path: "/healthz".to_string(),
        };
        let router = Server::new(&config(health)).unwrap().into_router();

        let (status, _) = get(router.clone(), "/healthz").await;
        assert_eq!(status, http::StatusCode::OK);

        let (status, _) = get(router, "/health").await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_can_be_disabled() {
        let health = HealthConfig {
            enabled: false,
            ..HealthConfig::default()
        };
        let router = Server::new(&config(health)).unwrap().into_router();

        let (status, _) = get(router, "/health").await;
        assert_eq!(status, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn listen_override() {
        let server = Server::new(&config(HealthConfig::default()))
            .unwrap()
            .with_listen_address(SocketAddr::from(([0, 0, 0, 0], 7000)));

        assert_eq!(server.listen_address().port(), 7000);
    }
}

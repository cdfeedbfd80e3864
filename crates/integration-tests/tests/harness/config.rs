//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::time::Duration;

use murmur_config::{BackendConfig, Config, HealthConfig, PollingConfig, ServerConfig, TelemetryConfig};
use secrecy::SecretString;

/// API key the mock backend sees
pub const TEST_API_KEY: &str = "test-key";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder pointed at a mock backend, polling every 10ms
    pub fn new(backend_url: &str) -> Self {
        let mut backend = BackendConfig::with_api_key(SecretString::from(TEST_API_KEY));
        backend.base_url = backend_url.parse().expect("valid URL");

        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                backend,
                polling: PollingConfig {
                    interval: Duration::from_millis(10),
                    ..PollingConfig::default()
                },
                telemetry: TelemetryConfig::default(),
            },
        }
    }

    /// Set the job deadline
    pub fn with_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.polling.timeout_seconds = seconds;
        self
    }

    /// Set the pause between polls
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.config.polling.interval = interval;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test config");
        self.config
    }
}

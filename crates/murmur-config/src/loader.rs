use std::net::SocketAddr;
use std::path::Path;

use secrecy::{ExposeSecret, SecretString};

use crate::{BackendConfig, Config, LogFormat, PollingConfig, ServerConfig, TelemetryConfig};

/// Environment variable holding the backend API key
pub const API_KEY_ENV: &str = "ASSEMBLYAI_API_KEY";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, a placeholder cannot be
    /// resolved, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Build configuration from process environment only
    ///
    /// Reads `ASSEMBLYAI_API_KEY` (required), `TIMEOUT_SECONDS`,
    /// `POLL_INTERVAL`, `PORT`, `LOG_LEVEL` and `LOG_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing, a value fails to parse,
    /// or validation fails
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env_var(API_KEY_ENV)
            .ok_or_else(|| anyhow::anyhow!("{API_KEY_ENV} environment variable is required"))?;

        let mut backend = BackendConfig::with_api_key(SecretString::from(api_key));
        if let Some(raw) = env_var("SPEAKER_LABELS") {
            backend.speaker_labels = raw
                .to_lowercase()
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid SPEAKER_LABELS '{raw}', expected 'true' or 'false'"))?;
        }

        let mut polling = PollingConfig::default();
        if let Some(raw) = env_var("TIMEOUT_SECONDS") {
            polling.timeout_seconds = raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid TIMEOUT_SECONDS '{raw}': {e}"))?;
        }
        if let Some(raw) = env_var("POLL_INTERVAL") {
            polling.interval = crate::duration::parse(&raw).map_err(|e| anyhow::anyhow!("POLL_INTERVAL: {e}"))?;
        }

        let mut server = ServerConfig::default();
        if let Some(raw) = env_var("PORT") {
            let port: u16 = raw.parse().map_err(|e| anyhow::anyhow!("invalid PORT '{raw}': {e}"))?;
            server.listen_address = Some(SocketAddr::from(([0, 0, 0, 0], port)));
        }

        let mut telemetry = TelemetryConfig::default();
        if let Some(level) = env_var("LOG_LEVEL") {
            telemetry.log_filter = level.to_lowercase();
        }
        if let Some(raw) = env_var("LOG_FORMAT") {
            telemetry.log_format = raw
                .parse::<LogFormat>()
                .map_err(|_| anyhow::anyhow!("invalid LOG_FORMAT '{raw}', expected 'text' or 'json'"))?;
        }

        let config = Self {
            server,
            backend,
            polling,
            telemetry,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.validate_polling()?;

        if !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        if self.backend.api_key.expose_secret().trim().is_empty() {
            anyhow::bail!("backend.api_key must not be empty");
        }

        if !matches!(self.backend.base_url.scheme(), "http" | "https") {
            anyhow::bail!("backend.base_url must use http or https");
        }

        if self.backend.request_timeout.is_zero() {
            anyhow::bail!("backend.request_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_polling(&self) -> anyhow::Result<()> {
        if self.polling.timeout_seconds == 0 {
            anyhow::bail!("polling.timeout_seconds must be greater than 0");
        }

        if self.polling.interval.is_zero() {
            anyhow::bail!("polling.interval must be greater than 0");
        }

        if self.polling.interval >= self.polling.timeout() {
            anyhow::bail!("polling.interval must be shorter than polling.timeout_seconds");
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

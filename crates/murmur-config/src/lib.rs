#![allow(clippy::must_use_candidate)]

pub mod backend;
mod duration;
mod env;
pub mod health;
mod loader;
pub mod polling;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use backend::*;
pub use health::*;
pub use polling::*;
pub use server::*;
pub use telemetry::*;

/// Top-level murmur configuration
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener and health endpoint configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Transcription backend connection
    pub backend: BackendConfig,
    /// Polling loop tunables
    #[serde(default)]
    pub polling: PollingConfig,
    /// Log output configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

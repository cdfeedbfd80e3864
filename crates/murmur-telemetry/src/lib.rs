//! Log output for murmur
//!
//! Installs a `tracing-subscriber` registry writing text or JSON lines to stdout

use murmur_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that takes precedence over every other filter source
pub const RUST_LOG_ENV: &str = "RUST_LOG";

/// Initialize logging from configuration
///
/// The filter comes from `RUST_LOG` when set, then `override_filter`, then the
/// configured `log_filter`. A directive that fails to parse falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: &TelemetryConfig, override_filter: Option<&str>) -> anyhow::Result<()> {
    let directive = filter_directive(config, override_filter);

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directive}', falling back to 'info': {e}");
        EnvFilter::new("info")
    });

    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false);

            registry.with(fmt_layer).try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_target(true);

            registry.with(fmt_layer).try_init()
        }
    }
    .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))
}

/// Pick the filter directive by precedence
fn filter_directive(config: &TelemetryConfig, override_filter: Option<&str>) -> String {
    std::env::var(RUST_LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            override_filter
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| config.log_filter.clone())
}

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default `AssemblyAI` v2 API root
pub const DEFAULT_BACKEND_URL: &str = "https://api.assemblyai.com/v2";

/// Connection settings for the transcription backend
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// API key sent in the `authorization` header
    pub api_key: SecretString,
    /// Base URL override
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Per-call HTTP timeout for submit and status requests
    #[serde(default = "default_request_timeout", deserialize_with = "crate::duration::deserialize")]
    pub request_timeout: Duration,
    /// Ask the backend to add punctuation
    #[serde(default = "default_true")]
    pub punctuate: bool,
    /// Ask the backend to apply casing and number formatting
    #[serde(default = "default_true")]
    pub format_text: bool,
    /// Ask the backend to label speakers; segments then carry `speaker`
    #[serde(default)]
    pub speaker_labels: bool,
}

impl BackendConfig {
    /// Backend settings with defaults for everything but the key
    pub fn with_api_key(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            punctuate: true,
            format_text: true,
            speaker_labels: false,
        }
    }
}

pub(crate) fn default_base_url() -> Url {
    Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL must be valid")
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_true() -> bool {
    true
}

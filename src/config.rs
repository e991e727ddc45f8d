//! Configuration for rpn-control.

use std::time::Duration;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::error::{RpnError, RpnResult};

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token used to authenticate every request.
    #[serde(default)]
    pub token: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Interval between status polls while waiting for a group to settle,
    /// in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_base_url() -> String {
    "https://api.online.net/api/v1".to_owned()
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from the default sources.
    ///
    /// Configuration is loaded in the following order (later sources override
    /// earlier):
    /// 1. Default values
    /// 2. `rpn-control.toml` in the current directory (if present)
    /// 3. Environment variables with `ONLINE_` prefix (e.g. `ONLINE_TOKEN`)
    pub fn load() -> RpnResult<Self> {
        Figment::new()
            .merge(Toml::file("rpn-control.toml"))
            .merge(Env::prefixed("ONLINE_"))
            .extract()
            .map_err(|e| RpnError::Config(e.to_string()))
    }

    /// Load configuration from a specific TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RpnResult<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ONLINE_"))
            .extract()
            .map_err(|e| RpnError::Config(e.to_string()))
    }

    /// Configuration with the given token and defaults for everything else.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

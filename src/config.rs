//! Environment-driven configuration.
//!
//! Three knobs, all with production defaults: the API origin, the web
//! origin hosting the subscribe page, and the polling wait threshold.

use std::env;

use crate::error::ConfigError;

/// Default API origin.
const DEFAULT_API_URL: &str = "https://api.chime.rs";

/// Default web origin hosting the subscribe page.
const DEFAULT_WEB_URL: &str = "https://chime.rs";

/// Default number of one-second polling ticks before giving up.
pub const DEFAULT_WAIT_THRESHOLD: u64 = 90;

/// Environment variable overriding the API origin.
pub const ENV_API_URL: &str = "CHIME_API_URL";

/// Environment variable overriding the web origin.
pub const ENV_WEB_URL: &str = "CHIME_WEB_URL";

/// Environment variable overriding the wait threshold, in seconds.
pub const ENV_WAIT_THRESHOLD: &str = "CHIME_WAIT_THRESHOLD";

/// Runtime configuration for the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the chime API.
    pub api_base_url: String,
    /// Base URL of the page where the user subscribes their phone.
    pub web_base_url: String,
    /// Number of one-second ticks to wait for the phone to confirm.
    pub wait_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            web_base_url: DEFAULT_WEB_URL.to_string(),
            wait_threshold: DEFAULT_WAIT_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url =
            env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let web_base_url =
            env::var(ENV_WEB_URL).unwrap_or_else(|_| DEFAULT_WEB_URL.to_string());
        let wait_threshold = parse_wait_threshold(env::var(ENV_WAIT_THRESHOLD).ok())?;

        Ok(Self {
            api_base_url,
            web_base_url,
            wait_threshold,
        })
    }
}

/// Parse the wait threshold override; an unset or blank variable means
/// the default.
fn parse_wait_threshold(raw: Option<String>) -> Result<u64, ConfigError> {
    let Some(value) = raw else {
        return Ok(DEFAULT_WAIT_THRESHOLD);
    };

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_WAIT_THRESHOLD);
    }

    trimmed.parse().map_err(|_| ConfigError::InvalidValue {
        key: ENV_WAIT_THRESHOLD.to_string(),
        message: format!("expected a number of seconds, got {value:?}"),
    })
}

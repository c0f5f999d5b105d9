//! Client configuration from the environment

use std::path::PathBuf;
use std::time::Duration;

/// Default backend location when `AGRI_API_BASE_URL` is unset
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the transport and credential store
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to (no trailing slash)
    pub api_base_url: String,
    pub request_timeout: Duration,
    /// Where the bearer token is persisted; `None` keeps it in memory only
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. An unparsable timeout falls back to the
    /// default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_base_url = var("AGRI_API_BASE_URL").map_or_else(
            || DEFAULT_API_BASE_URL.to_string(),
            |url| url.trim().trim_end_matches('/').to_string(),
        );

        let request_timeout = match var("AGRI_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid AGRI_REQUEST_TIMEOUT_SECS");
                    DEFAULT_REQUEST_TIMEOUT
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let credentials_path = var("AGRI_CREDENTIALS_PATH").map(PathBuf::from).or_else(|| {
            var("HOME").map(|home| PathBuf::from(home).join(".agri-assist").join("credentials.json"))
        });

        Self {
            api_base_url,
            request_timeout,
            credentials_path,
        }
    }
}

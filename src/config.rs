use std::env;
use std::time::Duration;

use thiserror::Error;

/// Environment variable holding the API base URL.
pub const API_URL_VAR: &str = "MEDIAWATCH_API_URL";

/// Environment variable holding the request timeout in milliseconds.
pub const API_TIMEOUT_VAR: &str = "MEDIAWATCH_API_TIMEOUT_MS";

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an absolute http(s) URL, got {value:?}")]
    InvalidBaseUrl { var: &'static str, value: String },
}

/// Connection settings for the monitoring API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    pub base_url: String,

    /// Per-request timeout. A request that does not complete in time is
    /// aborted and reported with status `408`.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    /// Reads `MEDIAWATCH_API_URL` and `MEDIAWATCH_API_TIMEOUT_MS`, falling
    /// back to the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(API_URL_VAR) {
            config = config.with_base_url(value)?;
        }

        if let Some(value) = lookup(API_TIMEOUT_VAR) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout {
                    var: API_TIMEOUT_VAR,
                    value: value.clone(),
                })?;
            config.timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }

    /// Replaces the base URL after checking it is an absolute http(s) URL.
    pub fn with_base_url(mut self, value: impl Into<String>) -> Result<Self, ConfigError> {
        let value = value.into();
        let valid = reqwest::Url::parse(&value)
            .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.has_host());
        if !valid {
            return Err(ConfigError::InvalidBaseUrl {
                var: API_URL_VAR,
                value,
            });
        }
        self.base_url = value.trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_unset_env_uses_defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = ApiConfig::from_lookup(lookup(&[
            (API_URL_VAR, "https://veille.example.org/"),
            (API_TIMEOUT_VAR, "5000"),
        ]))
        .expect("config should parse");
        assert_eq!(config.base_url, "https://veille.example.org");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = ApiConfig::from_lookup(lookup(&[(API_TIMEOUT_VAR, "soon")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidTimeout {
                var: API_TIMEOUT_VAR,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiConfig::from_lookup(lookup(&[(API_URL_VAR, "localhost:8000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));
    }
}

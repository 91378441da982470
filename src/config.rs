// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{AnalyzerError, Result};

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// High-level application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Analysis API, without the `/api` prefix.
    pub api_base: String,

    /// Upper bound for one submission. `None` waits forever.
    pub request_timeout: Option<Duration>,

    /// Overrides the default preference file location.
    pub prefs_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            prefs_path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. `ANALYZER_TIMEOUT_SECS=0`
    /// disables the timeout.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base = lookup("ANALYZER_API_BASE")
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        if !api_base.starts_with("http://") && !api_base.starts_with("https://") {
            return Err(AnalyzerError::Config(format!(
                "ANALYZER_API_BASE must be an http(s) URL, got '{}'",
                api_base
            )));
        }

        let request_timeout = match lookup("ANALYZER_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    AnalyzerError::Config(format!(
                        "ANALYZER_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        let prefs_path = lookup("ANALYZER_PREFS_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(AppConfig {
            api_base,
            request_timeout,
            prefs_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(
            config.request_timeout,
            Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        );
        assert!(config.prefs_path.is_none());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("ANALYZER_API_BASE", "https://analyzer.internal/"),
            ("ANALYZER_TIMEOUT_SECS", "30"),
            ("ANALYZER_PREFS_PATH", "/tmp/prefs.toml"),
        ]))
        .unwrap();
        assert_eq!(config.api_base, "https://analyzer.internal");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.prefs_path, Some(PathBuf::from("/tmp/prefs.toml")));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("ANALYZER_TIMEOUT_SECS", "0")])).unwrap();
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("ANALYZER_TIMEOUT_SECS", "soon")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("ANALYZER_API_BASE", "ftp://x")])).is_err());
    }
}

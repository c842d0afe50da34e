//! Client configuration for ksearch.
//!
//! Reads `~/.config/ksearch/config.toml`. Every key is optional; a missing
//! file yields the defaults. Environment variables override the file.

use ksearch_core::citation::{DEFAULT_EXCERPT_WORD_LIMIT, InteractionMode};
use ksearch_core::search::DEFAULT_FEEDBACK_KEY;
use ksearch_core::{KsearchError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Environment variable overriding `base_url`.
pub const ENV_BASE_URL: &str = "KSEARCH_BASE_URL";
/// Environment variable overriding `feedback_key`.
pub const ENV_FEEDBACK_KEY: &str = "KSEARCH_FEEDBACK_KEY";

/// Root configuration structure for config.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the search service (without trailing slash)
    pub base_url: String,
    /// `key` sent with feedback submissions
    pub feedback_key: String,
    /// Timeout of `POST /search` in seconds; 0 disables it
    pub request_timeout_secs: u64,
    /// Words kept in citation preview excerpts
    pub excerpt_word_limit: usize,
    pub citation_mode: InteractionMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            feedback_key: DEFAULT_FEEDBACK_KEY.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            excerpt_word_limit: DEFAULT_EXCERPT_WORD_LIMIT,
            citation_mode: InteractionMode::default(),
        }
    }
}

impl ClientConfig {
    /// Loads the default config file, then applies process environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = load_client_config_from(&config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(key) = lookup(ENV_FEEDBACK_KEY).filter(|v| !v.trim().is_empty()) {
            self.feedback_key = key;
        }
        self.normalize();
    }

    /// Sets the base URL (e.g., from a command line flag).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalize();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(KsearchError::config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(KsearchError::config(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Full URL of a service path such as `/search`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    fn normalize(&mut self) {
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
    }
}

/// Loads the configuration file at `path`, falling back to defaults when it
/// does not exist.
pub fn load_client_config_from(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(ClientConfig::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        KsearchError::config(format!(
            "Failed to read configuration file at {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config: ClientConfig = toml::from_str(&content).map_err(|e| {
        KsearchError::config(format!(
            "Failed to parse configuration file at {}: {}",
            path.display(),
            e
        ))
    })?;
    config.normalize();
    Ok(config)
}

/// Returns the path to the configuration file: ~/.config/ksearch/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| KsearchError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("ksearch").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.feedback_key, "user-feedback");
        assert_eq!(config.excerpt_word_limit, 50);
        assert_eq!(config.citation_mode, InteractionMode::Click);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(300)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_win() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, "https://search.example.com/"),
            (ENV_FEEDBACK_KEY, "beta-feedback"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "https://search.example.com");
        assert_eq!(config.feedback_key, "beta-feedback");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env_overrides(|_| Some("  ".to_string()));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::default().with_base_url("https://x.example/api/");
        assert_eq!(config.endpoint("/search"), "https://x.example/api/search");
        assert_eq!(config.endpoint("stream"), "https://x.example/api/stream");
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(
            ClientConfig::default()
                .with_base_url("ftp://x")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.request_timeout(), None);
    }
}

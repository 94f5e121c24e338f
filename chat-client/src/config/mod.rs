use client_core::error::ApiError;
use config::{Config, File};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Base URL of the chat backend, e.g. `https://api.example.com/`.
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry budget for retryable failures (5xx, 429, 408, 413).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Where to persist the token pair. In-memory only when unset.
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            token_file: None,
        }
    }

    pub fn load() -> Result<Self, ApiError> {
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(config::Environment::with_prefix("CHAT").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Base URL without a trailing slash, for path joining.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_strips_trailing_slash() {
        let settings = ApiSettings::new("http://localhost:9000/");
        assert_eq!(settings.base(), "http://localhost:9000");

        let settings = ApiSettings::new("http://localhost:9000");
        assert_eq!(settings.base(), "http://localhost:9000");
    }
}

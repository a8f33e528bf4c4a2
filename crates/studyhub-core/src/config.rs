//! Client configuration
//!
//! Env-driven settings for the API client and the local state directory.
//! Binaries load `.env` via dotenvy before calling `from_env`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Backend base URL, no trailing slash.
    pub base_url: String,
    /// Fixed per-request timeout. No retries are performed on timeout.
    pub request_timeout: Duration,
    /// Directory holding the session file, rating cache, and local task lists.
    pub state_dir: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let base_url = env::var("STUDYHUB_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let request_timeout = env::var("STUDYHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let state_dir = match env::var("STUDYHUB_STATE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => match env::var("HOME") {
                Ok(home) => PathBuf::from(home).join(".studyhub"),
                Err(_) => PathBuf::from(".studyhub"),
            },
        };

        let config = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
            state_dir,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!(
                "Invalid STUDYHUB_API_URL: expected http(s) URL, got {}",
                self.base_url
            );
        }
        if self.request_timeout.is_zero() {
            anyhow::bail!("STUDYHUB_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_http_url() {
        let config = ClientConfig {
            base_url: "ftp://example.com".to_string(),
            request_timeout: Duration::from_secs(30),
            state_dir: PathBuf::from("/tmp"),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = ClientConfig {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(0),
            state_dir: PathBuf::from("/tmp"),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_https() {
        let config = ClientConfig {
            base_url: "https://api.studyhub.example".to_string(),
            request_timeout: Duration::from_secs(30),
            state_dir: PathBuf::from("/tmp"),
        };
        assert!(config.validate().is_ok());
    }
}

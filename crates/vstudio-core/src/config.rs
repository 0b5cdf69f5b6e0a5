//! Configuration module
//!
//! Client settings read from the environment. Binaries load `.env` before
//! calling [`ClientConfig::from_env`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const REQUEST_TIMEOUT_SECS: u64 = 120;
const POLL_INTERVAL_SECS: u64 = 3;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub poll_interval_secs: u64,
    /// Explicit user identifier; takes precedence over the persisted one.
    pub user_id: Option<String>,
    /// File holding the persisted user identifier.
    pub user_id_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            poll_interval_secs: POLL_INTERVAL_SECS,
            user_id: None,
            user_id_file: default_user_id_file(),
        }
    }
}

fn default_user_id_file() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".vstudio").join("user_id"),
        None => PathBuf::from(".vstudio_user_id"),
    }
}

fn parse_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a positive integer", name))),
        Err(_) => Ok(default),
    }
}

impl ClientConfig {
    /// Load from VSTUDIO_API_URL (or API_URL), VSTUDIO_TIMEOUT_SECS,
    /// VSTUDIO_POLL_INTERVAL_SECS, VSTUDIO_USER_ID and VSTUDIO_USER_ID_FILE.
    pub fn from_env() -> Result<Self, AppError> {
        let api_base_url = env::var("VSTUDIO_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let user_id = env::var("VSTUDIO_USER_ID")
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());

        let user_id_file = env::var_os("VSTUDIO_USER_ID_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_user_id_file);

        let config = Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout_secs: parse_u64("VSTUDIO_TIMEOUT_SECS", REQUEST_TIMEOUT_SECS)?,
            poll_interval_secs: parse_u64("VSTUDIO_POLL_INTERVAL_SECS", POLL_INTERVAL_SECS)?,
            user_id,
            user_id_file,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.api_base_url.trim().is_empty() {
            return Err(AppError::Config("API base URL must not be empty".to_string()));
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(AppError::Config(format!(
                "API base URL must start with http:// or https://, got: {}",
                self.api_base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "VSTUDIO_TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }
        if self.poll_interval_secs == 0 {
            return Err(AppError::Config(
                "VSTUDIO_POLL_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

//! Errors returned by [`crate::ApiClient`].

use reqwest::StatusCode;
use vstudio_core::{AppError, ErrorCategory, ErrorMetadata, LogLevel};

use crate::oauth::OAuthError;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    OAuth(#[from] OAuthError),

    #[error(transparent)]
    App(#[from] AppError),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err)
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(err: validator::ValidationErrors) -> Self {
        ClientError::App(AppError::from(err))
    }
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl ErrorMetadata for ClientError {
    fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Transport(_) | ClientError::Decode(_) | ClientError::Io { .. } => {
                ErrorCategory::Transport
            }
            ClientError::Api { status, .. } if *status >= 500 => ErrorCategory::Transport,
            ClientError::Api { .. } => ErrorCategory::Validation,
            ClientError::OAuth(_) => ErrorCategory::OAuth,
            ClientError::App(err) => err.category(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Api { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Api { status: 404, .. } => "NOT_FOUND",
            ClientError::Api { .. } => "REQUEST_REJECTED",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Io { .. } => "IO_ERROR",
            ClientError::OAuth(err) => err.error_code(),
            ClientError::App(err) => err.error_code(),
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            ClientError::App(err) => err.is_recoverable(),
            ClientError::Decode(_) => false,
            _ => true,
        }
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self {
            ClientError::Transport(_) => Some("Check the connection and try again"),
            ClientError::Api { status, .. } if *status >= 500 => {
                Some("Retry after a short delay")
            }
            ClientError::Api { .. } => Some("Check request parameters and try again"),
            ClientError::Decode(_) => Some("Check that VSTUDIO_API_URL points at the backend"),
            ClientError::Io { .. } => Some("Check the file path and permissions"),
            ClientError::OAuth(_) => Some("Start the connection again"),
            ClientError::App(err) => err.suggested_action(),
        }
    }

    fn client_message(&self) -> String {
        match self {
            ClientError::Transport(err) => err.to_string(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Decode(msg) => msg.clone(),
            ClientError::Io { path, source } => format!("{}: {}", path, source),
            ClientError::OAuth(err) => err.to_string(),
            ClientError::App(err) => err.client_message(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self.category() {
            ErrorCategory::Validation => LogLevel::Debug,
            ErrorCategory::Domain | ErrorCategory::OAuth => LogLevel::Warn,
            ErrorCategory::Transport => LogLevel::Error,
        }
    }
}

/// Human-readable message from an error response body.
///
/// Looks for `detail`, then `message`, then falls back to the raw body and
/// finally the status reason.
pub fn extract_error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| match value {
            serde_json::Value::Object(map) => {
                let field = map.get("detail").or_else(|| map.get("message"));
                Some(match field {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                    None => serde_json::Value::Object(map).to_string(),
                })
            }
            serde_json::Value::String(s) => Some(s),
            _ => None,
        });

    from_json
        .filter(|m| !m.trim().is_empty())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        })
}

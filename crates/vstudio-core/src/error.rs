//! Error types module
//!
//! `AppError` covers failures the client detects on its own: invalid input,
//! lifecycle violations, unmet preconditions, configuration problems and videos
//! the backend marked as failed. Transport and HTTP failures live in the API
//! client crate and share the [`ErrorMetadata`] presentation contract.

use crate::models::VideoStatus;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Where an error originates, which decides how it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network failure, timeout, 5xx or an undecodable body.
    Transport,
    /// Rejected input: HTTP 4xx with a message, or client-side validation.
    Validation,
    /// A video persisted in the `error` state; shown inline with the video.
    Domain,
    /// Account connection failures.
    OAuth,
}

/// Presentation metadata. Errors describe how they should be surfaced to the user.
pub trait ErrorMetadata {
    fn category(&self) -> ErrorCategory;

    /// Machine-readable error code (e.g., "INVALID_INPUT")
    fn error_code(&self) -> &'static str;

    /// Whether the user can fix this by re-triggering the action.
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message shown in the notification.
    fn client_message(&self) -> String;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid transition: cannot apply {event} while {from}")]
    InvalidTransition {
        from: VideoStatus,
        event: &'static str,
    },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Video processing failed: {0}")]
    VideoFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (category, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    ErrorCategory,
    &'static str,
    bool,
    Option<&'static str>,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            ErrorCategory::Validation,
            "INVALID_INPUT",
            true,
            Some("Check the values and try again"),
            LogLevel::Debug,
        ),
        AppError::InvalidTransition { .. } => (
            ErrorCategory::Validation,
            "INVALID_TRANSITION",
            false,
            Some("Refresh the video to see its current state"),
            LogLevel::Debug,
        ),
        AppError::PreconditionFailed(_) => (
            ErrorCategory::Validation,
            "PRECONDITION_FAILED",
            true,
            None,
            LogLevel::Debug,
        ),
        AppError::VideoFailed(_) => (
            ErrorCategory::Domain,
            "VIDEO_FAILED",
            true,
            Some("Re-run the failed action"),
            LogLevel::Warn,
        ),
        AppError::Config(_) => (
            ErrorCategory::Validation,
            "CONFIG_ERROR",
            false,
            Some("Check VSTUDIO_* environment variables"),
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            ErrorCategory::Transport,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn category(&self) -> ErrorCategory {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidTransition { from, event } => {
                format!("Cannot {} while the video is {}", event.replace('_', " "), from)
            }
            AppError::PreconditionFailed(msg) => msg.clone(),
            AppError::VideoFailed(msg) => msg.clone(),
            AppError::Config(msg) => msg.clone(),
            AppError::InternalWithSource { message, .. } => message.clone(),
        }
    }
}

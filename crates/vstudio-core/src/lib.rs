//! Video Studio Core Library
//!
//! This crate provides the domain models, the client-observed video lifecycle,
//! caption-shape handling, error types and configuration shared by the API
//! client and the CLI.

pub mod captions;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod models;

// Re-export commonly used types
pub use captions::{Captions, LanguageSelection, DEFAULT_LANGUAGE};
pub use config::ClientConfig;
pub use error::{AppError, ErrorCategory, ErrorMetadata, LogLevel};
pub use lifecycle::LifecycleEvent;
pub use models::{
    ConfidentialityStatus, PrivacyStatus, RiskLevel, Video, VideoId, VideoStatus, YouTubeAccount,
};

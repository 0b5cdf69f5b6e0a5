//! Per-user session identity.
//!
//! The backend scopes every record to the identifier sent in `X-User-Id`.
//! It is generated once, persisted to a local file, reused across runs and may
//! be replaced by the user. The client receives it at construction.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use vstudio_core::{AppError, ClientConfig};

pub const USER_ID_HEADER: &str = "X-User-Id";

const MAX_USER_ID_LEN: usize = 128;
const GENERATED_SUFFIX_LEN: usize = 13;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    user_id: String,
}

impl Session {
    /// Wrap a user-supplied identifier. Must be non-empty, at most 128 visible
    /// ASCII characters so it can travel in a header.
    pub fn new(user_id: impl Into<String>) -> std::result::Result<Self, AppError> {
        let user_id = user_id.into().trim().to_string();
        if user_id.is_empty() {
            return Err(AppError::InvalidInput(
                "User id must not be empty".to_string(),
            ));
        }
        if user_id.len() > MAX_USER_ID_LEN {
            return Err(AppError::InvalidInput(format!(
                "User id must be at most {} characters",
                MAX_USER_ID_LEN
            )));
        }
        if !user_id.chars().all(|c| c.is_ascii_graphic()) {
            return Err(AppError::InvalidInput(
                "User id may only contain visible ASCII characters".to_string(),
            ));
        }
        Ok(Self { user_id })
    }

    /// Fresh identifier of the form `user_<13 lowercase alphanumerics>`.
    pub fn generate() -> Self {
        let random = uuid::Uuid::new_v4().simple().to_string();
        Self {
            user_id: format!("user_{}", &random[..GENERATED_SUFFIX_LEN]),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Read a persisted identifier. A missing or blank file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read user id from {}", path.display()))?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let session = Self::new(raw)
            .with_context(|| format!("Invalid user id stored in {}", path.display()))?;
        Ok(Some(session))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, format!("{}\n", self.user_id))
            .with_context(|| format!("Failed to write user id to {}", path.display()))?;
        Ok(())
    }

    /// Load the persisted identifier, generating and saving one on first use.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if let Some(session) = Self::load(path)? {
            return Ok(session);
        }
        let session = Self::generate();
        session.save(path)?;
        tracing::info!(user_id = %session.user_id, path = %path.display(), "Generated new user id");
        Ok(session)
    }

    /// Session for this run: `VSTUDIO_USER_ID` if set, else the persisted one.
    pub fn resolve(config: &ClientConfig) -> Result<Self> {
        match config.user_id.as_deref() {
            Some(id) => Ok(Self::new(id).context("Invalid VSTUDIO_USER_ID")?),
            None => Self::load_or_create(&config.user_id_file),
        }
    }
}

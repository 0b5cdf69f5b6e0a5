use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use validator::Validate;

use super::confidentiality::{ConfidentialityFinding, ConfidentialityStatus};
use super::timestamp;
use crate::captions::{self, Captions};
use crate::error::AppError;

/// Video identifier. The backend uses integer ids; string ids are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoId {
    Numeric(i64),
    Text(String),
}

impl Display for VideoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoId::Numeric(id) => write!(f, "{}", id),
            VideoId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for VideoId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::InvalidInput("Video id must not be empty".to_string()));
        }
        Ok(match s.parse::<i64>() {
            Ok(n) => VideoId::Numeric(n),
            Err(_) => VideoId::Text(s.to_string()),
        })
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        VideoId::Numeric(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Uploading,
    Ready,
    Processing,
    Captioning,
    MetadataReady,
    Publishing,
    Published,
    Error,
    #[serde(other)]
    Unknown,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploading => "uploading",
            VideoStatus::Ready => "ready",
            VideoStatus::Processing => "processing",
            VideoStatus::Captioning => "captioning",
            VideoStatus::MetadataReady => "metadata_ready",
            VideoStatus::Publishing => "publishing",
            VideoStatus::Published => "published",
            VideoStatus::Error => "error",
            VideoStatus::Unknown => "unknown",
        }
    }
}

impl Display for VideoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uploading" => Ok(VideoStatus::Uploading),
            "ready" => Ok(VideoStatus::Ready),
            "processing" => Ok(VideoStatus::Processing),
            "captioning" => Ok(VideoStatus::Captioning),
            "metadata_ready" => Ok(VideoStatus::MetadataReady),
            "publishing" => Ok(VideoStatus::Publishing),
            "published" => Ok(VideoStatus::Published),
            "error" => Ok(VideoStatus::Error),
            other => Err(AppError::InvalidInput(format!(
                "Unknown video status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    #[default]
    Private,
    Unlisted,
    Public,
}

impl Display for PrivacyStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PrivacyStatus::Private => write!(f, "private"),
            PrivacyStatus::Unlisted => write!(f, "unlisted"),
            PrivacyStatus::Public => write!(f, "public"),
        }
    }
}

impl FromStr for PrivacyStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "private" => Ok(PrivacyStatus::Private),
            "unlisted" => Ok(PrivacyStatus::Unlisted),
            "public" => Ok(PrivacyStatus::Public),
            other => Err(AppError::InvalidInput(format!(
                "Privacy status must be private, unlisted or public, got: {}",
                other
            ))),
        }
    }
}

/// The backend stores whatever string a PATCH sent. Case is ignored and
/// unrecognized values read as unset.
fn lenient_privacy<'de, D>(deserializer: D) -> Result<Option<PrivacyStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Server snapshot of a video. Matches the backend's serialized video record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: VideoId,
    pub user_id: Option<String>,
    pub original_filename: String,
    #[serde(default)]
    pub storage_path: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
    pub duration_ms: Option<i64>,
    pub status: VideoStatus,
    pub error_message: Option<String>,

    pub transcript: Option<String>,
    #[serde(default)]
    pub captions: Option<Captions>,
    pub language: Option<String>,
    pub ai_summary: Option<String>,

    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub hashtags: Option<String>,
    pub thumbnail_prompt: Option<String>,
    pub thumbnail_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_privacy")]
    pub privacy_status: Option<PrivacyStatus>,
    pub category: Option<String>,

    pub youtube_id: Option<String>,
    pub youtube_url: Option<String>,
    pub youtube_channel_id: Option<String>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub published_at: Option<DateTime<Utc>>,

    pub confidentiality_status: Option<ConfidentialityStatus>,
    #[serde(default)]
    pub confidentiality_issues: Vec<ConfidentialityFinding>,

    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Video {
    /// Title to show: the edited title, falling back to the uploaded filename.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.original_filename)
    }

    /// Tags split on commas, trimmed, empties dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn hashtag_list(&self) -> Vec<&str> {
        self.hashtags
            .as_deref()
            .map(|h| h.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Recorded source language, defaulting to English.
    pub fn source_language(&self) -> &str {
        self.language
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(captions::DEFAULT_LANGUAGE)
    }

    /// Languages that already have captions.
    pub fn existing_caption_languages(&self) -> BTreeSet<String> {
        captions::existing_languages(self.captions.as_ref(), self.language.as_deref())
    }

    /// Caption text in the source language, if any.
    pub fn caption_text(&self) -> Option<&str> {
        self.captions
            .as_ref()
            .and_then(|c| c.primary_text(self.source_language()))
    }

    /// Transcript, or an approximation derived from the captions.
    pub fn transcript_or_guess(&self) -> Option<String> {
        match self.transcript.as_deref() {
            Some(t) if !t.trim().is_empty() => Some(t.to_string()),
            _ => self
                .caption_text()
                .map(captions::transcript_from_srt)
                .filter(|t| !t.is_empty()),
        }
    }

    pub fn has_confidentiality_issues(&self) -> bool {
        self.confidentiality_status
            .map(|s| s.needs_review())
            .unwrap_or(false)
    }

    /// Error message to show inline. Only present while the video is in `error`.
    pub fn inline_error(&self) -> Option<&str> {
        if self.status != VideoStatus::Error {
            return None;
        }
        Some(
            self.error_message
                .as_deref()
                .unwrap_or("Processing failed"),
        )
    }

    /// Domain error for a video persisted in the `error` state.
    pub fn domain_error(&self) -> Option<AppError> {
        self.inline_error()
            .map(|msg| AppError::VideoFailed(msg.to_string()))
    }
}

/// Partial update sent with `PATCH /video/{id}`. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct VideoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VideoStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Title must be at most 100 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<PrivacyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        *self == VideoPatch::default()
    }

    /// Patch that stores edited captions and marks the video as captioned.
    pub fn save_captions(captions: String, transcript: Option<String>) -> Self {
        VideoPatch {
            status: Some(VideoStatus::MetadataReady),
            captions: Some(captions),
            transcript,
            ..Default::default()
        }
    }
}

/// Body for `POST /video/ingest`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IngestRequest {
    #[validate(url(message = "video_url must be a valid URL"))]
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Query filters for `GET /video`.
#[derive(Debug, Clone, Default)]
pub struct ListVideosQuery {
    pub status: Option<VideoStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListVideosQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset", offset.to_string()));
        }
        query
    }
}

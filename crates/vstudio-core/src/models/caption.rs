use serde::{Deserialize, Serialize};
use validator::Validate;

use super::video::VideoId;
use crate::captions::{Language, DEFAULT_LANGUAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    Srt,
    Text,
}

/// Body for `POST /video/caption`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRequest {
    pub video_id: VideoId,
    pub language_code: String,
}

impl CaptionRequest {
    pub fn new(video_id: VideoId, language_code: Option<&str>) -> Self {
        Self {
            video_id,
            language_code: language_code
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
        }
    }
}

/// Response of `POST /video/caption`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionResponse {
    pub captions_format: CaptionFormat,
    #[serde(default)]
    pub captions: String,
}

/// Body for `POST /video/caption/translate`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TranslateCaptionsRequest {
    pub video_id: VideoId,
    #[validate(length(min = 1, message = "Select at least one language to translate"))]
    pub target_languages: Vec<String>,
    pub source_language: String,
}

/// Response of `POST /video/caption/translate`.
///
/// Partial failures are not reported per language; the call fails as a whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateCaptionsResponse {
    #[serde(default)]
    pub languages_added: Vec<String>,
}

/// Response of `GET /video/caption/languages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedLanguagesResponse {
    pub languages: Vec<Language>,
}

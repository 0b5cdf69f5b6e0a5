use serde::{Deserialize, Serialize};

use super::video::{VideoId, VideoPatch};

/// Body for `POST /video/metadata/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateMetadataRequest {
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<bool>,
}

impl GenerateMetadataRequest {
    pub fn for_video(video_id: VideoId) -> Self {
        Self {
            video_id,
            prompt: None,
            model: None,
            tone: None,
            hashtags: None,
        }
    }
}

/// AI-generated candidate metadata. Fields the model left empty are `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub ai_summary: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub hashtags: Option<String>,
    pub thumbnail_prompt: Option<String>,
    pub model_used: Option<String>,
}

impl MetadataResponse {
    /// Patch carrying only the non-empty candidates, for applying to the editor state.
    pub fn as_patch(&self) -> VideoPatch {
        fn non_empty(v: &Option<String>) -> Option<String> {
            v.as_ref().filter(|s| !s.trim().is_empty()).cloned()
        }
        VideoPatch {
            title: non_empty(&self.title),
            description: non_empty(&self.description),
            tags: non_empty(&self.tags),
            hashtags: non_empty(&self.hashtags),
            thumbnail_prompt: non_empty(&self.thumbnail_prompt),
            ..Default::default()
        }
    }
}

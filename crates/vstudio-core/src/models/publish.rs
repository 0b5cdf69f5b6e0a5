use serde::{Deserialize, Serialize};
use validator::Validate;

use super::video::{PrivacyStatus, Video, VideoId, VideoStatus};

/// Body for `POST /youtube/publish`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PublishRequest {
    pub video_id: VideoId,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100, message = "Title must be at most 100 characters"))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<PrivacyStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl PublishRequest {
    /// Request pre-filled from the video's stored metadata.
    pub fn from_video(video: &Video) -> Self {
        Self {
            video_id: video.id.clone(),
            title: Some(video.display_title().to_string()),
            description: video.description.clone(),
            tags: video.tags.clone(),
            privacy_status: Some(video.privacy_status.unwrap_or_default()),
            category: video.category.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
        }
    }
}

/// Response of `POST /youtube/publish`.
///
/// Asynchronous publishers may answer with only a status and no id yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub ok: bool,
    pub youtube_id: Option<String>,
    pub youtube_url: Option<String>,
    pub status: Option<VideoStatus>,
}

impl PublishResponse {
    /// True when the platform already reported where the video lives.
    pub fn is_published(&self) -> bool {
        self.youtube_id.is_some() || self.youtube_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefill_uses_filename_when_untitled() {
        let video: Video = serde_json::from_value(json!({
            "id": 4,
            "original_filename": "demo.mp4",
            "status": "metadata_ready",
            "tags": "a,b"
        }))
        .unwrap();
        let req = PublishRequest::from_video(&video);
        assert_eq!(req.title.as_deref(), Some("demo.mp4"));
        assert_eq!(req.privacy_status, Some(PrivacyStatus::Private));
        assert_eq!(req.tags.as_deref(), Some("a,b"));
    }

    #[test]
    fn in_progress_response() {
        let resp: PublishResponse =
            serde_json::from_value(json!({"ok": true, "status": "publishing"})).unwrap();
        assert!(!resp.is_published());
        assert_eq!(resp.status, Some(VideoStatus::Publishing));

        let resp: PublishResponse = serde_json::from_value(json!({
            "ok": true,
            "youtube_id": "abc",
            "youtube_url": "https://youtu.be/abc",
            "status": "published"
        }))
        .unwrap();
        assert!(resp.is_published());
    }
}

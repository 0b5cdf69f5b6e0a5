//! Domain methods for the Video Studio API client.
//!
//! Request and response types come from `vstudio_core::models`. Every mutating
//! call returns the server's answer; callers re-read the video afterwards rather
//! than trusting local edits.

use std::path::{Component, Path};
use validator::Validate;
use vstudio_core::captions::Language;
use vstudio_core::models::{
    CaptionRequest, CaptionResponse, ConfidentialityCheckRequest, ConfidentialityResult,
    ConnectedAccount, GenerateMetadataRequest, IngestRequest, ListVideosQuery, MetadataResponse,
    PublishRequest, PublishResponse, SupportedLanguagesResponse, TranslateCaptionsRequest,
    TranslateCaptionsResponse, Video, VideoId, VideoPatch, YouTubeStatus,
};
use vstudio_core::AppError;

use crate::error::{ClientError, Result};
use crate::ApiClient;

fn video_path(video_id: &VideoId) -> String {
    format!("/video/{}", urlencoding::encode(&video_id.to_string()))
}

/// MIME type from the file extension. The backend falls back to `video/mp4`.
pub fn guess_video_mime(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("m4v") => "video/x-m4v",
        Some("mpeg") | Some("mpg") => "video/mpeg",
        _ => "video/mp4",
    }
}

impl ApiClient {
    /// List the user's videos, newest first as ordered by the server.
    pub async fn list_videos(&self, query: &ListVideosQuery) -> Result<Vec<Video>> {
        self.get("/video", &query.to_pairs()).await
    }

    pub async fn get_video(&self, video_id: &VideoId) -> Result<Video> {
        self.get(&video_path(video_id), &[]).await
    }

    /// Upload a video from a local file path.
    pub async fn upload_video(&self, file_path: &Path) -> Result<Video> {
        if file_path.components().any(|c| c == Component::ParentDir) {
            return Err(AppError::InvalidInput(format!(
                "Path must not contain '..': {}",
                file_path.display()
            ))
            .into());
        }
        let buffer = tokio::fs::read(file_path)
            .await
            .map_err(|source| ClientError::Io {
                path: file_path.display().to_string(),
                source,
            })?;

        let filename = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");

        self.upload_video_bytes(filename, buffer).await
    }

    /// Upload in-memory video bytes. No size limit is enforced client-side and
    /// interrupted uploads are not resumed.
    pub async fn upload_video_bytes(&self, filename: &str, bytes: Vec<u8>) -> Result<Video> {
        let size = bytes.len();
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(guess_video_mime(filename))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let video: Video = self.post_multipart("/video/upload", form).await?;
        tracing::info!(video_id = %video.id, filename = %filename, size, "Video uploaded");
        Ok(video)
    }

    /// Create a video record from a remotely hosted file.
    pub async fn ingest_from_url(&self, video_url: &str, filename: Option<&str>) -> Result<Video> {
        let body = IngestRequest {
            video_url: video_url.trim().to_string(),
            filename: filename.map(str::to_string),
        };
        body.validate()?;
        let video: Video = self.post_json("/video/ingest", &body).await?;
        tracing::info!(video_id = %video.id, "Video ingested from URL");
        Ok(video)
    }

    pub async fn update_video(&self, video_id: &VideoId, patch: &VideoPatch) -> Result<Video> {
        if patch.is_empty() {
            return Err(AppError::InvalidInput("Nothing to update".to_string()).into());
        }
        patch.validate()?;
        self.patch_json(&video_path(video_id), patch).await
    }

    /// Store edited captions (and transcript) and mark the video as captioned.
    pub async fn save_captions(
        &self,
        video_id: &VideoId,
        captions: String,
        transcript: Option<String>,
    ) -> Result<Video> {
        self.update_video(video_id, &VideoPatch::save_captions(captions, transcript))
            .await
    }

    /// Delete a video. Callers must obtain the user's confirmation first.
    pub async fn delete_video(&self, video_id: &VideoId) -> Result<()> {
        self.delete(&video_path(video_id)).await?;
        tracing::info!(video_id = %video_id, "Video deleted");
        Ok(())
    }

    /// Request AI captions. The video's status is untouched if this fails.
    pub async fn request_captions(
        &self,
        video_id: &VideoId,
        language_code: Option<&str>,
    ) -> Result<CaptionResponse> {
        let body = CaptionRequest::new(video_id.clone(), language_code);
        self.post_json("/video/caption", &body).await
    }

    pub async fn supported_languages(&self) -> Result<Vec<Language>> {
        let response: SupportedLanguagesResponse =
            self.get("/video/caption/languages", &[]).await?;
        Ok(response.languages)
    }

    /// Translate existing captions into `target_languages`.
    pub async fn translate_captions(
        &self,
        video_id: &VideoId,
        target_languages: Vec<String>,
        source_language: &str,
    ) -> Result<TranslateCaptionsResponse> {
        let body = TranslateCaptionsRequest {
            video_id: video_id.clone(),
            target_languages,
            source_language: source_language.to_string(),
        };
        body.validate()?;
        self.post_json("/video/caption/translate", &body).await
    }

    /// Generate candidate metadata. Stored metadata is untouched on failure.
    pub async fn generate_metadata(
        &self,
        request: &GenerateMetadataRequest,
    ) -> Result<MetadataResponse> {
        self.post_json("/video/metadata/generate", request).await
    }

    pub async fn check_confidentiality(&self, video_id: &VideoId) -> Result<ConfidentialityResult> {
        let body = ConfidentialityCheckRequest {
            video_id: video_id.clone(),
        };
        self.post_json("/video/confidentiality/check", &body).await
    }

    pub async fn youtube_status(&self) -> Result<YouTubeStatus> {
        self.get("/youtube/status", &[]).await
    }

    /// Publish to the connected account.
    ///
    /// The `ConnectedAccount` argument makes a publish without a linked account
    /// unrepresentable.
    pub async fn publish(
        &self,
        account: &ConnectedAccount,
        request: &PublishRequest,
    ) -> Result<PublishResponse> {
        request.validate()?;
        let response: PublishResponse = self.post_json("/youtube/publish", request).await?;
        tracing::info!(
            video_id = %request.video_id,
            channel_id = ?account.channel_id(),
            youtube_id = ?response.youtube_id,
            "Publish submitted"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_from_extension() {
        assert_eq!(guess_video_mime("clip.MOV"), "video/quicktime");
        assert_eq!(guess_video_mime("clip.webm"), "video/webm");
        assert_eq!(guess_video_mime("clip"), "video/mp4");
        assert_eq!(guess_video_mime("clip.mp4"), "video/mp4");
    }

    #[test]
    fn string_ids_are_path_encoded() {
        assert_eq!(video_path(&VideoId::Numeric(7)), "/video/7");
        assert_eq!(
            video_path(&VideoId::Text("a b/c".to_string())),
            "/video/a%20b%2Fc"
        );
    }
}

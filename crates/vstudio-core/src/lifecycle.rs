//! Client-observed video lifecycle.
//!
//! ```text
//! uploading -> ready -> captioning -> metadata_ready -> publishing -> published
//!        \________\__________\______________\______________\--> error
//! ```
//!
//! The server remains the source of truth; these rules decide which actions a
//! client offers and how it interprets its own submissions before the next read.
//! Transitions touch `status` and `error_message` only. Confidentiality is a
//! separate axis and is never read or written here.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::AppError;
use crate::models::{Video, VideoStatus};

/// Events that move a video between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Upload request resolved with a stored record.
    UploadStored,
    /// Caption request submitted.
    CaptionRequested,
    /// Caption results persisted and re-fetched.
    CaptionsPersisted,
    /// Publish submitted with a connected account.
    PublishSubmitted,
    /// Backend reported the platform id/URL.
    PublishReported,
    /// Backend failure with a human-readable message.
    Failed { message: String },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::UploadStored => "upload_stored",
            LifecycleEvent::CaptionRequested => "caption_requested",
            LifecycleEvent::CaptionsPersisted => "captions_persisted",
            LifecycleEvent::PublishSubmitted => "publish_submitted",
            LifecycleEvent::PublishReported => "publish_reported",
            LifecycleEvent::Failed { .. } => "failed",
        }
    }
}

impl Display for LifecycleEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

impl VideoStatus {
    /// Statuses during which the client re-fetches on a fixed interval.
    pub fn is_polling(&self) -> bool {
        matches!(self, VideoStatus::Captioning | VideoStatus::Publishing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Published)
    }

    /// Captions can be requested whenever no background job is running.
    pub fn accepts_caption_request(&self) -> bool {
        !self.is_polling()
    }

    /// Publishing additionally excludes videos that are already published.
    pub fn accepts_publish(&self) -> bool {
        !self.is_polling() && !self.is_terminal()
    }

    /// Next status for `event`, or `InvalidTransition`.
    pub fn transition(self, event: &LifecycleEvent) -> Result<VideoStatus, AppError> {
        let next = match (self, event) {
            (VideoStatus::Uploading, LifecycleEvent::UploadStored) => Some(VideoStatus::Ready),
            (s, LifecycleEvent::CaptionRequested) if s.accepts_caption_request() => {
                Some(VideoStatus::Captioning)
            }
            (VideoStatus::Captioning, LifecycleEvent::CaptionsPersisted) => {
                Some(VideoStatus::MetadataReady)
            }
            (s, LifecycleEvent::PublishSubmitted) if s.accepts_publish() => {
                Some(VideoStatus::Publishing)
            }
            (VideoStatus::Publishing, LifecycleEvent::PublishReported) => {
                Some(VideoStatus::Published)
            }
            (s, LifecycleEvent::Failed { .. }) if !s.is_terminal() => Some(VideoStatus::Error),
            _ => None,
        };

        next.ok_or_else(|| AppError::InvalidTransition {
            from: self,
            event: event.name(),
        })
    }
}

impl Video {
    /// Apply a lifecycle event to this snapshot.
    ///
    /// A failure stores its message; any other transition clears the previous one.
    pub fn apply(&mut self, event: &LifecycleEvent) -> Result<VideoStatus, AppError> {
        let next = self.status.transition(event)?;
        tracing::debug!(
            video_id = %self.id,
            from = %self.status,
            to = %next,
            event = %event,
            "Video lifecycle transition"
        );
        self.status = next;
        self.error_message = match event {
            LifecycleEvent::Failed { message } => Some(message.clone()),
            _ => None,
        };
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConfidentialityStatus;
    use serde_json::json;

    const ALL: [VideoStatus; 9] = [
        VideoStatus::Uploading,
        VideoStatus::Ready,
        VideoStatus::Processing,
        VideoStatus::Captioning,
        VideoStatus::MetadataReady,
        VideoStatus::Publishing,
        VideoStatus::Published,
        VideoStatus::Error,
        VideoStatus::Unknown,
    ];

    fn video(status: &str) -> Video {
        serde_json::from_value(json!({
            "id": 1,
            "original_filename": "clip.mp4",
            "status": status,
        }))
        .unwrap()
    }

    fn failed() -> LifecycleEvent {
        LifecycleEvent::Failed {
            message: "boom".to_string(),
        }
    }

    #[test]
    fn happy_path() {
        let mut v = video("uploading");
        for (event, expected) in [
            (LifecycleEvent::UploadStored, VideoStatus::Ready),
            (LifecycleEvent::CaptionRequested, VideoStatus::Captioning),
            (LifecycleEvent::CaptionsPersisted, VideoStatus::MetadataReady),
            (LifecycleEvent::PublishSubmitted, VideoStatus::Publishing),
            (LifecycleEvent::PublishReported, VideoStatus::Published),
        ] {
            assert_eq!(v.apply(&event).unwrap(), expected);
        }
    }

    #[test]
    fn error_reachable_from_every_non_terminal_state() {
        for status in ALL {
            let result = status.transition(&failed());
            if status.is_terminal() {
                assert!(result.is_err());
            } else {
                assert_eq!(result.unwrap(), VideoStatus::Error);
            }
        }
    }

    #[test]
    fn error_is_left_only_by_user_action() {
        let mut v = video("ready");
        v.apply(&failed()).unwrap();
        assert_eq!(v.error_message.as_deref(), Some("boom"));
        assert!(v.status.transition(&LifecycleEvent::CaptionsPersisted).is_err());

        v.apply(&LifecycleEvent::CaptionRequested).unwrap();
        assert_eq!(v.status, VideoStatus::Captioning);
        assert!(v.error_message.is_none());
    }

    #[test]
    fn rejects_out_of_order_events() {
        assert!(VideoStatus::Captioning
            .transition(&LifecycleEvent::CaptionRequested)
            .is_err());
        assert!(VideoStatus::Publishing
            .transition(&LifecycleEvent::CaptionRequested)
            .is_err());
        assert!(VideoStatus::Ready
            .transition(&LifecycleEvent::PublishReported)
            .is_err());
        assert!(VideoStatus::Captioning
            .transition(&LifecycleEvent::PublishSubmitted)
            .is_err());
        assert!(matches!(
            VideoStatus::Published.transition(&LifecycleEvent::PublishSubmitted),
            Err(AppError::InvalidTransition {
                from: VideoStatus::Published,
                ..
            })
        ));
    }

    #[test]
    fn actions_blocked_only_while_a_job_runs() {
        for status in [
            VideoStatus::Uploading,
            VideoStatus::Processing,
            VideoStatus::Unknown,
            VideoStatus::Ready,
            VideoStatus::MetadataReady,
            VideoStatus::Error,
        ] {
            assert!(status.accepts_caption_request(), "{status}");
            assert!(status.accepts_publish(), "{status}");
            assert_eq!(
                status.transition(&LifecycleEvent::PublishSubmitted).unwrap(),
                VideoStatus::Publishing
            );
        }

        assert!(VideoStatus::Published.accepts_caption_request());
        assert!(!VideoStatus::Published.accepts_publish());
        for status in [VideoStatus::Captioning, VideoStatus::Publishing] {
            assert!(!status.accepts_caption_request());
            assert!(!status.accepts_publish());
        }
    }

    #[test]
    fn polling_states() {
        let polling: Vec<_> = ALL.iter().filter(|s| s.is_polling()).collect();
        assert_eq!(
            polling,
            vec![&VideoStatus::Captioning, &VideoStatus::Publishing]
        );
    }

    #[test]
    fn transitions_leave_confidentiality_alone() {
        for confidentiality in [
            ConfidentialityStatus::Pass,
            ConfidentialityStatus::Warn,
            ConfidentialityStatus::Fail,
        ] {
            let mut v = video("ready");
            v.confidentiality_status = Some(confidentiality);
            v.apply(&LifecycleEvent::CaptionRequested).unwrap();
            v.apply(&LifecycleEvent::CaptionsPersisted).unwrap();
            v.apply(&failed()).unwrap();
            assert_eq!(v.confidentiality_status, Some(confidentiality));
        }
    }
}

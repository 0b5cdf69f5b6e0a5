//! Helpers shared by the `vstudio` binary: output formatting, prompts and
//! error notifications.

use anyhow::Context;
use serde::Serialize;
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use vstudio_api_client::{watch_if_polling, ClientError, PollEvent, VideoSource};
use vstudio_core::{AppError, ErrorMetadata, Video};

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Initialize tracing for CLI binaries. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Ask a yes/no question. Anything but `y`/`yes` declines.
pub fn confirm_with<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    prompt: &str,
) -> anyhow::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer).context("Read confirmation")?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Confirm on the terminal unless `assume_yes` was given.
pub fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    confirm_with(std::io::stdin().lock(), std::io::stderr(), prompt)
}

/// Notification text for an error that reached the command boundary.
pub fn error_notification(err: &anyhow::Error) -> String {
    let (message, hint) = if let Some(client) = err.downcast_ref::<ClientError>() {
        (client.client_message(), client.suggested_action())
    } else if let Some(app) = err.downcast_ref::<AppError>() {
        (app.client_message(), app.suggested_action())
    } else {
        (format!("{:#}", err), None)
    };

    match hint {
        Some(hint) => format!("error: {}\n  hint: {}", message, hint),
        None => format!("error: {}", message),
    }
}

/// Warning shown before publishing a video whose confidentiality scan needs review.
pub fn publish_warning(video: &Video) -> Option<String> {
    if !video.has_confidentiality_issues() {
        return None;
    }
    let status = video
        .confidentiality_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unchecked".to_string());
    Some(format!(
        "Confidentiality check reported '{}' with {} finding(s) for video {}",
        status,
        video.confidentiality_issues.len(),
        video.id
    ))
}

/// One-line summary used while watching a video.
pub fn status_line(video: &Video) -> String {
    match video.inline_error() {
        Some(message) => format!("{} [{}] {}", video.id, video.status, message),
        None => format!("{} [{}] {}", video.id, video.status, video.display_title()),
    }
}

/// Follow a freshly fetched video until it leaves `captioning`/`publishing`.
///
/// Status lines go to stderr. Returns the last snapshot seen, or `video`
/// itself when nothing is running. Ctrl-C stops following early.
pub async fn settle<S: VideoSource>(source: Arc<S>, video: Video, period: Duration) -> Video {
    eprintln!("{}", status_line(&video));
    let Some(mut handle) = watch_if_polling(source, &video, period) else {
        return video;
    };

    let mut latest = video;
    loop {
        tokio::select! {
            event = handle.next() => match event {
                Some(PollEvent::Snapshot(snapshot)) => {
                    eprintln!("{}", status_line(&snapshot));
                    latest = snapshot;
                }
                Some(PollEvent::FetchFailed(err)) => {
                    eprintln!("warning: {}", err);
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
                eprintln!("Stopped watching");
                break;
            }
        }
    }
    latest
}

pub fn render_video_table(videos: &[Video]) -> String {
    let mut out = String::new();
    if videos.is_empty() {
        out.push_str("No videos found.\n");
        return out;
    }

    out.push_str(&format!(
        "{:<10} {:<15} {:<40} {:<12} {:>20}\n",
        "ID", "Status", "Title", "Privacy", "Created At"
    ));
    out.push_str(&"-".repeat(101));
    out.push('\n');

    for video in videos {
        let created = video
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        let privacy = video
            .privacy_status
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:<10} {:<15} {:<40} {:<12} {:>20}\n",
            truncate_string(&video.id.to_string(), 10),
            video.status,
            truncate_string(video.display_title(), 40),
            privacy,
            created
        ));
        if let Some(message) = video.inline_error() {
            out.push_str(&format!("{:<10} ! {}\n", "", truncate_string(message, 88)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video(fields: serde_json::Value) -> Video {
        let mut base = json!({
            "id": 5,
            "original_filename": "demo.mp4",
            "status": "ready",
            "created_at": "2025-01-02T03:04:05"
        });
        if let (Some(target), serde_json::Value::Object(extra)) = (base.as_object_mut(), fields) {
            target.extend(extra);
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("", 5), "");
    }

    #[test]
    fn truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("abc", 2), "...");
    }

    #[test]
    fn truncate_string_multibyte() {
        assert_eq!(truncate_string("vidéo été", 7), "vidé...");
        assert_eq!(truncate_string("日本語", 3), "日本語");
    }

    #[test]
    fn confirm_accepts_only_yes() {
        let mut sink = Vec::new();
        assert!(confirm_with(&b"y\n"[..], &mut sink, "Delete?").unwrap());
        assert!(confirm_with(&b"YES\n"[..], &mut sink, "Delete?").unwrap());
        assert!(!confirm_with(&b"\n"[..], &mut sink, "Delete?").unwrap());
        assert!(!confirm_with(&b"nope\n"[..], &mut sink, "Delete?").unwrap());
        assert!(String::from_utf8(sink).unwrap().starts_with("Delete? [y/N]"));
    }

    #[test]
    fn notification_uses_backend_message_and_hint() {
        let err = anyhow::Error::new(ClientError::Api {
            status: 404,
            message: "Video not found".to_string(),
        });
        let text = error_notification(&err);
        assert!(text.starts_with("error: Video not found"));
        assert!(text.contains("hint:"));

        let plain = anyhow::anyhow!("something odd");
        assert_eq!(error_notification(&plain), "error: something odd");
    }

    #[test]
    fn publish_warning_only_for_flagged_videos() {
        assert!(publish_warning(&video(json!({}))).is_none());
        assert!(publish_warning(&video(json!({"confidentiality_status": "pass"}))).is_none());

        let flagged = video(json!({
            "confidentiality_status": "fail",
            "confidentiality_issues": [{"risk": "high", "reason": "API key", "snippet": "sk-"}]
        }));
        let warning = publish_warning(&flagged).unwrap();
        assert!(warning.contains("'fail'"));
        assert!(warning.contains("1 finding"));
    }

    #[test]
    fn table_shows_inline_errors() {
        let ok = video(json!({"title": "Launch"}));
        let failed = video(json!({
            "id": 6,
            "status": "error",
            "error_message": "Transcription failed"
        }));
        let table = render_video_table(&[ok, failed]);
        assert!(table.contains("Launch"));
        assert!(table.contains("2025-01-02 03:04:05"));
        assert!(table.contains("! Transcription failed"));
        assert_eq!(render_video_table(&[]), "No videos found.\n");
    }

    struct Backend {
        statuses: std::sync::Mutex<Vec<&'static str>>,
    }

    #[async_trait::async_trait]
    impl VideoSource for Backend {
        async fn fetch_video(
            &self,
            _video_id: &vstudio_core::VideoId,
        ) -> vstudio_api_client::Result<Video> {
            let mut statuses = self.statuses.lock().unwrap();
            let status = if statuses.len() > 1 {
                statuses.remove(0)
            } else {
                statuses[0]
            };
            Ok(video(json!({ "status": status })))
        }
    }

    fn backend(statuses: Vec<&'static str>) -> Arc<Backend> {
        Arc::new(Backend {
            statuses: std::sync::Mutex::new(statuses),
        })
    }

    #[tokio::test]
    async fn settle_follows_running_jobs_to_the_end() {
        let source = backend(vec!["captioning", "metadata_ready"]);
        let latest = settle(
            source.clone(),
            video(json!({"status": "captioning"})),
            Duration::from_millis(5),
        )
        .await;
        assert_eq!(latest.status, vstudio_core::VideoStatus::MetadataReady);
        assert_eq!(*source.statuses.lock().unwrap(), vec!["metadata_ready"]);
    }

    #[tokio::test]
    async fn settle_returns_settled_snapshot_untouched() {
        let source = backend(vec!["publishing"]);
        let latest = settle(
            source.clone(),
            video(json!({"status": "metadata_ready"})),
            Duration::from_millis(5),
        )
        .await;
        assert_eq!(latest.status, vstudio_core::VideoStatus::MetadataReady);
        assert_eq!(source.statuses.lock().unwrap().len(), 1);
    }

    #[test]
    fn status_line_prefers_error() {
        let failed = video(json!({"status": "error", "error_message": "boom"}));
        assert_eq!(status_line(&failed), "5 [error] boom");
        assert_eq!(status_line(&video(json!({}))), "5 [ready] demo.mp4");
    }
}

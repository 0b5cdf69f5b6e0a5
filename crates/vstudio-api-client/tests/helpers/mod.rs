#![allow(dead_code)]

use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};
use vstudio_api_client::{ApiClient, Session};

pub const TEST_USER: &str = "user_testsession01";

pub struct TestBackend {
    pub server: ServerGuard,
    pub client: ApiClient,
}

pub async fn setup_backend() -> TestBackend {
    let server = mockito::Server::new_async().await;
    let session = Session::new(TEST_USER).unwrap();
    let client = ApiClient::new(server.url(), session).unwrap();
    TestBackend { server, client }
}

impl TestBackend {
    /// JSON endpoint that only answers requests carrying the session header.
    pub async fn json_mock(&mut self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock(method, path)
            .match_header("x-user-id", TEST_USER)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }
}

pub fn video_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": TEST_USER,
        "original_filename": "keynote.mp4",
        "storage_path": format!("https://cdn.example.com/{}/keynote.mp4", TEST_USER),
        "file_size": 2048,
        "mime_type": "video/mp4",
        "duration_ms": null,
        "status": status,
        "error_message": null,
        "transcript": null,
        "captions": null,
        "language": "en",
        "ai_summary": null,
        "title": null,
        "description": null,
        "tags": null,
        "hashtags": null,
        "thumbnail_prompt": null,
        "thumbnail_url": null,
        "privacy_status": "private",
        "category": null,
        "youtube_id": null,
        "youtube_url": null,
        "youtube_channel_id": null,
        "published_at": null,
        "confidentiality_status": null,
        "confidentiality_issues": [],
        "created_at": "2025-03-01T10:00:00.123456",
        "updated_at": "2025-03-01T10:00:00.123456"
    })
}

pub fn with_fields(mut video: Value, fields: Value) -> Value {
    if let (Some(target), Value::Object(extra)) = (video.as_object_mut(), fields) {
        target.extend(extra);
    }
    video
}

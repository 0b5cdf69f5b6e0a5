mod helpers;

use helpers::{setup_backend, video_json, with_fields, TEST_USER};
use mockito::Matcher;
use serde_json::json;
use vstudio_core::captions::{existing_languages, supported_languages, transcript_from_srt};
use vstudio_core::models::{CaptionFormat, GenerateMetadataRequest};
use vstudio_core::{
    ConfidentialityStatus, ErrorCategory, ErrorMetadata, LanguageSelection, RiskLevel, VideoId,
};

const SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nWelcome everyone\n\n2\n00:00:02,500 --> 00:00:04,000\nto the launch\n";

#[tokio::test]
async fn test_request_captions_defaults_to_english() {
    let mut backend = setup_backend().await;
    let mock = backend
        .server
        .mock("POST", "/video/caption")
        .match_header("x-user-id", TEST_USER)
        .match_body(Matcher::Json(json!({"video_id": 7, "language_code": "en"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"captions_format": "srt", "captions": SRT}).to_string())
        .create_async()
        .await;

    let response = backend
        .client
        .request_captions(&VideoId::Numeric(7), None)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.captions_format, CaptionFormat::Srt);
    assert_eq!(
        transcript_from_srt(&response.captions),
        "Welcome everyone to the launch"
    );
}

#[tokio::test]
async fn test_request_captions_failure_message() {
    let mut backend = setup_backend().await;
    backend
        .json_mock(
            "POST",
            "/video/caption",
            502,
            json!({"detail": "Transcription failed: upstream timeout"}),
        )
        .await;

    let err = backend
        .client
        .request_captions(&VideoId::Numeric(7), Some("de"))
        .await
        .unwrap_err();

    assert_eq!(err.client_message(), "Transcription failed: upstream timeout");
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_save_captions_marks_metadata_ready() {
    let mut backend = setup_backend().await;
    let mock = backend
        .server
        .mock("PATCH", "/video/7")
        .match_header("x-user-id", TEST_USER)
        .match_body(Matcher::Json(json!({
            "status": "metadata_ready",
            "captions": SRT,
            "transcript": "Welcome everyone to the launch"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            with_fields(
                video_json(7, "metadata_ready"),
                json!({"captions": SRT, "transcript": "Welcome everyone to the launch"}),
            )
            .to_string(),
        )
        .create_async()
        .await;

    let video = backend
        .client
        .save_captions(
            &VideoId::Numeric(7),
            SRT.to_string(),
            Some(transcript_from_srt(SRT)),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(video.caption_text(), Some(SRT));
    assert!(video.existing_caption_languages().contains("en"));
}

#[tokio::test]
async fn test_supported_languages() {
    let mut backend = setup_backend().await;
    backend
        .json_mock(
            "GET",
            "/video/caption/languages",
            200,
            json!({"languages": [{"code": "en", "name": "English"}, {"code": "fr", "name": "French"}]}),
        )
        .await;

    let languages = backend.client.supported_languages().await.unwrap();
    assert_eq!(languages.len(), 2);
    assert_eq!(languages[1].code, "fr");
}

#[tokio::test]
async fn test_translate_only_missing_languages() {
    let mut backend = setup_backend().await;
    let video_body = with_fields(
        video_json(9, "metadata_ready"),
        json!({"captions": {"en": SRT, "es": "1\n00:00:00,000 --> 00:00:01,000\nHola\n"}}),
    );
    backend.json_mock("GET", "/video/9", 200, video_body).await;

    let video = backend.client.get_video(&VideoId::Numeric(9)).await.unwrap();
    let existing = existing_languages(video.captions.as_ref(), video.language.as_deref());

    let mut selection =
        LanguageSelection::new(supported_languages(), existing, video.source_language());
    selection.select("es");
    selection.select("fr");
    selection.select("de");
    let targets = selection.to_translate();
    assert_eq!(targets, vec!["fr".to_string(), "de".to_string()]);

    let mock = backend
        .server
        .mock("POST", "/video/caption/translate")
        .match_header("x-user-id", TEST_USER)
        .match_body(Matcher::Json(json!({
            "video_id": 9,
            "target_languages": ["fr", "de"],
            "source_language": "en"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"languages_added": ["fr", "de"]}).to_string())
        .create_async()
        .await;

    let response = backend
        .client
        .translate_captions(&video.id, targets, video.source_language())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.languages_added, vec!["fr", "de"]);
}

#[tokio::test]
async fn test_translate_with_nothing_selected_is_rejected() {
    let mut backend = setup_backend().await;
    let mock = backend
        .server
        .mock("POST", "/video/caption/translate")
        .expect(0)
        .create_async()
        .await;

    let err = backend
        .client
        .translate_captions(&VideoId::Numeric(9), Vec::new(), "en")
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[tokio::test]
async fn test_generate_metadata_returns_candidates() {
    let mut backend = setup_backend().await;
    let mock = backend
        .server
        .mock("POST", "/video/metadata/generate")
        .match_header("x-user-id", TEST_USER)
        .match_body(Matcher::Json(json!({"video_id": 7, "tone": "playful"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "ai_summary": "A product launch keynote.",
                "title": "Launch Day",
                "description": "Everything we shipped.",
                "tags": "launch, keynote",
                "hashtags": "",
                "thumbnail_prompt": null,
                "model_used": "gpt-4o-mini"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let mut request = GenerateMetadataRequest::for_video(VideoId::Numeric(7));
    request.tone = Some("playful".to_string());
    let response = backend.client.generate_metadata(&request).await.unwrap();

    mock.assert_async().await;
    let patch = response.as_patch();
    assert_eq!(patch.title.as_deref(), Some("Launch Day"));
    assert!(patch.hashtags.is_none());
    assert!(patch.status.is_none());
}

#[tokio::test]
async fn test_confidentiality_check_findings() {
    let mut backend = setup_backend().await;
    let mock = backend
        .server
        .mock("POST", "/video/confidentiality/check")
        .match_header("x-user-id", TEST_USER)
        .match_body(Matcher::Json(json!({"video_id": 7})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "overall_status": "warn",
                "summary": "Internal revenue figures mentioned.",
                "segments": [
                    {"risk": "high", "reason": "Revenue figure", "snippet": "we made 4.2M"},
                    {"risk": "low", "reason": "Codename", "snippet": "project falcon"}
                ],
                "model_used": "gpt-4o-mini",
                "check_id": 3
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = backend
        .client
        .check_confidentiality(&VideoId::Numeric(7))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.overall_status, ConfidentialityStatus::Warn);
    assert!(result.overall_status.needs_review());
    let counts = result.risk_counts();
    assert_eq!((counts.high, counts.medium, counts.low), (1, 0, 1));
    assert_eq!(result.segments[0].risk, RiskLevel::High);
    assert_eq!(result.check_id.as_deref(), Some("3"));
}

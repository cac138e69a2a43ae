//! Router tests with a pipeline built from fake stages.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use vscreen_ai::{Evaluation, Transcript};
use vscreen_api::{create_router, ApiConfig, AppState};
use vscreen_media::{MediaError, MediaResult, VideoInfo};
use vscreen_models::{ContentScores, PresenceSummary};
use vscreen_pipeline::{
    AudioExtractor, ObjectScanner, PipelineConfig, SpeechTranscriber, Stages, TranscriptEvaluator,
    VideoPipeline, VideoValidator,
};

const BOUNDARY: &str = "vscreen-test-boundary";

#[derive(Default)]
struct Calls {
    validate: AtomicUsize,
    too_long: bool,
}

struct FakeValidator(Arc<Calls>);
struct FakeScanner;
struct FakeExtractor;
struct FakeTranscriber;
struct FakeEvaluator;

#[async_trait]
impl VideoValidator for FakeValidator {
    async fn validate(&self, video_path: &Path) -> MediaResult<VideoInfo> {
        self.0.validate.fetch_add(1, Ordering::SeqCst);
        assert!(video_path.exists(), "upload must be on disk before validation");
        if self.0.too_long {
            return Err(MediaError::DurationExceeded {
                duration_secs: 90.0,
                max_secs: 60.0,
            });
        }
        Ok(VideoInfo {
            duration: Some(12.0),
            has_audio: true,
            ..VideoInfo::default()
        })
    }
}

impl ObjectScanner for FakeScanner {
    fn scan(&self, _video_path: &Path, _cancel: &AtomicBool) -> MediaResult<PresenceSummary> {
        Ok(PresenceSummary::absent(12))
    }
}

#[async_trait]
impl AudioExtractor for FakeExtractor {
    async fn extract(&self, _video_path: &Path, audio_path: &Path) -> MediaResult<()> {
        tokio::fs::write(audio_path, b"RIFF").await?;
        Ok(())
    }
}

#[async_trait]
impl SpeechTranscriber for FakeTranscriber {
    async fn transcribe(&self, _audio_path: &Path) -> Transcript {
        Transcript {
            text: "I led the migration of our billing service to Rust".to_string(),
            source: Some("fake"),
            degraded: None,
        }
    }
}

#[async_trait]
impl TranscriptEvaluator for FakeEvaluator {
    async fn evaluate(&self, _transcript: &str) -> Evaluation {
        Evaluation {
            scores: ContentScores::new(7, 6),
            degraded: None,
        }
    }
}

struct TestApp {
    _root: TempDir,
    router: Router,
    calls: Arc<Calls>,
    video_dir: std::path::PathBuf,
}

impl TestApp {
    fn new() -> Self {
        Self::build(Calls::default(), ApiConfig::default())
    }

    fn build(calls: Calls, api_config: ApiConfig) -> Self {
        let root = TempDir::new().unwrap();
        let config = PipelineConfig::default().with_temp_root(root.path());
        config.ensure_dirs().unwrap();
        let video_dir = config.temp_video_dir.clone();

        let calls = Arc::new(calls);
        let stages = Stages {
            validator: Arc::new(FakeValidator(calls.clone())),
            scanner: Arc::new(FakeScanner),
            extractor: Arc::new(FakeExtractor),
            transcriber: Arc::new(FakeTranscriber),
            evaluator: Arc::new(FakeEvaluator),
        };
        let state = AppState::new(api_config, VideoPipeline::new(config, stages));

        Self {
            _root: root,
            router: create_router(state, None),
            calls,
            video_dir,
        }
    }

    fn validate_calls(&self) -> usize {
        self.calls.validate.load(Ordering::SeqCst)
    }

    fn saved_videos(&self) -> usize {
        std::fs::read_dir(&self.video_dir).unwrap().count()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let body = multipart_body(field, filename, content);
    Request::builder()
        .method("POST")
        .uri("/analyze-video")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let request = Request::get("/health").body(Body::empty()).unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_wrong_extension_rejected_before_pipeline() {
    let app = TestApp::new();

    let (status, body) = app.send(upload("file", "notes.txt", b"hello")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Invalid file type. Allowed:"));
    assert!(detail.contains(".mp4"));
    assert_eq!(app.validate_calls(), 0);
    assert_eq!(app.saved_videos(), 0);
}

#[tokio::test]
async fn test_missing_extension_rejected() {
    let app = TestApp::new();

    let (status, _) = app.send(upload("file", "interview", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.validate_calls(), 0);
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = TestApp::new();

    let (status, body) = app.send(upload("video", "answer.mp4", b"data")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("file"));
    assert_eq!(app.validate_calls(), 0);
}

#[tokio::test]
async fn test_valid_upload_returns_result() {
    let app = TestApp::new();

    let (status, body) = app.send(upload("file", "Answer.MP4", b"fake video bytes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_valid"], true);
    assert_eq!(body["id_card_present"], false);
    assert_eq!(body["id_card_confidence"], 0.0);
    assert_eq!(body["audio_score"], 7);
    assert_eq!(body["final_score"], 6);
    assert_eq!(
        body["transcript"],
        "I led the migration of our billing service to Rust"
    );
    assert!(body["error"].is_null());

    assert_eq!(app.validate_calls(), 1);
    // Pipeline deleted the saved upload
    assert_eq!(app.saved_videos(), 0);
}

#[tokio::test]
async fn test_pipeline_error_still_returns_ok() {
    let calls = Calls {
        too_long: true,
        ..Calls::default()
    };
    let app = TestApp::build(calls, ApiConfig::default());

    let (status, body) = app.send(upload("file", "answer.webm", b"long video")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_valid"], false);
    assert_eq!(body["transcript"], "");
    assert!(body["error"].as_str().unwrap().contains("60"));
    assert_eq!(app.saved_videos(), 0);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let api_config = ApiConfig {
        max_body_size: 1024,
        ..ApiConfig::default()
    };
    let app = TestApp::build(Calls::default(), api_config);

    let (status, _) = app
        .send(upload("file", "answer.mp4", &vec![0u8; 8 * 1024]))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(app.validate_calls(), 0);
    assert_eq!(app.saved_videos(), 0);
}

#[tokio::test]
async fn test_metrics_not_mounted_without_handle() {
    let app = TestApp::new();
    let request = Request::get("/metrics").body(Body::empty()).unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

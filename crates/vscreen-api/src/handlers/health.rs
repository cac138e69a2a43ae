//! Health check handlers.

use std::path::Path;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;
use vscreen_media::detection::is_model_available_at;
use vscreen_media::{check_ffmpeg, check_ffprobe};

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub ffprobe: CheckStatus,
    pub temp_dirs: CheckStatus,
    pub model: CheckStatus,
}

impl ReadinessChecks {
    fn all_ok(&self) -> bool {
        [&self.ffmpeg, &self.ffprobe, &self.temp_dirs, &self.model]
            .iter()
            .all(|c| c.is_ok())
    }
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn timed<E: std::fmt::Display>(check: impl FnOnce() -> Result<(), E>) -> Self {
        let start = Instant::now();
        match check() {
            Ok(()) => Self::ok(start.elapsed().as_millis() as u64),
            Err(e) => Self::error(e.to_string()),
        }
    }
}

/// Readiness check endpoint (readiness probe).
/// Checks the media tools, scratch directories and detection model.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let config = state.pipeline_config();

    let checks = ReadinessChecks {
        ffmpeg: CheckStatus::timed(|| check_ffmpeg().map(|_| ())),
        ffprobe: CheckStatus::timed(|| check_ffprobe().map(|_| ())),
        temp_dirs: CheckStatus::timed(|| {
            probe_writable(&config.temp_video_dir)
                .and_then(|_| probe_writable(&config.temp_audio_dir))
        }),
        model: CheckStatus::timed(|| {
            if is_model_available_at(&config.detector.model_path) {
                Ok(())
            } else {
                Err(format!(
                    "Model not found: {}",
                    config.detector.model_path.display()
                ))
            }
        }),
    };

    let ready = checks.all_ok();
    let response = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        checks,
    };

    if ready {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Create and remove a marker file in `dir`.
fn probe_writable(dir: &Path) -> std::io::Result<()> {
    let marker = dir.join(format!(".ready-{}", Uuid::new_v4()));
    std::fs::write(&marker, b"")?;
    std::fs::remove_file(&marker)
}

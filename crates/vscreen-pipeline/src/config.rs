//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

use vscreen_ai::AiConfig;
use vscreen_media::{ObjectDetectorConfig, PresenceConfig};
use vscreen_models::VideoPolicy;

use crate::error::SetupResult;

/// Everything a [`VideoPipeline`](crate::VideoPipeline) needs, passed in
/// at construction.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Uploaded videos (one file per run)
    pub temp_video_dir: PathBuf,
    /// Extracted audio (one file per run)
    pub temp_audio_dir: PathBuf,
    /// Upper bound for a whole run
    pub run_timeout: Duration,
    /// Upper bound for a single FFmpeg invocation
    pub ffmpeg_timeout: Duration,
    pub policy: VideoPolicy,
    pub presence: PresenceConfig,
    pub detector: ObjectDetectorConfig,
    pub ai: AiConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let temp_root = PathBuf::from("temp");
        Self {
            temp_video_dir: temp_root.join("video"),
            temp_audio_dir: temp_root.join("audio"),
            run_timeout: Duration::from_secs(300),
            ffmpeg_timeout: Duration::from_secs(120),
            policy: VideoPolicy::default(),
            presence: PresenceConfig::default(),
            detector: ObjectDetectorConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    ///
    /// Fails when the video policy settings are present but invalid.
    pub fn from_env() -> SetupResult<Self> {
        let temp_root = std::env::var("VSCREEN_TEMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("temp"));

        Ok(Self {
            temp_video_dir: temp_root.join("video"),
            temp_audio_dir: temp_root.join("audio"),
            run_timeout: Duration::from_secs(
                std::env::var("VSCREEN_RUN_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            ffmpeg_timeout: Duration::from_secs(
                std::env::var("VSCREEN_FFMPEG_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            policy: VideoPolicy::from_env()?,
            presence: PresenceConfig::from_env(),
            detector: ObjectDetectorConfig::from_env(),
            ai: AiConfig::from_env(),
        })
    }

    /// Same settings with both temp directories under `root`.
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        self.temp_video_dir = root.join("video");
        self.temp_audio_dir = root.join("audio");
        self
    }

    /// Create the temp directories. Call once at startup.
    pub fn ensure_dirs(&self) -> SetupResult<()> {
        std::fs::create_dir_all(&self.temp_video_dir)?;
        std::fs::create_dir_all(&self.temp_audio_dir)?;
        Ok(())
    }
}

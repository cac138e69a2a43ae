//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while validating, decoding or extracting media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Video file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid file format: {extension}. Allowed: {allowed}")]
    UnsupportedFormat { extension: String, allowed: String },

    #[error("Video duration ({duration_secs:.2}s) exceeds limit ({max_secs}s).")]
    DurationExceeded { duration_secs: f64, max_secs: f64 },

    #[error("Failed to process video file: {0}")]
    DecodeFailed(String),

    #[error("Failed to extract audio: Video has no audio track.")]
    NoAudioTrack,

    #[error("Failed to extract audio: {0}")]
    ExtractionFailed(String),

    #[error("Object detection failed: {0}")]
    DetectionFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a decode failure error.
    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::DecodeFailed(message.into())
    }

    /// Create an audio extraction failure error.
    pub fn extraction_failed(message: impl Into<String>) -> Self {
        Self::ExtractionFailed(message.into())
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable tag for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::FfmpegNotFound => "ffmpeg_not_found",
            MediaError::FfprobeNotFound => "ffprobe_not_found",
            MediaError::FfmpegFailed { .. } => "ffmpeg_failed",
            MediaError::FfprobeFailed { .. } => "ffprobe_failed",
            MediaError::FileNotFound(_) => "not_found",
            MediaError::UnsupportedFormat { .. } => "format",
            MediaError::DurationExceeded { .. } => "duration",
            MediaError::DecodeFailed(_) => "decode",
            MediaError::NoAudioTrack => "no_audio_track",
            MediaError::ExtractionFailed(_) => "extraction",
            MediaError::DetectionFailed(_) => "detection",
            MediaError::ModelNotFound(_) => "model_not_found",
            MediaError::Timeout(_) => "timeout",
            MediaError::Io(_) => "io",
            MediaError::JsonParse(_) => "json",
            MediaError::Cancelled => "cancelled",
            MediaError::Internal(_) => "internal",
        }
    }
}

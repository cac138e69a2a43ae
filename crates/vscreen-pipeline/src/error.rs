//! Pipeline error types.

use thiserror::Error;
use vscreen_ai::AiError;
use vscreen_media::MediaError;
use vscreen_models::{PipelineStage, PolicyError};

pub type StageResult<T> = Result<T, StageError>;
pub type SetupResult<T> = Result<T, PipelineError>;

/// A fatal failure that stopped a run. Its `Display` string is what the
/// caller sees in `PipelineResult::error`.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("{source}")]
    Media {
        stage: PipelineStage,
        #[source]
        source: MediaError,
    },

    #[error("Analysis timed out after {secs}s while {stage}")]
    Timeout { stage: PipelineStage, secs: u64 },

    #[error("Internal error while {stage}: {message}")]
    TaskPanicked {
        stage: PipelineStage,
        message: String,
    },
}

impl StageError {
    pub fn media(stage: PipelineStage, source: MediaError) -> Self {
        Self::Media { stage, source }
    }

    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Media { stage, .. } | Self::Timeout { stage, .. } | Self::TaskPanicked { stage, .. } => *stage,
        }
    }

    /// Stable tag for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Media { source, .. } => source.kind(),
            Self::Timeout { .. } => "timeout",
            Self::TaskPanicked { .. } => "task_panicked",
        }
    }
}

/// Failure to build or initialise a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid video policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("AI client error: {0}")]
    Ai(#[from] AiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_failure_uses_media_message() {
        let err = StageError::media(PipelineStage::ExtractingAudio, MediaError::NoAudioTrack);
        assert_eq!(err.to_string(), MediaError::NoAudioTrack.to_string());
        assert_eq!(err.stage(), PipelineStage::ExtractingAudio);
        assert_eq!(err.kind(), MediaError::NoAudioTrack.kind());
    }

    #[test]
    fn test_timeout_message() {
        let err = StageError::Timeout {
            stage: PipelineStage::Transcribing,
            secs: 300,
        };
        assert_eq!(err.to_string(), "Analysis timed out after 300s while transcribing");
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_policy_error_converts() {
        let err: PipelineError = PolicyError::NoExtensions.into();
        assert!(matches!(err, PipelineError::Policy(_)));
        assert_eq!(
            err.to_string(),
            "Invalid video policy: At least one allowed extension is required"
        );
    }
}

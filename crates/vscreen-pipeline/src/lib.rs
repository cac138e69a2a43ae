//! Interview video analysis pipeline.
//!
//! [`VideoPipeline::run`] takes a submitted video through validation,
//! prohibited-object detection, audio extraction, transcription and
//! content evaluation, and always returns a [`PipelineResult`]. Temporary
//! files are owned by the run and deleted before it returns.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod stages;

pub use artifacts::TempArtifacts;
pub use config::PipelineConfig;
pub use error::{PipelineError, SetupResult, StageError, StageResult};
pub use logging::RunLogger;
pub use orchestrator::{Stages, VideoPipeline};
pub use stages::{
    AudioExtractor, FfmpegAudioExtractor, FfprobeValidator, ObjectScanner, SpeechTranscriber,
    TranscriptEvaluator, VideoValidator,
};
pub use vscreen_models::{PipelineResult, PipelineStage};

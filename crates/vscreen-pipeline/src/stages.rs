//! Stage contracts driven by the orchestrator, with their production
//! implementations.
//!
//! Validation, detection and extraction report fatal failures as
//! `MediaError`. Transcription and evaluation never fail; they return a
//! value with an optional degradation reason instead.

use std::path::Path;
use std::sync::atomic::AtomicBool;

use async_trait::async_trait;
use vscreen_ai::{ContentEvaluator, Evaluation, Transcript, TranscriptionChain};
use vscreen_media::{
    extract_audio, validate_video, FfmpegRunner, MediaResult, PresenceDetector, VideoInfo,
};
use vscreen_models::{PresenceSummary, VideoPolicy};

#[async_trait]
pub trait VideoValidator: Send + Sync {
    async fn validate(&self, video_path: &Path) -> MediaResult<VideoInfo>;
}

/// Blocking; the orchestrator runs it on a blocking thread.
///
/// Implementations should stop with `MediaError::Cancelled` soon after
/// `cancel` is set; the run has already been abandoned by then.
pub trait ObjectScanner: Send + Sync {
    fn scan(&self, video_path: &Path, cancel: &AtomicBool) -> MediaResult<PresenceSummary>;
}

#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract(&self, video_path: &Path, audio_path: &Path) -> MediaResult<()>;
}

#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> Transcript;
}

#[async_trait]
pub trait TranscriptEvaluator: Send + Sync {
    async fn evaluate(&self, transcript: &str) -> Evaluation;
}

/// Existence, extension and duration checks through ffprobe.
pub struct FfprobeValidator {
    policy: VideoPolicy,
}

impl FfprobeValidator {
    pub fn new(policy: VideoPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl VideoValidator for FfprobeValidator {
    async fn validate(&self, video_path: &Path) -> MediaResult<VideoInfo> {
        validate_video(video_path, &self.policy).await
    }
}

impl ObjectScanner for PresenceDetector {
    fn scan(&self, video_path: &Path, cancel: &AtomicBool) -> MediaResult<PresenceSummary> {
        PresenceDetector::scan(self, video_path, cancel)
    }
}

/// First audio track to 16 kHz mono WAV through FFmpeg.
pub struct FfmpegAudioExtractor {
    runner: FfmpegRunner,
}

impl FfmpegAudioExtractor {
    pub fn new(runner: FfmpegRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract(&self, video_path: &Path, audio_path: &Path) -> MediaResult<()> {
        extract_audio(video_path, audio_path, &self.runner).await
    }
}

#[async_trait]
impl SpeechTranscriber for TranscriptionChain {
    async fn transcribe(&self, audio_path: &Path) -> Transcript {
        TranscriptionChain::transcribe(self, audio_path).await
    }
}

#[async_trait]
impl TranscriptEvaluator for ContentEvaluator {
    async fn evaluate(&self, transcript: &str) -> Evaluation {
        ContentEvaluator::evaluate(self, transcript).await
    }
}


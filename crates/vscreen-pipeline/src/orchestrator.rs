//! Video analysis orchestrator.
//!
//! Drives validation, object detection, audio extraction, transcription and
//! evaluation in that order, folding every outcome into one
//! [`PipelineResult`]. Fatal stage failures stop the run and land in
//! `PipelineResult::error`; degraded stages only zero the fields they feed.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, Instrument};
use uuid::Uuid;
use vscreen_ai::{build_http_client, content_evaluator, default_transcription_chain};
use vscreen_media::{FfmpegRunner, ObjectDetector, PresenceDetector, EXTRACT_SAMPLE_RATE};
use vscreen_models::{PipelineResult, PipelineStage, PresenceSummary, RunId};

use crate::artifacts::TempArtifacts;
use crate::config::PipelineConfig;
use crate::error::{SetupResult, StageError, StageResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::stages::{
    AudioExtractor, FfmpegAudioExtractor, FfprobeValidator, ObjectScanner, SpeechTranscriber,
    TranscriptEvaluator, VideoValidator,
};

/// The five stage implementations a pipeline drives.
#[derive(Clone)]
pub struct Stages {
    pub validator: Arc<dyn VideoValidator>,
    pub scanner: Arc<dyn ObjectScanner>,
    pub extractor: Arc<dyn AudioExtractor>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub evaluator: Arc<dyn TranscriptEvaluator>,
}

/// Stateless orchestrator; one instance serves any number of concurrent runs.
#[derive(Clone)]
pub struct VideoPipeline {
    config: PipelineConfig,
    stages: Stages,
}

impl VideoPipeline {
    pub fn new(config: PipelineConfig, stages: Stages) -> Self {
        Self { config, stages }
    }

    /// Production pipeline: ffprobe validation, YOLOv8 presence detection,
    /// FFmpeg extraction and the hosted AI clients.
    ///
    /// Fails if the detection model cannot be loaded or the HTTP client
    /// cannot be built. Does not create the temp directories.
    pub fn from_config(config: PipelineConfig) -> SetupResult<Self> {
        let detector = ObjectDetector::new(config.detector.clone())?;
        let presence = PresenceDetector::new(Arc::new(detector), config.presence.clone());

        let runner = FfmpegRunner::new().with_timeout(config.ffmpeg_timeout.as_secs());

        let client = build_http_client(&config.ai)?;
        let transcriber = default_transcription_chain(client.clone(), &config.ai, EXTRACT_SAMPLE_RATE);
        let evaluator = content_evaluator(client, &config.ai);

        let stages = Stages {
            validator: Arc::new(FfprobeValidator::new(config.policy.clone())),
            scanner: Arc::new(presence),
            extractor: Arc::new(FfmpegAudioExtractor::new(runner)),
            transcriber: Arc::new(transcriber),
            evaluator: Arc::new(evaluator),
        };

        Ok(Self::new(config, stages))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Analyze the video at `video_path`.
    ///
    /// The pipeline takes ownership of the file: it is deleted before this
    /// returns, together with the extracted audio, whatever the outcome.
    /// Never fails; every expected failure is reported in the returned
    /// record's `error`.
    pub async fn run(&self, video_path: impl AsRef<Path>) -> PipelineResult {
        let video_path = video_path.as_ref().to_path_buf();
        let run_id = RunId::new();
        let logger = RunLogger::new(&run_id, "analyze_video");
        let span = logger.create_span();

        async move {
            let audio_path = self
                .config
                .temp_audio_dir
                .join(format!("{}.wav", Uuid::new_v4()));

            // Declared before any await so cancellation still cleans up
            let mut artifacts = TempArtifacts::new(run_id.as_str());
            artifacts.track(&video_path);
            artifacts.track(&audio_path);

            logger.log_start(&video_path.display().to_string());
            let started = Instant::now();
            let mut result = PipelineResult::new();

            let outcome = tokio::time::timeout(
                self.config.run_timeout,
                self.drive(&mut result, &video_path, &audio_path, &logger),
            )
            .await;

            let failure = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err),
                Err(_) => Some(StageError::Timeout {
                    stage: result.stage(),
                    secs: self.config.run_timeout.as_secs(),
                }),
            };

            let outcome_label = match &failure {
                None => "done",
                Some(StageError::Timeout { .. }) => "timeout",
                Some(_) => "failed",
            };

            if let Some(err) = failure {
                logger.log_error(err.stage(), &err.to_string());
                metrics::record_stage_failure(err.stage(), err.kind());
                result.fail(err.to_string());
            }

            let removed = artifacts.cleanup();
            debug!(run_id = %run_id, removed, "Temp artifacts cleaned up");

            let elapsed = started.elapsed().as_secs_f64();
            metrics::record_run(outcome_label, elapsed);
            logger.log_completion(result.stage(), result.is_failed(), elapsed);

            result
        }
        .instrument(span)
        .await
    }

    /// Run the stages in order, recording progress into `result`.
    async fn drive(
        &self,
        result: &mut PipelineResult,
        video_path: &Path,
        audio_path: &Path,
        logger: &RunLogger,
    ) -> StageResult<()> {
        let stage = result.advance();
        logger.log_stage(stage);
        let timer = Instant::now();
        let info = self
            .stages
            .validator
            .validate(video_path)
            .await
            .map_err(|e| StageError::media(stage, e))?;
        metrics::record_stage_duration(stage, timer.elapsed().as_secs_f64());
        debug!(duration = ?info.duration, has_audio = info.has_audio, "Video is valid");
        result.mark_valid();

        let stage = result.advance();
        logger.log_stage(stage);
        let timer = Instant::now();
        let presence = self.scan_blocking(stage, video_path.to_path_buf()).await?;
        metrics::record_stage_duration(stage, timer.elapsed().as_secs_f64());
        if presence.present {
            metrics::record_presence_detected();
        }
        result.record_presence(&presence);

        let stage = result.advance();
        logger.log_stage(stage);
        let timer = Instant::now();
        self.stages
            .extractor
            .extract(video_path, audio_path)
            .await
            .map_err(|e| StageError::media(stage, e))?;
        metrics::record_stage_duration(stage, timer.elapsed().as_secs_f64());

        let stage = result.advance();
        logger.log_stage(stage);
        let timer = Instant::now();
        let transcript = self.stages.transcriber.transcribe(audio_path).await;
        metrics::record_stage_duration(stage, timer.elapsed().as_secs_f64());
        if let Some(degraded) = &transcript.degraded {
            metrics::record_degraded(stage, "placeholder");
            logger.log_warning(stage, &format!("Transcription degraded: {}", degraded));
        }
        result.record_transcript(transcript.text);

        let stage = result.advance();
        logger.log_stage(stage);
        let timer = Instant::now();
        let evaluation = self.stages.evaluator.evaluate(result.transcript()).await;
        metrics::record_stage_duration(stage, timer.elapsed().as_secs_f64());
        if let Some(degraded) = &evaluation.degraded {
            metrics::record_degraded(stage, degraded.kind());
            logger.log_warning(stage, &format!("Evaluation degraded: {}", degraded));
        }
        result.record_scores(evaluation.scores);

        result.advance();
        Ok(())
    }

    /// Object detection is CPU-bound; keep it off the async workers.
    ///
    /// A blocking task outlives a dropped future, so the scan gets a flag
    /// that is raised when this future completes or is dropped on timeout.
    async fn scan_blocking(
        &self,
        stage: PipelineStage,
        video_path: PathBuf,
    ) -> StageResult<PresenceSummary> {
        let scanner = Arc::clone(&self.stages.scanner);
        let cancel = Arc::new(AtomicBool::new(false));
        let _cancel_on_drop = scopeguard::guard(Arc::clone(&cancel), |flag| {
            flag.store(true, Ordering::Relaxed);
        });

        match tokio::task::spawn_blocking(move || scanner.scan(&video_path, &cancel)).await {
            Ok(Ok(summary)) => Ok(summary),
            Ok(Err(e)) => Err(StageError::media(stage, e)),
            Err(join_err) => Err(StageError::TaskPanicked {
                stage,
                message: join_err.to_string(),
            }),
        }
    }
}

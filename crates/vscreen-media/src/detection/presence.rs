//! Prohibited-object presence scanning.
//!
//! The general-purpose detector has no "ID card" class, so a small
//! allow-list of proxy classes stands in for it. Sampled frames are folded
//! into a [`PresenceAccumulator`]: a running maximum of the target-class
//! confidence plus a one-way latch that trips on the first detection at or
//! above the presence threshold.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};
use vscreen_models::PresenceSummary;

use super::classifier::{ClassScore, FrameClassifier};
use super::object_detector::class_name;
use crate::error::{MediaError, MediaResult};
use crate::frames::{sample_frames, Frame, SamplerConfig};

/// COCO proxy classes: cell phone, book, tie.
pub const DEFAULT_TARGET_CLASSES: &[usize] = &[67, 73, 27];

/// Configuration for presence scanning.
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceConfig {
    /// Evaluate every Nth frame
    pub sample_stride: u64,
    /// A single detection at or above this confidence latches presence
    pub confidence_threshold: f32,
    /// Class IDs treated as prohibited items
    pub target_classes: Vec<usize>,
    /// Square size frames are decoded at
    pub decode_size: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            sample_stride: 10,
            confidence_threshold: 0.3,
            target_classes: DEFAULT_TARGET_CLASSES.to_vec(),
            decode_size: 640,
        }
    }
}

impl PresenceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sample_stride: std::env::var("VSCREEN_FRAME_SAMPLE_STRIDE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &u64| n > 0)
                .unwrap_or(defaults.sample_stride),
            confidence_threshold: std::env::var("VSCREEN_PRESENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            target_classes: std::env::var("VSCREEN_TARGET_CLASSES")
                .ok()
                .map(|s| parse_class_list(&s))
                .filter(|classes| !classes.is_empty())
                .unwrap_or(defaults.target_classes),
            decode_size: defaults.decode_size,
        }
    }

    fn sampler(&self) -> SamplerConfig {
        SamplerConfig {
            stride: self.sample_stride.max(1),
            width: self.decode_size,
            height: self.decode_size,
        }
    }
}

fn parse_class_list(raw: &str) -> Vec<usize> {
    raw.split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect()
}

/// Fold over sampled frames: max confidence plus a presence latch.
#[derive(Debug, Clone)]
pub struct PresenceAccumulator {
    threshold: f32,
    targets: Vec<usize>,
    present: bool,
    max_confidence: f32,
    frames_sampled: u64,
    first_hit_frame: Option<u64>,
}

impl PresenceAccumulator {
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            threshold: config.confidence_threshold,
            targets: config.target_classes.clone(),
            present: false,
            max_confidence: 0.0,
            frames_sampled: 0,
            first_hit_frame: None,
        }
    }

    /// Fold the classifier output of one sampled frame.
    pub fn observe(&mut self, frame_index: u64, scores: &[ClassScore]) {
        self.frames_sampled += 1;

        for score in scores.iter().filter(|s| self.targets.contains(&s.class_id)) {
            debug!(
                frame = frame_index,
                class = class_name(score.class_id),
                class_id = score.class_id,
                confidence = score.confidence,
                "Target class candidate"
            );

            self.max_confidence = self.max_confidence.max(score.confidence);
            if score.confidence >= self.threshold && !self.present {
                self.present = true;
                self.first_hit_frame = Some(frame_index);
            }
        }
    }

    pub fn finish(self) -> PresenceSummary {
        PresenceSummary {
            present: self.present,
            confidence: f64::from(self.max_confidence.clamp(0.0, 1.0)),
            frames_sampled: self.frames_sampled,
            first_hit_frame: self.first_hit_frame,
        }
    }
}

/// Scans a video for prohibited objects.
#[derive(Clone)]
pub struct PresenceDetector {
    classifier: Arc<dyn FrameClassifier>,
    config: PresenceConfig,
}

impl PresenceDetector {
    pub fn new(classifier: Arc<dyn FrameClassifier>, config: PresenceConfig) -> Self {
        Self { classifier, config }
    }

    /// Decode `path`, classify every sampled frame and aggregate the result.
    ///
    /// Blocking: runs FFmpeg and model inference on the calling thread.
    /// Fails with `DecodeFailed` if the video cannot be opened, and with
    /// `Cancelled` (stopping the decoder) once `cancel` is set.
    pub fn scan(&self, path: impl AsRef<Path>, cancel: &AtomicBool) -> MediaResult<PresenceSummary> {
        let path = path.as_ref();
        let frames = sample_frames(path, self.config.sampler())?;
        let summary = self.fold(frames, cancel)?;

        info!(
            path = %path.display(),
            classifier = self.classifier.name(),
            present = summary.present,
            confidence = summary.confidence,
            frames_sampled = summary.frames_sampled,
            "Presence scan completed"
        );
        Ok(summary)
    }

    /// Fold an already-decoded frame sequence, checking `cancel` before each frame.
    pub fn fold<I>(&self, frames: I, cancel: &AtomicBool) -> MediaResult<PresenceSummary>
    where
        I: IntoIterator<Item = MediaResult<Frame>>,
    {
        let mut acc = PresenceAccumulator::new(&self.config);
        for frame in frames {
            if cancel.load(Ordering::Relaxed) {
                debug!(frames = acc.frames_sampled, "Presence scan cancelled");
                return Err(MediaError::Cancelled);
            }
            let frame = frame?;
            let scores = self.classifier.classify(&frame)?;
            acc.observe(frame.index, &scores);
        }
        Ok(acc.finish())
    }
}

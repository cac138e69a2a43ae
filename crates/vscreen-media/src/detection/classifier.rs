//! Pluggable per-frame classifier contract.

use crate::error::MediaResult;
use crate::frames::Frame;

/// A class observed in a frame with its confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    /// Model class index (COCO for the bundled YOLOv8 model)
    pub class_id: usize,
    /// Confidence in [0, 1]
    pub confidence: f32,
}

impl ClassScore {
    pub fn new(class_id: usize, confidence: f32) -> Self {
        Self {
            class_id,
            confidence,
        }
    }
}

/// Anything that can score the objects visible in a frame.
///
/// The presence detector only relies on this contract, so the bundled
/// general-purpose YOLOv8 model can be swapped for a dedicated ID-card
/// model (or a scripted classifier in tests) without touching the
/// sampling and aggregation logic.
pub trait FrameClassifier: Send + Sync {
    /// Score the objects visible in `frame`.
    fn classify(&self, frame: &Frame) -> MediaResult<Vec<ClassScore>>;

    /// Classifier name for logging.
    fn name(&self) -> &'static str;
}

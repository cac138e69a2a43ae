//! Object presence output.

use serde::{Deserialize, Serialize};

/// Aggregated outcome of scanning a video for prohibited objects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PresenceSummary {
    /// Whether any target-class detection met the presence threshold
    pub present: bool,
    /// Maximum target-class confidence across sampled frames (0.0 if none)
    pub confidence: f64,
    /// Number of frames the classifier was run on
    #[serde(default)]
    pub frames_sampled: u64,
    /// Index of the sampled frame that first tripped the latch (1-based frame counter)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_hit_frame: Option<u64>,
}

impl PresenceSummary {
    /// Summary for a video with no qualifying detections.
    pub fn absent(frames_sampled: u64) -> Self {
        Self {
            present: false,
            confidence: 0.0,
            frames_sampled,
            first_hit_frame: None,
        }
    }
}

//! Content evaluation scores.

use serde::{Deserialize, Serialize};

/// Highest score on the rubric scale.
pub const MAX_SCORE: u8 = 10;

/// Communication and content scores on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentScores {
    /// Communication quality: clarity, fluency, professional tone
    #[serde(default)]
    pub audio_score: u8,
    /// Content relevancy: depth, relevance, completeness
    #[serde(default)]
    pub final_score: u8,
}

impl ContentScores {
    pub fn new(audio_score: u8, final_score: u8) -> Self {
        Self {
            audio_score,
            final_score,
        }
    }

    /// Scores used whenever evaluation degrades.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Clamp both scores to at most `ceiling` (and the rubric maximum).
    pub fn capped(self, ceiling: u8) -> Self {
        let ceiling = ceiling.min(MAX_SCORE);
        Self {
            audio_score: self.audio_score.min(ceiling),
            final_score: self.final_score.min(ceiling),
        }
    }
}

//! Per-submission verdict produced by the analysis pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::presence::PresenceSummary;
use crate::scores::ContentScores;
use crate::stage::PipelineStage;

/// Unique identifier for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Verdict for one submitted video.
///
/// The record only moves forward: flags never reset once set, the
/// confidence only grows, and once `error` is set every further update is
/// ignored so the record reflects exactly how far the run progressed.
///
/// Serializes to the public response shape:
///
/// ```json
/// {
///   "video_valid": true,
///   "id_card_present": false,
///   "id_card_confidence": 0.0,
///   "audio_score": 0,
///   "final_score": 0,
///   "transcript": "",
///   "error": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    video_valid: bool,
    id_card_present: bool,
    id_card_confidence: f64,
    audio_score: u8,
    final_score: u8,
    #[serde(default)]
    transcript: String,
    error: Option<String>,
    #[serde(skip)]
    stage: PipelineStage,
}

impl PipelineResult {
    /// Fresh record for a new run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn video_valid(&self) -> bool {
        self.video_valid
    }

    pub fn id_card_present(&self) -> bool {
        self.id_card_present
    }

    pub fn id_card_confidence(&self) -> f64 {
        self.id_card_confidence
    }

    pub fn audio_score(&self) -> u8 {
        self.audio_score
    }

    pub fn final_score(&self) -> u8 {
        self.final_score
    }

    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Stage the run reached (the failing stage when `error` is set).
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Move to the next stage. Ignored once failed or done.
    pub fn advance(&mut self) -> PipelineStage {
        if !self.is_failed() {
            if let Some(next) = self.stage.next() {
                self.stage = next;
            }
        }
        self.stage
    }

    /// Validation succeeded.
    pub fn mark_valid(&mut self) {
        if self.is_failed() {
            return;
        }
        self.video_valid = true;
    }

    /// Fold a presence summary into the record (OR on the flag, max on the confidence).
    pub fn record_presence(&mut self, summary: &PresenceSummary) {
        if self.is_failed() {
            return;
        }
        self.id_card_present |= summary.present;
        if summary.confidence > self.id_card_confidence {
            self.id_card_confidence = summary.confidence.clamp(0.0, 1.0);
        }
    }

    pub fn record_transcript(&mut self, transcript: impl Into<String>) {
        if self.is_failed() {
            return;
        }
        self.transcript = transcript.into();
    }

    pub fn record_scores(&mut self, scores: ContentScores) {
        if self.is_failed() {
            return;
        }
        self.audio_score = self.audio_score.max(scores.audio_score);
        self.final_score = self.final_score.max(scores.final_score);
    }

    /// Record the first stage failure. Later failures are ignored.
    pub fn fail(&mut self, message: impl Into<String>) {
        if self.error.is_none() && self.stage.can_fail() {
            self.error = Some(message.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn presence(present: bool, confidence: f64) -> PresenceSummary {
        PresenceSummary {
            present,
            confidence,
            frames_sampled: 1,
            first_hit_frame: None,
        }
    }

    #[test]
    fn test_default_record() {
        let result = PipelineResult::new();
        assert!(!result.video_valid());
        assert!(!result.id_card_present());
        assert_eq!(result.id_card_confidence(), 0.0);
        assert_eq!(result.transcript(), "");
        assert!(result.error().is_none());
        assert_eq!(result.stage(), PipelineStage::Init);
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(PipelineResult::new()).unwrap();
        let object = value.as_object().unwrap();
        let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "audio_score",
                "error",
                "final_score",
                "id_card_confidence",
                "id_card_present",
                "transcript",
                "video_valid"
            ]
        );
        assert!(object["error"].is_null());
    }

    #[test]
    fn test_presence_is_monotonic() {
        let mut result = PipelineResult::new();
        result.record_presence(&presence(true, 0.8));
        result.record_presence(&presence(false, 0.1));
        assert!(result.id_card_present());
        assert!((result.id_card_confidence() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_error_wins_and_freezes_record() {
        let mut result = PipelineResult::new();
        result.advance();
        result.mark_valid();
        result.advance();
        result.fail("decode failed");
        result.fail("second failure");
        result.record_presence(&presence(true, 0.9));
        result.record_scores(ContentScores::new(5, 5));
        result.record_transcript("late");
        assert_eq!(result.advance(), PipelineStage::DetectingObject);

        assert_eq!(result.error(), Some("decode failed"));
        assert!(result.video_valid());
        assert!(!result.id_card_present());
        assert_eq!(result.audio_score(), 0);
        assert_eq!(result.transcript(), "");
    }

    #[test]
    fn test_done_cannot_fail() {
        let mut result = PipelineResult::new();
        while !result.stage().is_terminal() {
            result.advance();
        }
        result.fail("too late");
        assert!(result.error().is_none());
    }
}

//! Stages of the video analysis state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stage of a single analysis run.
///
/// Runs move strictly forward `Init -> Validating -> DetectingObject ->
/// ExtractingAudio -> Transcribing -> Evaluating -> Done`. Failure is not a
/// stage of its own: a run that fails keeps the stage it failed in and
/// carries the failure in `PipelineResult::error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Init,
    Validating,
    DetectingObject,
    ExtractingAudio,
    Transcribing,
    Evaluating,
    Done,
}

impl PipelineStage {
    /// All stages in execution order.
    pub const ALL: &'static [PipelineStage] = &[
        PipelineStage::Init,
        PipelineStage::Validating,
        PipelineStage::DetectingObject,
        PipelineStage::ExtractingAudio,
        PipelineStage::Transcribing,
        PipelineStage::Evaluating,
        PipelineStage::Done,
    ];

    /// The stage that follows this one. `Done` is terminal.
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::Init => Some(PipelineStage::Validating),
            PipelineStage::Validating => Some(PipelineStage::DetectingObject),
            PipelineStage::DetectingObject => Some(PipelineStage::ExtractingAudio),
            PipelineStage::ExtractingAudio => Some(PipelineStage::Transcribing),
            PipelineStage::Transcribing => Some(PipelineStage::Evaluating),
            PipelineStage::Evaluating => Some(PipelineStage::Done),
            PipelineStage::Done => None,
        }
    }

    /// Whether a run in this stage may still fail.
    pub fn can_fail(self) -> bool {
        !matches!(self, PipelineStage::Done)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Init => "init",
            PipelineStage::Validating => "validating",
            PipelineStage::DetectingObject => "detecting_object",
            PipelineStage::ExtractingAudio => "extracting_audio",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::Evaluating => "evaluating",
            PipelineStage::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_advance_in_order() {
        let mut stage = PipelineStage::Init;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            assert!(next > stage);
            visited.push(next);
            stage = next;
        }
        assert_eq!(visited, PipelineStage::ALL);
        assert!(stage.is_terminal());
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::DetectingObject).unwrap();
        assert_eq!(json, "\"detecting_object\"");
        assert_eq!(PipelineStage::ExtractingAudio.to_string(), "extracting_audio");
    }
}

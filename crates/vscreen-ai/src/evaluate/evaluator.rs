//! Transcript scoring against the interview rubric.

use std::fmt;

use tracing::{info, warn};
use vscreen_models::ContentScores;

use super::chat::ChatClient;
use super::parse::parse_scores;
use super::prompt::{build_rubric, BOTTOM_BAND_MAX, SYSTEM_PROMPT};
use crate::error::AiError;

/// Why evaluation fell back to zero scores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationDegraded {
    /// No API key configured
    NotConfigured,
    /// The LLM service could not be reached or rejected the request
    Transport(String),
    /// The reply was not a usable JSON verdict
    Parse(String),
}

impl EvaluationDegraded {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Transport(_) => "transport",
            Self::Parse(_) => "parse",
        }
    }
}

impl fmt::Display for EvaluationDegraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "evaluation service not configured"),
            Self::Transport(msg) => write!(f, "evaluation request failed: {}", msg),
            Self::Parse(msg) => write!(f, "evaluation reply unusable: {}", msg),
        }
    }
}

impl From<AiError> for EvaluationDegraded {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured(_) => Self::NotConfigured,
            AiError::Parse(msg) => Self::Parse(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

/// Evaluator outcome. Scores are zero whenever `degraded` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub scores: ContentScores,
    pub degraded: Option<EvaluationDegraded>,
}

impl Evaluation {
    fn degraded(reason: EvaluationDegraded) -> Self {
        Self {
            scores: ContentScores::zero(),
            degraded: Some(reason),
        }
    }
}

/// Scores transcripts with a hosted LLM.
#[derive(Clone)]
pub struct ContentEvaluator {
    chat: Option<ChatClient>,
    min_words: usize,
}

impl ContentEvaluator {
    pub fn new(chat: Option<ChatClient>, min_words: usize) -> Self {
        Self { chat, min_words }
    }

    /// Score `transcript`. Never fails: every failure degrades to zero scores.
    pub async fn evaluate(&self, transcript: &str) -> Evaluation {
        let Some(chat) = &self.chat else {
            warn!("No API key configured, skipping content evaluation");
            return Evaluation::degraded(EvaluationDegraded::NotConfigured);
        };

        let words = word_count(transcript);
        let rubric = build_rubric(transcript, self.min_words);

        let scores = match chat
            .complete(SYSTEM_PROMPT, &rubric)
            .await
            .and_then(|reply| parse_scores(&reply))
        {
            Ok(scores) => scores,
            Err(e) => {
                let reason = EvaluationDegraded::from(e);
                warn!(kind = reason.kind(), reason = %reason, "Content evaluation degraded");
                return Evaluation::degraded(reason);
            }
        };

        let scores = apply_word_floor(scores, words, self.min_words);
        info!(
            model = chat.model(),
            words,
            audio_score = scores.audio_score,
            final_score = scores.final_score,
            "Content evaluated"
        );

        Evaluation {
            scores,
            degraded: None,
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Short answers land in the bottom band whatever the model said.
pub fn apply_word_floor(scores: ContentScores, words: usize, min_words: usize) -> ContentScores {
    if words < min_words {
        scores.capped(BOTTOM_BAND_MAX)
    } else {
        scores
    }
}

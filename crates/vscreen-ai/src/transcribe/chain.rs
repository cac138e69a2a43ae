//! Ordered transcription fallback chain.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::Transcriber;

/// Why a strategy did not produce text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    /// Strategy had no credentials configured
    pub unavailable: bool,
    pub reason: String,
}

/// Every strategy failed; the placeholder transcript was used.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranscriptionDegraded {
    pub failures: Vec<StrategyFailure>,
}

impl fmt::Display for TranscriptionDegraded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no transcription strategy configured");
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|s| format!("{}: {}", s.strategy, s.reason))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Outcome of the chain. Text is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub text: String,
    /// Strategy that produced the text, `None` for the placeholder
    pub source: Option<&'static str>,
    pub degraded: Option<TranscriptionDegraded>,
}

impl Transcript {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Tries each strategy in order; first non-empty text wins.
#[derive(Clone)]
pub struct TranscriptionChain {
    strategies: Vec<Arc<dyn Transcriber>>,
    placeholder: String,
}

impl TranscriptionChain {
    pub fn new(strategies: Vec<Arc<dyn Transcriber>>, placeholder: impl Into<String>) -> Self {
        Self {
            strategies,
            placeholder: placeholder.into(),
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Transcribe `audio_path`. Never fails.
    pub async fn transcribe(&self, audio_path: &Path) -> Transcript {
        let mut failures = Vec::new();

        for strategy in &self.strategies {
            match strategy.transcribe(audio_path).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        strategy = strategy.name(),
                        words = text.split_whitespace().count(),
                        "Transcription succeeded"
                    );
                    return Transcript {
                        text: text.trim().to_string(),
                        source: Some(strategy.name()),
                        degraded: None,
                    };
                }
                Ok(_) => {
                    warn!(strategy = strategy.name(), "Transcription returned no text");
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        unavailable: false,
                        reason: "empty transcript".to_string(),
                    });
                }
                Err(e) => {
                    if e.is_not_configured() {
                        info!(strategy = strategy.name(), "Transcription strategy unavailable");
                    } else {
                        warn!(strategy = strategy.name(), error = %e, "Transcription failed");
                    }
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        unavailable: e.is_not_configured(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let degraded = TranscriptionDegraded { failures };
        warn!(reason = %degraded, "All transcription strategies failed, using placeholder");

        Transcript {
            text: self.placeholder.clone(),
            source: None,
            degraded: Some(degraded),
        }
    }
}

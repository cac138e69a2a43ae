//! Speech transcription.
//!
//! Strategies are tried in order by [`TranscriptionChain`]; the first one
//! returning non-empty text wins. When all of them fail the chain returns
//! the configured placeholder and reports [`TranscriptionDegraded`].

mod chain;
mod google;
mod whisper;

use std::path::Path;

use async_trait::async_trait;

use crate::error::AiResult;

pub use chain::{StrategyFailure, Transcript, TranscriptionChain, TranscriptionDegraded};
pub use google::GoogleSpeechTranscriber;
pub use whisper::WhisperTranscriber;

/// A single speech-to-text strategy.
///
/// Implementations return `AiError::NotConfigured` when they have no
/// credentials, so the chain can tell "unavailable" from "failed".
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<String>;

    fn name(&self) -> &'static str;
}

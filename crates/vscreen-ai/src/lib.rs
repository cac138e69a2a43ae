//! Hosted speech and LLM clients for interview screening.
//!
//! - [`TranscriptionChain`]: Whisper, then Google Speech-to-Text, then a
//!   fixed placeholder
//! - [`ContentEvaluator`]: rubric-based scoring through an
//!   OpenAI-compatible chat API
//!
//! Both degrade instead of failing; the degradation reason is returned
//! alongside the value.

pub mod config;
pub mod error;
pub mod evaluate;
pub mod transcribe;

use std::sync::Arc;

use reqwest::Client;
use tracing::warn;

pub use config::{AiConfig, Provider, PLACEHOLDER_TRANSCRIPT};
pub use error::{AiError, AiResult};
pub use evaluate::{ChatClient, ContentEvaluator, Evaluation, EvaluationDegraded};
pub use transcribe::{
    GoogleSpeechTranscriber, Transcriber, Transcript, TranscriptionChain, TranscriptionDegraded,
    WhisperTranscriber,
};

/// Shared HTTP client with the configured timeout.
pub fn build_http_client(config: &AiConfig) -> AiResult<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| AiError::request(format!("Failed to build HTTP client: {}", e)))
}

/// Default chain: Whisper, then Google Speech, then the placeholder.
pub fn default_transcription_chain(
    client: Client,
    config: &AiConfig,
    sample_rate: u32,
) -> TranscriptionChain {
    let whisper: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(client.clone(), config));
    let google: Arc<dyn Transcriber> =
        Arc::new(GoogleSpeechTranscriber::new(client, config, sample_rate));

    TranscriptionChain::new(vec![whisper, google], config.placeholder_transcript.clone())
}

/// Evaluator for `config`; unconfigured when no API key is set.
pub fn content_evaluator(client: Client, config: &AiConfig) -> ContentEvaluator {
    if !config.is_configured() {
        warn!("No LLM API key set, transcripts will receive zero scores");
    }
    ContentEvaluator::new(ChatClient::from_config(client, config), config.min_words)
}

//! Google Cloud Speech-to-Text transcription (fallback path).

use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Transcriber;
use crate::config::AiConfig;
use crate::error::{AiError, AiResult};

#[derive(Debug, Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    encoding: &'static str,
    sample_rate_hertz: u32,
    language_code: String,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Synchronous `speech:recognize` call with base64 LINEAR16 audio.
pub struct GoogleSpeechTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language_code: String,
    sample_rate: u32,
    timeout_secs: u64,
}

impl GoogleSpeechTranscriber {
    pub fn new(client: Client, config: &AiConfig, sample_rate: u32) -> Self {
        Self {
            client,
            base_url: config.google_speech_base_url.trim_end_matches('/').to_string(),
            api_key: config.google_speech_api_key.clone(),
            language_code: config.language_code.clone(),
            sample_rate,
            timeout_secs: config.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl Transcriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<String> {
        let Some(api_key) = &self.api_key else {
            return Err(AiError::not_configured("GOOGLE_SPEECH_API_KEY not set"));
        };

        let bytes = tokio::fs::read(audio_path).await?;
        let request = RecognizeRequest {
            config: RecognitionConfig {
                encoding: "LINEAR16",
                sample_rate_hertz: self.sample_rate,
                language_code: self.language_code.clone(),
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(&bytes),
            },
        };

        debug!(bytes = bytes.len(), "Requesting Google Speech transcription");

        let response = self
            .client
            .post(format!("{}/v1/speech:recognize", self.base_url))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::from_reqwest(e, self.timeout_secs))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(format!("Failed to parse Speech response: {}", e)))?;

        Ok(join_best_alternatives(&parsed))
    }

    fn name(&self) -> &'static str {
        "google_speech"
    }
}

/// Each result covers a consecutive chunk of audio; keep its top alternative.
fn join_best_alternatives(response: &RecognizeResponse) -> String {
    response
        .results
        .iter()
        .filter_map(|r| r.alternatives.first())
        .map(|a| a.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

//! OpenAI Whisper transcription.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::Transcriber;
use crate::config::AiConfig;
use crate::error::{AiError, AiResult};

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// `POST {base_url}/audio/transcriptions` with the WAV as multipart upload.
pub struct WhisperTranscriber {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: u64,
}

impl WhisperTranscriber {
    pub fn new(client: Client, config: &AiConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.transcription_model.clone(),
            timeout_secs: config.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> AiResult<String> {
        let (Some(api_key), Some(model)) = (&self.api_key, &self.model) else {
            return Err(AiError::not_configured("Whisper transcription disabled"));
        };

        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let file = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| AiError::request(e.to_string()))?;
        let form = Form::new()
            .text("model", model.clone())
            .text("response_format", "json")
            .part("file", file);

        let url = format!("{}/audio/transcriptions", self.base_url);
        debug!(url = %url, model = %model, "Requesting Whisper transcription");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AiError::from_reqwest(e, self.timeout_secs))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status { status, body });
        }

        let parsed: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| AiError::parse(format!("Failed to parse Whisper response: {}", e)))?;

        Ok(parsed.text)
    }

    fn name(&self) -> &'static str {
        "whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, key: Option<&str>) -> AiConfig {
        AiConfig {
            base_url: server.uri(),
            ..AiConfig::for_key(key.map(String::from))
        }
    }

    fn wav() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        std::fs::write(file.path(), b"RIFF....WAVE").unwrap();
        file
    }

    #[tokio::test]
    async fn test_transcribes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hello there"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let whisper = WhisperTranscriber::new(Client::new(), &config(&server, Some("sk-test")));
        let audio = wav();
        assert_eq!(whisper.transcribe(audio.path()).await.unwrap(), "hello there");
    }

    #[tokio::test]
    async fn test_http_error_is_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let whisper = WhisperTranscriber::new(Client::new(), &config(&server, Some("sk-test")));
        let audio = wav();
        match whisper.transcribe(audio.path()).await.unwrap_err() {
            AiError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_openrouter_key_is_unavailable() {
        let server = MockServer::start().await;
        let whisper = WhisperTranscriber::new(Client::new(), &config(&server, Some("sk-or-v1-x")));
        let audio = wav();

        assert!(whisper.transcribe(audio.path()).await.unwrap_err().is_not_configured());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}

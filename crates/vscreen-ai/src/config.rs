//! AI service configuration.

use std::time::Duration;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const GOOGLE_SPEECH_BASE_URL: &str = "https://speech.googleapis.com";

/// Transcript used when every transcription strategy fails.
pub const PLACEHOLDER_TRANSCRIPT: &str =
    "I am very interested in this position because I have the required skills.";

/// LLM provider, inferred from the API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    /// OpenAI-compatible chat, no audio endpoint
    OpenRouter,
}

impl Provider {
    /// OpenRouter keys carry the `sk-or-v1` prefix.
    pub fn for_key(api_key: &str) -> Self {
        if api_key.starts_with("sk-or-v1") {
            Self::OpenRouter
        } else {
            Self::OpenAi
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => OPENAI_BASE_URL,
            Self::OpenRouter => OPENROUTER_BASE_URL,
        }
    }

    pub fn default_llm_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::OpenRouter => "x-ai/grok-4.1-fast",
        }
    }

    pub fn default_transcription_model(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("whisper-1"),
            Self::OpenRouter => None,
        }
    }
}

/// Configuration for transcription and evaluation clients.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// OpenAI or OpenRouter API key
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Chat model used for evaluation
    pub llm_model: String,
    /// Whisper model; `None` disables the primary transcription path
    pub transcription_model: Option<String>,
    /// Google Speech-to-Text API key (fallback transcription)
    pub google_speech_api_key: Option<String>,
    pub google_speech_base_url: String,
    /// Language sent to Google Speech-to-Text
    pub language_code: String,
    /// Bounded timeout for every network call
    pub timeout: Duration,
    /// Transcripts shorter than this are forced into the bottom score band
    pub min_words: usize,
    pub placeholder_transcript: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::for_key(None)
    }
}

impl AiConfig {
    /// Defaults for the provider implied by `api_key`.
    pub fn for_key(api_key: Option<String>) -> Self {
        let provider = Provider::for_key(api_key.as_deref().unwrap_or_default());
        Self {
            api_key,
            base_url: provider.default_base_url().to_string(),
            llm_model: provider.default_llm_model().to_string(),
            transcription_model: provider.default_transcription_model().map(String::from),
            google_speech_api_key: None,
            google_speech_base_url: GOOGLE_SPEECH_BASE_URL.to_string(),
            language_code: "en-US".to_string(),
            timeout: Duration::from_secs(60),
            min_words: 20,
            placeholder_transcript: PLACEHOLDER_TRANSCRIPT.to_string(),
        }
    }

    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let api_key = non_empty_var("OPENAI_API_KEY");
        let defaults = Self::for_key(api_key);
        let openrouter = defaults.provider() == Provider::OpenRouter;

        Self {
            base_url: non_empty_var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            llm_model: non_empty_var("VSCREEN_LLM_MODEL").unwrap_or(defaults.llm_model),
            // OpenRouter has no audio endpoint, so an override cannot enable Whisper there
            transcription_model: if openrouter {
                None
            } else {
                non_empty_var("VSCREEN_TRANSCRIPTION_MODEL").or(defaults.transcription_model)
            },
            google_speech_api_key: non_empty_var("GOOGLE_SPEECH_API_KEY"),
            google_speech_base_url: non_empty_var("GOOGLE_SPEECH_BASE_URL")
                .unwrap_or(defaults.google_speech_base_url),
            language_code: non_empty_var("VSCREEN_LANGUAGE_CODE").unwrap_or(defaults.language_code),
            timeout: Duration::from_secs(
                std::env::var("VSCREEN_AI_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            min_words: std::env::var("VSCREEN_MIN_WORDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_words),
            ..defaults
        }
    }

    pub fn provider(&self) -> Provider {
        Provider::for_key(self.api_key.as_deref().unwrap_or_default())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openrouter_key_switches_provider() {
        let config = AiConfig::for_key(Some("sk-or-v1-abc".into()));
        assert_eq!(config.provider(), Provider::OpenRouter);
        assert_eq!(config.base_url, OPENROUTER_BASE_URL);
        assert_eq!(config.llm_model, "x-ai/grok-4.1-fast");
        assert!(config.transcription_model.is_none());
    }

    #[test]
    fn test_openai_defaults() {
        let config = AiConfig::for_key(Some("sk-proj-abc".into()));
        assert_eq!(config.provider(), Provider::OpenAi);
        assert_eq!(config.llm_model, "gpt-4o");
        assert_eq!(config.transcription_model.as_deref(), Some("whisper-1"));
        assert_eq!(config.min_words, 20);
    }

    #[test]
    fn test_no_key_is_unconfigured() {
        let config = AiConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}

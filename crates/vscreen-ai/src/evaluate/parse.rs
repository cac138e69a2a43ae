//! Lenient decoding of the model's JSON verdict.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use vscreen_models::scores::MAX_SCORE;
use vscreen_models::ContentScores;

use crate::error::{AiError, AiResult};

/// Raw verdict. Missing fields default to 0 and unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
struct RawScores {
    #[serde(default, deserialize_with = "lenient_score")]
    audio_score: u8,
    #[serde(default, deserialize_with = "lenient_score")]
    final_score: u8,
}

/// Accept integers, floats and numeric strings, clamped to the rubric scale.
/// Anything else decodes as 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer).map_err(de::Error::custom)?;
    let number = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
        .unwrap_or(0))
}

/// Strip a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse the model's reply into scores clamped to `[0, 10]`.
///
/// The verdict must be a JSON object; arrays and scalars are rejected even
/// though serde would accept an array for a struct.
pub fn parse_scores(text: &str) -> AiResult<ContentScores> {
    let body = strip_code_fences(text);
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| AiError::parse(format!("Failed to parse evaluation JSON: {}", e)))?;

    if !value.is_object() {
        return Err(AiError::parse("Evaluation reply is not a JSON object"));
    }

    let raw: RawScores = serde_json::from_value(value)
        .map_err(|e| AiError::parse(format!("Failed to parse evaluation JSON: {}", e)))?;

    Ok(ContentScores::new(raw.audio_score, raw.final_score))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let scores = parse_scores(r#"{"audio_score": 7, "final_score": 5}"#).unwrap();
        assert_eq!(scores, ContentScores::new(7, 5));
    }

    #[test]
    fn test_fenced_json_with_extra_fields() {
        let text = "```json\n{\"audio_score\": 3, \"final_score\": 2, \"reason\": \"short\"}\n```";
        assert_eq!(parse_scores(text).unwrap(), ContentScores::new(3, 2));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        assert_eq!(parse_scores(r#"{"audio_score": 4}"#).unwrap(), ContentScores::new(4, 0));
        assert_eq!(parse_scores("{}").unwrap(), ContentScores::zero());
    }

    #[test]
    fn test_coerces_and_clamps() {
        let scores = parse_scores(r#"{"audio_score": "6", "final_score": 11.6}"#).unwrap();
        assert_eq!(scores, ContentScores::new(6, 10));

        let scores = parse_scores(r#"{"audio_score": -3, "final_score": null}"#).unwrap();
        assert_eq!(scores, ContentScores::zero());
    }

    #[test]
    fn test_not_json_is_parse_error() {
        assert!(matches!(
            parse_scores("I would rate this a 7."),
            Err(AiError::Parse(_))
        ));
        assert!(matches!(parse_scores(r#""seven""#), Err(AiError::Parse(_))));
    }

    #[test]
    fn test_array_verdict_is_parse_error() {
        assert!(matches!(parse_scores("[9, 9]"), Err(AiError::Parse(_))));
        assert!(matches!(parse_scores("```json
[7]
```"), Err(AiError::Parse(_))));
        assert!(matches!(parse_scores("8"), Err(AiError::Parse(_))));
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }
}

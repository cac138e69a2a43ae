//! Evaluation rubric.

/// System message sent with every evaluation request.
pub const SYSTEM_PROMPT: &str =
    "You are a critical interview evaluator. Output strict JSON only.";

/// Highest score allowed for transcripts under the word floor.
pub const BOTTOM_BAND_MAX: u8 = 2;

/// Build the user message carrying the rubric and the transcript.
pub fn build_rubric(transcript: &str, min_words: usize) -> String {
    format!(
        r#"You are a strict professional Interview Evaluator.
Analyze the following candidate response from a video interview.

Transcript: "{transcript}"

Evaluation Criteria:
1. Communication Quality ('audio_score'): Clarity, fluency, professional tone.
2. Content Relevancy ('final_score'): Depth of answer, relevance to interview context, completeness.

STRICT SCORING RULES:
- If the transcript is under {min_words} words, give a FAILING SCORE (0-{BOTTOM_BAND_MAX}) regardless of content.
- If the answer is just a greeting or introduction (e.g., "Hi my name is..."), score MAX 1.
- If the answer is vague or lacks substance, score below 4.
- A score of 8-10 is reserved ONLY for exceptional, comprehensive, and relevant answers.

Return ONLY a valid JSON object:
{{
    "audio_score": int,
    "final_score": int
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rubric_embeds_transcript_and_floor() {
        let rubric = build_rubric("I built a compiler.", 20);
        assert!(rubric.contains(r#"Transcript: "I built a compiler.""#));
        assert!(rubric.contains("under 20 words"));
        assert!(rubric.contains("FAILING SCORE (0-2)"));
        assert!(rubric.contains(r#""final_score": int"#));
    }
}

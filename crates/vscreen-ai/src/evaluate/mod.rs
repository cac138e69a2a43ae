//! LLM content evaluation.

mod chat;
mod evaluator;
mod parse;
mod prompt;

pub use chat::ChatClient;
pub use evaluator::{apply_word_floor, word_count, ContentEvaluator, Evaluation, EvaluationDegraded};
pub use parse::{parse_scores, strip_code_fences};
pub use prompt::{build_rubric, BOTTOM_BAND_MAX, SYSTEM_PROMPT};

//! Shared data models for the VideoScreen backend.
//!
//! This crate provides Serde-serializable types for:
//! - The per-submission verdict (`PipelineResult`)
//! - Pipeline stages of the analysis state machine
//! - Submission policy (allowed containers, duration ceiling)
//! - Stage outputs shared between crates (object presence, content scores)

pub mod policy;
pub mod presence;
pub mod result;
pub mod scores;
pub mod stage;

// Re-export common types
pub use policy::{PolicyError, VideoPolicy};
pub use presence::PresenceSummary;
pub use result::{PipelineResult, RunId};
pub use scores::ContentScores;
pub use stage::PipelineStage;

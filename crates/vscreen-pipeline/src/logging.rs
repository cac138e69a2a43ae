//! Structured run logging.

use tracing::{error, info, warn, Span};
use vscreen_models::{PipelineStage, RunId};

/// Logger carrying the run ID and operation on every event.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    operation: String,
}

impl RunLogger {
    pub fn new(run_id: &RunId, operation: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            "Run started: {}", message
        );
    }

    /// Log entry into a stage.
    pub fn log_stage(&self, stage: PipelineStage) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = %stage,
            "Run progress: entering {}", stage
        );
    }

    pub fn log_warning(&self, stage: PipelineStage, message: &str) {
        warn!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = %stage,
            "Run warning: {}", message
        );
    }

    pub fn log_error(&self, stage: PipelineStage, message: &str) {
        error!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage = %stage,
            "Run error: {}", message
        );
    }

    pub fn log_completion(&self, stage_reached: PipelineStage, failed: bool, elapsed_secs: f64) {
        info!(
            run_id = %self.run_id,
            operation = %self.operation,
            stage_reached = %stage_reached,
            failed,
            elapsed_secs,
            "Run completed"
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "run",
            run_id = %self.run_id,
            operation = %self.operation
        )
    }
}

//! Pipeline metrics. No-ops unless the binary installs a recorder.

use metrics::{counter, histogram};
use vscreen_models::PipelineStage;

pub mod names {
    pub const RUNS_TOTAL: &str = "vscreen_pipeline_runs_total";
    pub const RUN_DURATION_SECONDS: &str = "vscreen_pipeline_run_duration_seconds";
    pub const STAGE_DURATION_SECONDS: &str = "vscreen_pipeline_stage_duration_seconds";
    pub const STAGE_FAILURES_TOTAL: &str = "vscreen_pipeline_stage_failures_total";
    pub const DEGRADED_TOTAL: &str = "vscreen_pipeline_degraded_total";
    pub const PRESENCE_DETECTED_TOTAL: &str = "vscreen_presence_detected_total";
    pub const CLEANUP_FAILURES_TOTAL: &str = "vscreen_cleanup_failures_total";
}

/// Record the end of a run. `outcome` is `done`, `failed` or `timeout`.
pub fn record_run(outcome: &'static str, duration_secs: f64) {
    counter!(names::RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, "outcome" => outcome).record(duration_secs);
}

pub fn record_stage_duration(stage: PipelineStage, duration_secs: f64) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage.as_str()).record(duration_secs);
}

pub fn record_stage_failure(stage: PipelineStage, kind: &'static str) {
    counter!(
        names::STAGE_FAILURES_TOTAL,
        "stage" => stage.as_str(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_degraded(stage: PipelineStage, reason: &'static str) {
    counter!(
        names::DEGRADED_TOTAL,
        "stage" => stage.as_str(),
        "reason" => reason
    )
    .increment(1);
}

pub fn record_presence_detected() {
    counter!(names::PRESENCE_DETECTED_TOTAL).increment(1);
}

pub fn record_cleanup_failure() {
    counter!(names::CLEANUP_FAILURES_TOTAL).increment(1);
}

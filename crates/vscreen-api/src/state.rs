//! Application state.

use std::sync::Arc;

use vscreen_pipeline::{PipelineConfig, VideoPipeline};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<VideoPipeline>,
}

impl AppState {
    pub fn new(config: ApiConfig, pipeline: VideoPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn pipeline_config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }
}

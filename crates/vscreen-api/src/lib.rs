//! Axum HTTP API for interview video analysis.
//!
//! Accepts a multipart video upload, hands it to the
//! [`VideoPipeline`](vscreen_pipeline::VideoPipeline) and returns the
//! analysis record as JSON. Also serves liveness, readiness and Prometheus
//! endpoints.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

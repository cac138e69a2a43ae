//! Video upload and analysis handler.

use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use scopeguard::ScopeGuard;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;
use vscreen_models::{PipelineResult, VideoPolicy};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the video.
pub const FILE_FIELD: &str = "file";

/// Upload an interview video and analyze it.
///
/// Responds 200 with the pipeline record even when the run failed; only
/// rejected or unsaveable uploads produce an error status.
pub async fn analyze_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<PipelineResult>> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        metrics::record_upload_rejected("malformed");
        multipart_error(e)
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        return analyze_field(&state, field).await.map(Json);
    }

    metrics::record_upload_rejected("missing_file");
    Err(ApiError::bad_request(format!(
        "Missing '{}' field in upload",
        FILE_FIELD
    )))
}

async fn analyze_field(state: &AppState, mut field: Field<'_>) -> ApiResult<PipelineResult> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let policy = &state.pipeline_config().policy;

    // Reject before anything touches the disk
    let ext = match VideoPolicy::extension_of(&filename) {
        Some(ext) if policy.is_allowed(&filename) => ext,
        _ => {
            metrics::record_upload_rejected("extension");
            return Err(ApiError::bad_request(format!(
                "Invalid file type. Allowed: {}",
                policy.allowed_extensions().join(", ")
            )));
        }
    };

    let dest = state
        .pipeline_config()
        .temp_video_dir
        .join(format!("{}{}", Uuid::new_v4(), ext));

    // Deletes the partial file unless the save completes
    let partial = scopeguard::guard(dest, |path: PathBuf| {
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to delete partial upload");
            }
        }
    });

    let bytes = match save_field(&mut field, &partial).await {
        Ok(bytes) => bytes,
        Err(e) => {
            metrics::record_upload_rejected("save_failed");
            warn!(filename = %filename, error = %e, "Upload could not be saved");
            return Err(e);
        }
    };
    let video_path = ScopeGuard::into_inner(partial);

    metrics::record_upload_bytes(bytes);
    info!(
        filename = %filename,
        path = %video_path.display(),
        bytes,
        "Video saved"
    );

    // The pipeline owns the file from here and deletes it
    let result = state.pipeline.run(&video_path).await;

    if let Some(error) = result.error() {
        warn!(filename = %filename, error = %error, "Pipeline reported error");
    }

    Ok(result)
}

/// Stream a multipart field to `dest`, returning the bytes written.
async fn save_field(field: &mut Field<'_>, dest: &Path) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(dest).await?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn multipart_error(err: MultipartError) -> ApiError {
    match err.status() {
        StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
        status if status.is_client_error() => ApiError::bad_request(err.body_text()),
        _ => ApiError::internal(format!("Failed to read upload: {}", err.body_text())),
    }
}

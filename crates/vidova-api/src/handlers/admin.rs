//! Admin maintenance handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use vidova_models::UserRole;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub deleted_records: u64,
    pub deleted_files: usize,
}

/// Delete every video record and stored media file. User accounts
/// survive the reset.
///
/// POST /api/admin/reset
pub async fn reset_library(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ResetResponse>> {
    if user.role != UserRole::Admin {
        return Err(ApiError::forbidden("Admin access required"));
    }

    let deleted_records = state.videos.delete_all().await?;
    let deleted_files = state.media.clear_all().await?;
    warn!(
        "Library reset by admin {}: {} records, {} files removed",
        user.id, deleted_records, deleted_files
    );

    Ok(Json(ResetResponse {
        deleted_records,
        deleted_files,
    }))
}

//! Read-only handlers for generation job records.

use adgen_core::error::CoreError;
use adgen_core::generation::normalize_email;
use adgen_core::types::JobId;
use adgen_db::models::generation_job::{GenerationJob, JobListQuery};
use axum::extract::State;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{AppPath, AppQuery};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs?userEmail=...&limit=...&offset=...
///
/// List a user's generation jobs, newest first.
pub async fn list_jobs(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<JobListQuery>,
) -> AppResult<Json<DataResponse<Vec<GenerationJob>>>> {
    let email = normalize_email(&params.user_email)?;
    let jobs = state
        .store
        .list_jobs(&email, params.limit, params.offset)
        .await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    AppPath(id): AppPath<JobId>,
) -> AppResult<Json<DataResponse<GenerationJob>>> {
    let job = state
        .store
        .find_job(id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "GenerationJob",
            key: id.to_string(),
        }))?;
    Ok(Json(DataResponse { data: job }))
}

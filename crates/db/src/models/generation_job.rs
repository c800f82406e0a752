//! Generation job entity models and DTOs.

use adgen_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::status::{JobStatus, StatusId};

/// Raw row from the `generation_jobs` table.
///
/// Never leaves the repository layer: it is converted to
/// [`GenerationJob`], which rejects unknown status IDs.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationJobRow {
    pub id: JobId,
    pub user_email: String,
    pub status_id: StatusId,
    pub description: String,
    pub size: String,
    pub final_image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub video_prompt: Option<String>,
    pub credits_remaining: Option<i32>,
    pub failure_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

/// A validated generation job record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub id: JobId,
    pub user_email: String,
    pub status: JobStatus,
    pub description: String,
    pub size: String,
    pub final_image_url: Option<String>,
    pub image_prompt: Option<String>,
    pub video_prompt: Option<String>,
    pub credits_remaining: Option<i32>,
    pub failure_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl TryFrom<GenerationJobRow> for GenerationJob {
    type Error = sqlx::Error;

    fn try_from(row: GenerationJobRow) -> Result<Self, Self::Error> {
        let status = JobStatus::from_id(row.status_id).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("generation job {} has unknown status_id {}", row.id, row.status_id).into(),
            )
        })?;

        Ok(Self {
            id: row.id,
            user_email: row.user_email,
            status,
            description: row.description,
            size: row.size,
            final_image_url: row.final_image_url,
            image_prompt: row.image_prompt,
            video_prompt: row.video_prompt,
            credits_remaining: row.credits_remaining,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
            completed_at: row.completed_at,
        })
    }
}

/// DTO for creating a pending job at the start of a generation.
#[derive(Debug, Clone)]
pub struct CreateGenerationJob {
    pub id: JobId,
    pub user_email: String,
    pub description: String,
    pub size: String,
}

/// Outputs attached to a job when it completes.
#[derive(Debug, Clone)]
pub struct CompleteGenerationJob {
    pub final_image_url: String,
    pub image_prompt: String,
    pub video_prompt: String,
}

/// Query parameters for `GET /api/v1/jobs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListQuery {
    /// Owner whose jobs to list.
    pub user_email: String,
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}

//! Repository for the `generation_jobs` table.
//!
//! Every transition out of `pending` is guarded by `status_id = pending`
//! in SQL, so a job is finalized at most once.

use adgen_core::credits;
use adgen_core::types::JobId;
use sqlx::PgPool;

use crate::models::generation_job::{
    CompleteGenerationJob, CreateGenerationJob, GenerationJob, GenerationJobRow,
};
use crate::models::status::JobStatus;

/// Column list for `generation_jobs` queries.
const COLUMNS: &str = "\
    id, user_email, status_id, description, size, \
    final_image_url, image_prompt, video_prompt, \
    credits_remaining, failure_reason, \
    created_at, updated_at, completed_at";

/// Maximum page size for job listing.
pub const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
pub const DEFAULT_LIMIT: i64 = 50;

/// Provides create, finalize, and read operations for generation jobs.
pub struct GenerationJobRepo;

impl GenerationJobRepo {
    /// Insert a new pending job.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGenerationJob,
    ) -> Result<GenerationJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_jobs (id, user_email, status_id, description, size) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, GenerationJobRow>(&query)
            .bind(input.id)
            .bind(&input.user_email)
            .bind(JobStatus::Pending.id())
            .bind(&input.description)
            .bind(&input.size)
            .fetch_one(pool)
            .await?;
        GenerationJob::try_from(row)
    }

    /// Find a job by id.
    pub async fn find_by_id(
        pool: &PgPool,
        id: JobId,
    ) -> Result<Option<GenerationJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_jobs WHERE id = $1");
        sqlx::query_as::<_, GenerationJobRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .map(GenerationJob::try_from)
            .transpose()
    }

    /// List a user's jobs, newest first.
    pub async fn list_by_email(
        pool: &PgPool,
        email: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GenerationJob>, sqlx::Error> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM generation_jobs \
             WHERE user_email = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, GenerationJobRow>(&query)
            .bind(email)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?
            .into_iter()
            .map(GenerationJob::try_from)
            .collect()
    }

    /// Mark a pending job completed and charge its owner.
    ///
    /// Runs in one transaction: the job row is locked, the owner's balance
    /// is decremented by [`credits::GENERATION_COST`], and the resulting
    /// balance is stored on the job as `credits_remaining`. An owner with
    /// no account is charged against a zero balance.
    ///
    /// Returns `None` if the job does not exist or is no longer pending.
    pub async fn complete(
        pool: &PgPool,
        id: JobId,
        input: &CompleteGenerationJob,
    ) -> Result<Option<GenerationJob>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let owner: Option<String> = sqlx::query_scalar(
            "SELECT user_email FROM generation_jobs \
             WHERE id = $1 AND status_id = $2 \
             FOR UPDATE",
        )
        .bind(id)
        .bind(JobStatus::Pending.id())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(owner) = owner else {
            tx.rollback().await?;
            return Ok(None);
        };

        let balance: Option<i32> = sqlx::query_scalar(
            "UPDATE user_accounts SET credits = credits - $2, updated_at = NOW() \
             WHERE email = $1 RETURNING credits",
        )
        .bind(&owner)
        .bind(credits::GENERATION_COST)
        .fetch_optional(&mut *tx)
        .await?;

        let remaining = balance.unwrap_or_else(|| credits::remaining_after_charge(None));

        let query = format!(
            "UPDATE generation_jobs \
             SET status_id = $2, final_image_url = $3, image_prompt = $4, \
                 video_prompt = $5, credits_remaining = $6, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, GenerationJobRow>(&query)
            .bind(id)
            .bind(JobStatus::Completed.id())
            .bind(&input.final_image_url)
            .bind(&input.image_prompt)
            .bind(&input.video_prompt)
            .bind(remaining)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        GenerationJob::try_from(row).map(Some)
    }

    /// Mark a pending job failed with a reason.
    ///
    /// Returns `true` if the job was failed, `false` if it does not exist or
    /// was already terminal.
    pub async fn fail(pool: &PgPool, id: JobId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_jobs \
             SET status_id = $2, failure_reason = $3, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(JobStatus::Failed.id())
        .bind(reason)
        .bind(JobStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Persistence seam for the pipeline.

use adgen_core::types::JobId;
use adgen_db::models::generation_job::{CompleteGenerationJob, CreateGenerationJob, GenerationJob};
use adgen_db::models::user_account::UserAccount;
use adgen_db::repositories::{GenerationJobRepo, UserAccountRepo};
use adgen_db::DbPool;
use async_trait::async_trait;

/// Errors from a [`GenerationStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The job does not exist or has already been finalized.
    #[error("Generation job {0} is not pending")]
    NotPending(JobId),
}

/// Records the pipeline reads and writes: user accounts and generation jobs.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    /// Confirm the backing store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError>;

    /// Return the account for `email`, creating it with zero credits if
    /// absent. The boolean is `true` when a new account was created.
    async fn find_or_create_user(
        &self,
        email: &str,
        name: &str,
    ) -> Result<(UserAccount, bool), StoreError>;

    /// Insert a new pending job.
    async fn create_job(&self, input: &CreateGenerationJob) -> Result<GenerationJob, StoreError>;

    /// Complete a pending job and charge its owner in one atomic step.
    ///
    /// Fails with [`StoreError::NotPending`] if the job is missing or
    /// already terminal.
    async fn complete_job(
        &self,
        id: JobId,
        input: &CompleteGenerationJob,
    ) -> Result<GenerationJob, StoreError>;

    /// Mark a pending job failed. Returns `false` if it was not pending.
    async fn fail_job(&self, id: JobId, reason: &str) -> Result<bool, StoreError>;

    async fn find_job(&self, id: JobId) -> Result<Option<GenerationJob>, StoreError>;

    /// List a user's jobs, newest first.
    async fn list_jobs(
        &self,
        email: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GenerationJob>, StoreError>;
}

/// [`GenerationStore`] backed by PostgreSQL.
#[derive(Clone)]
pub struct PgGenerationStore {
    pool: DbPool,
}

impl PgGenerationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenerationStore for PgGenerationStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(adgen_db::health_check(&self.pool).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        Ok(UserAccountRepo::find_by_email(&self.pool, email).await?)
    }

    async fn find_or_create_user(
        &self,
        email: &str,
        name: &str,
    ) -> Result<(UserAccount, bool), StoreError> {
        Ok(UserAccountRepo::find_or_create(&self.pool, email, name).await?)
    }

    async fn create_job(&self, input: &CreateGenerationJob) -> Result<GenerationJob, StoreError> {
        Ok(GenerationJobRepo::create(&self.pool, input).await?)
    }

    async fn complete_job(
        &self,
        id: JobId,
        input: &CompleteGenerationJob,
    ) -> Result<GenerationJob, StoreError> {
        GenerationJobRepo::complete(&self.pool, id, input)
            .await?
            .ok_or(StoreError::NotPending(id))
    }

    async fn fail_job(&self, id: JobId, reason: &str) -> Result<bool, StoreError> {
        Ok(GenerationJobRepo::fail(&self.pool, id, reason).await?)
    }

    async fn find_job(&self, id: JobId) -> Result<Option<GenerationJob>, StoreError> {
        Ok(GenerationJobRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_jobs(
        &self,
        email: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GenerationJob>, StoreError> {
        Ok(GenerationJobRepo::list_by_email(&self.pool, email, limit, offset).await?)
    }
}

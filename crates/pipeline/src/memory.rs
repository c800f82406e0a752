//! In-process [`GenerationStore`] used by tests and by the server when no
//! database is configured. Nothing survives a restart.

use std::collections::HashMap;

use adgen_core::credits;
use adgen_core::types::{DbId, JobId};
use adgen_db::models::generation_job::{CompleteGenerationJob, CreateGenerationJob, GenerationJob};
use adgen_db::models::status::JobStatus;
use adgen_db::models::user_account::UserAccount;
use adgen_db::repositories::generation_job_repo::{DEFAULT_LIMIT, MAX_LIMIT};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::store::{GenerationStore, StoreError};

#[derive(Default)]
struct Inner {
    users: Vec<UserAccount>,
    jobs: HashMap<JobId, GenerationJob>,
    next_user_id: DbId,
}

impl Inner {
    fn user_mut(&mut self, email: &str) -> Option<&mut UserAccount> {
        self.users.iter_mut().find(|u| u.email == email)
    }
}

/// Mutex-guarded maps with the same semantics as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or overwrite the balance of) an account.
    pub async fn insert_user(&self, email: &str, name: &str, credits: i32) -> UserAccount {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.user_mut(email) {
            user.credits = credits;
            user.updated_at = Utc::now();
            return user.clone();
        }
        inner.next_user_id += 1;
        let now = Utc::now();
        let user = UserAccount {
            id: inner.next_user_id,
            email: email.to_string(),
            name: name.to_string(),
            credits,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(user.clone());
        user
    }

    /// Number of stored jobs, across all users.
    pub async fn job_count(&self) -> usize {
        self.inner.lock().await.jobs.len()
    }
}

#[async_trait]
impl GenerationStore for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_or_create_user(
        &self,
        email: &str,
        name: &str,
    ) -> Result<(UserAccount, bool), StoreError> {
        if let Some(existing) = self.find_user_by_email(email).await? {
            return Ok((existing, false));
        }
        Ok((self.insert_user(email, name, 0).await, true))
    }

    async fn create_job(&self, input: &CreateGenerationJob) -> Result<GenerationJob, StoreError> {
        let now = Utc::now();
        let job = GenerationJob {
            id: input.id,
            user_email: input.user_email.clone(),
            status: JobStatus::Pending,
            description: input.description.clone(),
            size: input.size.clone(),
            final_image_url: None,
            image_prompt: None,
            video_prompt: None,
            credits_remaining: None,
            failure_reason: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.inner.lock().await.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn complete_job(
        &self,
        id: JobId,
        input: &CompleteGenerationJob,
    ) -> Result<GenerationJob, StoreError> {
        let mut inner = self.inner.lock().await;

        let owner = match inner.jobs.get(&id) {
            Some(job) if !job.status.is_terminal() => job.user_email.clone(),
            _ => return Err(StoreError::NotPending(id)),
        };

        let remaining = match inner.user_mut(&owner) {
            Some(user) => {
                user.credits = credits::remaining_after_charge(Some(user.credits));
                user.updated_at = Utc::now();
                user.credits
            }
            None => credits::remaining_after_charge(None),
        };

        let now = Utc::now();
        let job = inner
            .jobs
            .get_mut(&id)
            .ok_or(StoreError::NotPending(id))?;
        job.status = JobStatus::Completed;
        job.final_image_url = Some(input.final_image_url.clone());
        job.image_prompt = Some(input.image_prompt.clone());
        job.video_prompt = Some(input.video_prompt.clone());
        job.credits_remaining = Some(remaining);
        job.completed_at = Some(now);
        job.updated_at = now;
        Ok(job.clone())
    }

    async fn fail_job(&self, id: JobId, reason: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.jobs.get_mut(&id) {
            Some(job) if !job.status.is_terminal() => {
                let now = Utc::now();
                job.status = JobStatus::Failed;
                job.failure_reason = Some(reason.to_string());
                job.completed_at = Some(now);
                job.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_job(&self, id: JobId) -> Result<Option<GenerationJob>, StoreError> {
        Ok(self.inner.lock().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(
        &self,
        email: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GenerationJob>, StoreError> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as usize;
        let offset = offset.unwrap_or(0).max(0) as usize;

        let inner = self.inner.lock().await;
        let mut jobs: Vec<GenerationJob> = inner
            .jobs
            .values()
            .filter(|j| j.user_email == email)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(jobs.into_iter().skip(offset).take(limit).collect())
    }
}

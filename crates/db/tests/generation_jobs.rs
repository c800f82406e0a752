//! Integration tests for the user account and generation job repositories.
//!
//! Run against a real PostgreSQL instance:
//! `DATABASE_URL=postgres://... cargo test -p adgen-db -- --ignored`

use adgen_core::types::new_job_id;
use adgen_db::models::generation_job::{CompleteGenerationJob, CreateGenerationJob};
use adgen_db::models::status::JobStatus;
use adgen_db::repositories::{GenerationJobRepo, UserAccountRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_job(email: &str) -> CreateGenerationJob {
    CreateGenerationJob {
        id: new_job_id(),
        user_email: email.to_string(),
        description: "red sneaker on concrete".to_string(),
        size: "1024x1024".to_string(),
    }
}

fn outputs(url: &str) -> CompleteGenerationJob {
    CompleteGenerationJob {
        final_image_url: url.to_string(),
        image_prompt: "studio shot".to_string(),
        video_prompt: "slow pan".to_string(),
    }
}

async fn seed_account(pool: &PgPool, email: &str, credits: i32) {
    UserAccountRepo::find_or_create(pool, email, "Tester")
        .await
        .unwrap();
    sqlx::query("UPDATE user_accounts SET credits = $2 WHERE email = $1")
        .bind(email)
        .bind(credits)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// User accounts
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn find_or_create_is_idempotent(pool: PgPool) {
    let (first, created) = UserAccountRepo::find_or_create(&pool, "a@x.com", "Ann")
        .await
        .unwrap();
    assert!(created);
    assert_eq!(first.credits, 0);

    let (second, created) = UserAccountRepo::find_or_create(&pool, "a@x.com", "Other")
        .await
        .unwrap();
    assert!(!created);
    assert_eq!(second.id, first.id);
    assert_eq!(second.name, "Ann");
}

// ---------------------------------------------------------------------------
// Generation jobs
// ---------------------------------------------------------------------------

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn create_starts_pending(pool: PgPool) {
    let job = GenerationJobRepo::create(&pool, &new_job("a@x.com"))
        .await
        .unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.final_image_url.is_none());
    assert!(job.completed_at.is_none());
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn complete_charges_owner_once(pool: PgPool) {
    seed_account(&pool, "a@x.com", 10).await;
    let job = GenerationJobRepo::create(&pool, &new_job("a@x.com"))
        .await
        .unwrap();

    let done = GenerationJobRepo::complete(&pool, job.id, &outputs("https://cdn/x.png"))
        .await
        .unwrap()
        .expect("pending job completes");
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.credits_remaining, Some(5));
    assert_eq!(done.final_image_url.as_deref(), Some("https://cdn/x.png"));

    // A second completion is refused and does not charge again.
    let again = GenerationJobRepo::complete(&pool, job.id, &outputs("https://cdn/y.png"))
        .await
        .unwrap();
    assert!(again.is_none());

    let account = UserAccountRepo::find_by_email(&pool, "a@x.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.credits, 5);
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn fail_is_terminal(pool: PgPool) {
    seed_account(&pool, "a@x.com", 10).await;
    let job = GenerationJobRepo::create(&pool, &new_job("a@x.com"))
        .await
        .unwrap();

    assert!(GenerationJobRepo::fail(&pool, job.id, "Clipdrop error: quota")
        .await
        .unwrap());
    assert!(!GenerationJobRepo::fail(&pool, job.id, "again").await.unwrap());
    assert!(GenerationJobRepo::complete(&pool, job.id, &outputs("u"))
        .await
        .unwrap()
        .is_none());

    let stored = GenerationJobRepo::find_by_id(&pool, job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Failed);
    assert_eq!(stored.failure_reason.as_deref(), Some("Clipdrop error: quota"));
}

#[sqlx::test]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn list_is_scoped_to_owner(pool: PgPool) {
    GenerationJobRepo::create(&pool, &new_job("a@x.com")).await.unwrap();
    GenerationJobRepo::create(&pool, &new_job("a@x.com")).await.unwrap();
    GenerationJobRepo::create(&pool, &new_job("b@x.com")).await.unwrap();

    let jobs = GenerationJobRepo::list_by_email(&pool, "a@x.com", None, None)
        .await
        .unwrap();
    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.user_email == "a@x.com"));
}

/// Surrogate primary keys for user accounts are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Generation job ids are time-ordered UUIDv7 values.
pub type JobId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Allocate a fresh, time-ordered job identifier.
pub fn new_job_id() -> JobId {
    uuid::Uuid::now_v7()
}

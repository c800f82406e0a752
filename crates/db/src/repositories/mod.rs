pub mod generation_job_repo;
pub mod user_account_repo;

pub use generation_job_repo::GenerationJobRepo;
pub use user_account_repo::UserAccountRepo;

pub mod generation_job;
pub mod status;
pub mod user_account;

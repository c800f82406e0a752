//! User account entity model and DTOs.

use adgen_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: DbId,
    pub email: String,
    pub name: String,
    pub credits: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/user`: find the account for `user_email`, or
/// create it with zero credits.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserAccount {
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

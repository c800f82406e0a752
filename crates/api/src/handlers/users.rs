//! Handler for the user account upsert called after sign-in.

use adgen_core::generation::normalize_email;
use adgen_db::models::user_account::{UpsertUserAccount, UserAccount};
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::state::AppState;

/// POST /api/v1/user
///
/// Returns the account for `userEmail`, creating it with zero credits on
/// first sign-in. An existing account is returned unchanged.
pub async fn upsert_user(
    State(state): State<AppState>,
    AppJson(input): AppJson<UpsertUserAccount>,
) -> AppResult<Json<UserAccount>> {
    let email = normalize_email(&input.user_email)?;
    let name = input.user_name.as_deref().map(str::trim).unwrap_or_default();

    let (account, created) = state.store.find_or_create_user(&email, name).await?;
    if created {
        tracing::info!(user_id = account.id, email = %account.email, "User account created");
    }

    Ok(Json(account))
}

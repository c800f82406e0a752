//! Repository for the `user_accounts` table.

use sqlx::PgPool;

use crate::models::user_account::UserAccount;

/// Column list for `user_accounts` queries.
const COLUMNS: &str = "id, email, name, credits, created_at, updated_at";

/// Provides lookup and upsert operations for user accounts.
pub struct UserAccountRepo;

impl UserAccountRepo {
    /// Find the account for an exact email match.
    ///
    /// Emails are unique, but the lowest id wins should a duplicate ever
    /// slip in.
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<UserAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_accounts WHERE email = $1 ORDER BY id LIMIT 1"
        );
        sqlx::query_as::<_, UserAccount>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Return the account for `email`, creating it with zero credits if
    /// none exists. The boolean is `true` when a new row was inserted.
    ///
    /// An existing account's name is left untouched.
    pub async fn find_or_create(
        pool: &PgPool,
        email: &str,
        name: &str,
    ) -> Result<(UserAccount, bool), sqlx::Error> {
        let insert = format!(
            "INSERT INTO user_accounts (email, name, credits) VALUES ($1, $2, 0) \
             ON CONFLICT (email) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, UserAccount>(&insert)
            .bind(email)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        if let Some(account) = created {
            return Ok((account, true));
        }

        let existing = Self::find_by_email(pool, email)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        Ok((existing, false))
    }
}

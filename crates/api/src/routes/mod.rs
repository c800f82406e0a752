pub mod generation;
pub mod health;
pub mod jobs;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /generate-product-image                          multipart submission (POST)
///
/// /user                                            find-or-create account (POST)
///
/// /jobs?userEmail=                                 list a user's jobs (GET)
/// /jobs/{id}                                       get one job (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Generation pipeline entrypoint.
        .merge(generation::router())
        // Account upsert called by the frontend after sign-in.
        .merge(users::router())
        // Job records (result gallery).
        .nest("/jobs", jobs::router())
}

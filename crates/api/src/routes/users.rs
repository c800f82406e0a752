use axum::routing::post;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// POST   /user   -> upsert_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/user", post(users::upsert_user))
}

//! Route definitions for generation submissions.

use axum::routing::post;
use axum::Router;

use crate::handlers::generation;
use crate::state::AppState;

/// ```text
/// POST   /generate-product-image   -> generate_product_image
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/generate-product-image",
        post(generation::generate_product_image),
    )
}

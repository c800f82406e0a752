//! Handler for product image generation submissions.

use adgen_pipeline::{GenerationOutcome, GenerationRequest};
use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/generate-product-image
///
/// Accepts a multipart form with a required `file` field (the product
/// photo), a required `userEmail` field, and optional `description` and
/// `size` fields. Runs the full generation pipeline before answering.
///
/// The pipeline runs on its own task, so a request timeout or a client
/// disconnect cannot stop it between creating the job and finalizing it.
pub async fn generate_product_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<GenerationOutcome>> {
    let mut file: Option<Vec<u8>> = None;
    let mut description: Option<String> = None;
    let mut size: Option<String> = None;
    let mut user_email: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => file = Some(field.bytes().await?.to_vec()),
            "description" => description = Some(field.text().await?),
            "size" => size = Some(field.text().await?),
            "userEmail" => user_email = Some(field.text().await?),
            _ => {} // ignore unknown fields
        }
    }

    let image = file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    let user_email = user_email
        .ok_or_else(|| AppError::BadRequest("Missing required 'userEmail' field".into()))?;

    let limit = state.config.max_upload_bytes;
    if image.len() > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "Uploaded file is {} bytes; the limit is {limit} bytes",
            image.len()
        )));
    }

    let request = GenerationRequest {
        image,
        description,
        size,
        user_email,
    };
    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::spawn(async move { orchestrator.run(request).await })
        .await
        .map_err(|e| AppError::InternalError(format!("Generation task aborted: {e}")))??;

    Ok(Json(outcome))
}

//! End-to-end execution of one generation submission.
//!
//! Steps, strictly in order:
//!
//! 1. resolve the submitter's account by email
//! 2. create a pending job record
//! 3. ask the refinement service for an image prompt and a video prompt
//! 4. parse and validate the refinement answer
//! 5. synthesize the image from the image prompt
//! 6. upload the image to the asset host
//! 7. complete the job and charge the account
//!
//! Input is validated before step 1, so a rejected submission leaves no
//! trace. Any failure from step 3 onwards marks the job failed before the
//! error is returned.

use std::sync::Arc;

use adgen_core::error::CoreError;
use adgen_core::generation::{
    asset_file_name, normalize_description, normalize_email, normalize_size,
};
use adgen_core::image_inspect::inspect_image;
use adgen_core::prompt::{build_instruction, parse_refined_prompts};
use adgen_core::types::{new_job_id, JobId};
use adgen_db::models::generation_job::{CompleteGenerationJob, CreateGenerationJob};
use adgen_providers::{AssetHost, ImageSynthesizer, PromptRefiner, ProviderError};
use serde::Serialize;

use crate::store::{GenerationStore, StoreError};

/// One submission as received from the upload form.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Raw bytes of the product photo.
    pub image: Vec<u8>,
    /// Free-text product description; defaulted when absent or blank.
    pub description: Option<String>,
    /// Requested output size; defaulted when absent or blank.
    pub size: Option<String>,
    /// Email of the submitting user.
    pub user_email: String,
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub job_id: JobId,
    pub image_prompt: String,
    pub video_prompt: String,
    pub generated_image_url: String,
    pub credits_remaining: i32,
}

/// Why a generation did not complete.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Rejected input, unknown user, or an unusable refinement answer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An external service failed or answered unexpectedly.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Reading or writing records failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Runs generation submissions against injected collaborators.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    store: Arc<dyn GenerationStore>,
    refiner: Arc<dyn PromptRefiner>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    assets: Arc<dyn AssetHost>,
}

/// Normalized inputs shared by the post-creation steps.
struct PreparedJob<'a> {
    id: JobId,
    image: &'a [u8],
    mime_type: &'static str,
    description: String,
    size: String,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<dyn GenerationStore>,
        refiner: Arc<dyn PromptRefiner>,
        synthesizer: Arc<dyn ImageSynthesizer>,
        assets: Arc<dyn AssetHost>,
    ) -> Self {
        Self {
            store,
            refiner,
            synthesizer,
            assets,
        }
    }

    /// Run one submission to completion.
    pub async fn run(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        let user_email = normalize_email(&request.user_email)?;
        let description = normalize_description(request.description.as_deref());
        let size = normalize_size(request.size.as_deref());
        let image_info = inspect_image(&request.image)?;

        let account = self
            .store
            .find_user_by_email(&user_email)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "UserAccount",
                key: user_email.clone(),
            })?;

        let job = self
            .store
            .create_job(&CreateGenerationJob {
                id: new_job_id(),
                user_email: user_email.clone(),
                description: description.clone(),
                size: size.clone(),
            })
            .await?;

        tracing::info!(
            job_id = %job.id,
            user_email = %user_email,
            credits = account.credits,
            width = image_info.width,
            height = image_info.height,
            "Generation job created"
        );

        let prepared = PreparedJob {
            id: job.id,
            image: &request.image,
            mime_type: image_info.mime_type(),
            description,
            size,
        };

        match self.generate(&prepared).await {
            Ok(outcome) => {
                tracing::info!(
                    job_id = %outcome.job_id,
                    credits_remaining = outcome.credits_remaining,
                    "Generation job completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                self.mark_failed(job.id, &err).await;
                Err(err)
            }
        }
    }

    /// Steps 3 to 7.
    async fn generate(&self, job: &PreparedJob<'_>) -> Result<GenerationOutcome, GenerationError> {
        let instruction = build_instruction(&job.description);
        let answer = self
            .refiner
            .refine(job.image, job.mime_type, &instruction)
            .await?;
        let prompts = parse_refined_prompts(&answer)?;
        tracing::debug!(job_id = %job.id, "Prompts refined");

        let image = self
            .synthesizer
            .synthesize(&prompts.image_prompt, &job.size)
            .await?;
        tracing::debug!(job_id = %job.id, image_bytes = image.len(), "Image synthesized");

        let file_name = asset_file_name(chrono::Utc::now().timestamp_millis());
        let asset = self.assets.upload(image, &file_name).await?;

        let completed = self
            .store
            .complete_job(
                job.id,
                &CompleteGenerationJob {
                    final_image_url: asset.url.clone(),
                    image_prompt: prompts.image_prompt.clone(),
                    video_prompt: prompts.video_prompt.clone(),
                },
            )
            .await?;

        Ok(GenerationOutcome {
            job_id: completed.id,
            image_prompt: prompts.image_prompt,
            video_prompt: prompts.video_prompt,
            generated_image_url: asset.url,
            credits_remaining: completed.credits_remaining.unwrap_or_default(),
        })
    }

    /// Record the failure on the job. Errors here are logged, never returned:
    /// the caller must see the original failure.
    async fn mark_failed(&self, job_id: JobId, err: &GenerationError) {
        let reason = err.to_string();
        tracing::warn!(job_id = %job_id, error = %reason, "Generation job failed");

        match self.store.fail_job(job_id, &reason).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(job_id = %job_id, "Generation job was already finalized");
            }
            Err(store_err) => {
                tracing::error!(
                    job_id = %job_id,
                    error = %store_err,
                    "Failed to record generation failure"
                );
            }
        }
    }
}

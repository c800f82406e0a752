//! Image synthesis through the Clipdrop text-to-image API.

use async_trait::async_trait;
use reqwest::multipart::Form;

use crate::config::ProviderConfig;
use crate::error::{ensure_success, ProviderError};
use crate::ImageSynthesizer;

const SERVICE: &str = "Clipdrop";

/// [`ImageSynthesizer`] backed by Clipdrop.
///
/// Clipdrop's text-to-image endpoint always renders 1024x1024, so the
/// requested size is only logged.
pub struct ClipdropSynthesizer {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl ClipdropSynthesizer {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            url: config.clipdrop_url.clone(),
            api_key: config.clipdrop_key.clone(),
        }
    }
}

#[async_trait]
impl ImageSynthesizer for ClipdropSynthesizer {
    async fn synthesize(&self, prompt: &str, size: &str) -> Result<Vec<u8>, ProviderError> {
        tracing::debug!(size, prompt_len = prompt.len(), "Requesting image synthesis");

        let form = Form::new().text("prompt", prompt.to_string());

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(ProviderError::request(SERVICE))?;

        let response = ensure_success(SERVICE, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(ProviderError::request(SERVICE))?;

        if bytes.is_empty() {
            return Err(ProviderError::Malformed {
                service: SERVICE,
                message: "empty image body".into(),
            });
        }

        Ok(bytes.to_vec())
    }
}

//! HTTP clients for the external AI and asset-hosting services.
//!
//! Each service sits behind a small trait so the generation pipeline can be
//! driven by any implementation:
//!
//! | Trait                | Production client         |
//! |----------------------|---------------------------|
//! | [`PromptRefiner`]    | [`gemini::GeminiRefiner`] |
//! | [`ImageSynthesizer`] | [`clipdrop::ClipdropSynthesizer`] |
//! | [`AssetHost`]        | [`imagekit::ImageKitHost`] |

pub mod clipdrop;
pub mod config;
pub mod error;
pub mod gemini;
pub mod imagekit;

use async_trait::async_trait;

pub use config::{ConfigError, ProviderConfig};
pub use error::ProviderError;

/// Turns a product photo plus instructions into prompt text.
#[async_trait]
pub trait PromptRefiner: Send + Sync {
    /// Send `image` (declared as `mime_type`) together with `instruction`
    /// and return the model's raw text answer.
    async fn refine(
        &self,
        image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, ProviderError>;
}

/// Turns a text prompt into image bytes.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Generate an image for `prompt`. `size` is the submitter's requested
    /// output size, forwarded as-is.
    async fn synthesize(&self, prompt: &str, size: &str) -> Result<Vec<u8>, ProviderError>;
}

/// A file stored by an [`AssetHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedAsset {
    /// Public URL of the stored file.
    pub url: String,
    /// Host-side identifier, when the host reports one.
    pub file_id: Option<String>,
}

/// Stores bytes and hands back a durable public URL.
#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<HostedAsset, ProviderError>;
}

/// Build the shared HTTP client used by every provider.
pub fn build_http_client(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|source| ProviderError::Request {
            service: "HTTP client",
            source,
        })
}

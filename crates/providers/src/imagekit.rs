//! Asset hosting through the ImageKit upload API.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::error::{ensure_success, read_json, ProviderError};
use crate::{AssetHost, HostedAsset};

const SERVICE: &str = "ImageKit";

/// [`AssetHost`] backed by ImageKit.
pub struct ImageKitHost {
    client: reqwest::Client,
    upload_url: String,
    private_key: String,
}

/// Subset of the upload response we rely on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponse {
    url: Option<String>,
    file_id: Option<String>,
}

impl ImageKitHost {
    pub fn new(client: reqwest::Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            upload_url: config.imagekit_upload_url.clone(),
            private_key: config.imagekit_private_key.clone(),
        }
    }
}

#[async_trait]
impl AssetHost for ImageKitHost {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<HostedAsset, ProviderError> {
        let size = bytes.len();
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("image/png")
            .map_err(ProviderError::request(SERVICE))?;

        let form = Form::new()
            .part("file", part)
            .text("fileName", file_name.to_string());

        // ImageKit authenticates server-side uploads with the private key
        // as the basic-auth user and an empty password.
        let response = self
            .client
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(ProviderError::request(SERVICE))?;

        let response = ensure_success(SERVICE, response).await?;
        let parsed: UploadResponse = read_json(SERVICE, response).await?;

        let asset = into_hosted_asset(parsed)?;
        tracing::debug!(file_name, size, url = %asset.url, "Uploaded asset");
        Ok(asset)
    }
}

pub(crate) fn into_hosted_asset(response: UploadResponse) -> Result<HostedAsset, ProviderError> {
    match response.url {
        Some(url) if !url.is_empty() => Ok(HostedAsset {
            url,
            file_id: response.file_id,
        }),
        _ => Err(ProviderError::Malformed {
            service: SERVICE,
            message: "upload response has no url".into(),
        }),
    }
}

use std::time::Duration;

/// Missing or unusable provider configuration. Fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    #[error("Environment variable {name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Credentials and endpoints for the external services.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Gemini API key (`GEMINI_KEY`).
    pub gemini_key: String,
    /// Gemini model used for prompt refinement.
    pub gemini_model: String,
    /// Gemini REST base URL.
    pub gemini_base_url: String,
    /// Clipdrop API key (`CLIPDROPAPI_KEY`).
    pub clipdrop_key: String,
    /// Clipdrop text-to-image endpoint.
    pub clipdrop_url: String,
    /// ImageKit private key (`IMAGEKIT_PRIVATE_KEY`).
    pub imagekit_private_key: String,
    /// ImageKit upload endpoint.
    pub imagekit_upload_url: String,
    /// Per-request timeout applied to every outbound call.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Load provider configuration from the process environment.
    ///
    /// | Env Var                 | Default                                               |
    /// |-------------------------|-------------------------------------------------------|
    /// | `GEMINI_KEY`            | required                                              |
    /// | `CLIPDROPAPI_KEY`       | required                                              |
    /// | `IMAGEKIT_PRIVATE_KEY`  | required                                              |
    /// | `GEMINI_MODEL`          | `gemini-2.5-flash`                                    |
    /// | `GEMINI_BASE_URL`       | `https://generativelanguage.googleapis.com`           |
    /// | `CLIPDROP_URL`          | `https://clipdrop-api.co/text-to-image/v1`            |
    /// | `IMAGEKIT_UPLOAD_URL`   | `https://upload.imagekit.io/api/v1/files/upload`      |
    /// | `PROVIDER_TIMEOUT_SECS` | `90`                                                  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let gemini_key = required("GEMINI_KEY")?;
        let clipdrop_key = required("CLIPDROPAPI_KEY")?;
        let imagekit_private_key = required("IMAGEKIT_PRIVATE_KEY")?;

        let timeout_raw = optional("PROVIDER_TIMEOUT_SECS", "90");
        let timeout_secs: u64 = timeout_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "PROVIDER_TIMEOUT_SECS",
            reason: format!("'{timeout_raw}' is not a whole number of seconds"),
        })?;

        Ok(Self {
            gemini_key,
            gemini_model: optional("GEMINI_MODEL", "gemini-2.5-flash"),
            gemini_base_url: optional(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            clipdrop_key,
            clipdrop_url: optional("CLIPDROP_URL", "https://clipdrop-api.co/text-to-image/v1"),
            imagekit_private_key,
            imagekit_upload_url: optional(
                "IMAGEKIT_UPLOAD_URL",
                "https://upload.imagekit.io/api/v1/files/upload",
            ),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

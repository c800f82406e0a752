/// Errors from the external service clients.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{service} error: {message}")]
    Api {
        service: &'static str,
        /// HTTP status code.
        status: u16,
        /// Error text extracted from the response body.
        message: String,
    },

    /// The service answered 2xx but the body was not what we expected.
    #[error("{service} returned an unexpected response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Name of the service that produced the error.
    pub fn service(&self) -> &'static str {
        match self {
            ProviderError::Request { service, .. }
            | ProviderError::Api { service, .. }
            | ProviderError::Malformed { service, .. } => service,
        }
    }

    pub(crate) fn request(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Request { service, source }
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`ProviderError::Api`] carrying the upstream
/// error text on failure.
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = upstream_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    tracing::warn!(
        service,
        status = status.as_u16(),
        %message,
        "Upstream service returned an error"
    );

    Err(ProviderError::Api {
        service,
        status: status.as_u16(),
        message,
    })
}

/// Read a 2xx body and decode it as JSON. A body that cannot be read is a
/// request failure; a body that is not the expected JSON is malformed.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let body = response.text().await.map_err(ProviderError::request(service))?;
    decode_json(service, &body)
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    body: &str,
) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed {
        service,
        message: format!("response body is not the expected JSON: {e}"),
    })
}

/// Pull a human-readable message out of an error body.
///
/// Understands the shapes used by the services we call:
/// `{"error": "..."}`, `{"error": {"message": "..."}}` and
/// `{"message": "..."}`. Falls back to the trimmed body text when it is not
/// JSON. Returns `None` for an empty body.
pub(crate) fn upstream_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return Some(body.to_string());
    };

    let message = match &json["error"] {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    };

    message
        .or_else(|| json["message"].as_str().map(str::to_string))
        .or_else(|| Some(body.to_string()))
}

//! Shared helpers for the API integration tests.
//!
//! Requests go straight into the router through `tower::ServiceExt`; the
//! record store is a [`MemoryStore`] and every external service is a fake,
//! so no database or network is needed.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adgen_api::config::ServerConfig;
use adgen_api::router::build_app_router;
use adgen_api::state::AppState;
use adgen_pipeline::{GenerationOrchestrator, MemoryStore};
use adgen_providers::{AssetHost, HostedAsset, ImageSynthesizer, PromptRefiner, ProviderError};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const BOUNDARY: &str = "adgen-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
    }
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(4, 4);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

// ---------------------------------------------------------------------------
// Fake providers
// ---------------------------------------------------------------------------

/// Answers with prompts derived from the product context.
pub struct EchoRefiner;

#[async_trait]
impl PromptRefiner for EchoRefiner {
    async fn refine(
        &self,
        _image: &[u8],
        _mime_type: &str,
        instruction: &str,
    ) -> Result<String, ProviderError> {
        let context = instruction
            .rsplit("Product Context: ")
            .next()
            .unwrap_or_default();
        Ok(serde_json::json!({
            "imagePrompt": format!("studio photo of {context}"),
            "videoPrompt": format!("slow pan across {context}"),
        })
        .to_string())
    }
}

/// Panics mid-pipeline, after the job record exists.
pub struct PanickingRefiner;

#[async_trait]
impl PromptRefiner for PanickingRefiner {
    async fn refine(
        &self,
        _image: &[u8],
        _mime_type: &str,
        _instruction: &str,
    ) -> Result<String, ProviderError> {
        panic!("refiner blew up");
    }
}

pub struct FakeSynthesizer {
    failure: Option<(u16, String)>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeSynthesizer {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some((status, message.to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    /// Succeeds, but only after `delay`.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            failure: None,
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ImageSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, _prompt: &str, _size: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some((status, message)) => Err(ProviderError::Api {
                service: "Clipdrop",
                status: *status,
                message: message.clone(),
            }),
            None => Ok(png_bytes()),
        }
    }
}

#[derive(Default)]
pub struct FakeAssetHost {
    pub calls: AtomicUsize,
}

#[async_trait]
impl AssetHost for FakeAssetHost {
    async fn upload(&self, _bytes: Vec<u8>, file_name: &str) -> Result<HostedAsset, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(HostedAsset {
            url: format!("https://ik.imagekit.io/demo/{n}-{file_name}"),
            file_id: Some(format!("file-{n}")),
        })
    }
}

// ---------------------------------------------------------------------------
// App wiring
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub assets: Arc<FakeAssetHost>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with(FakeSynthesizer::ok(), test_config())
    }

    pub fn with(synthesizer: Arc<FakeSynthesizer>, config: ServerConfig) -> Self {
        Self::build(Arc::new(EchoRefiner), synthesizer, config)
    }

    pub fn build(
        refiner: Arc<dyn PromptRefiner>,
        synthesizer: Arc<FakeSynthesizer>,
        config: ServerConfig,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let assets = Arc::new(FakeAssetHost::default());
        let orchestrator = GenerationOrchestrator::new(
            store.clone(),
            refiner,
            synthesizer.clone(),
            assets.clone(),
        );
        let state = AppState {
            store: store.clone(),
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config.clone()),
        };
        let router = build_app_router(state, &config);
        Self {
            store,
            synthesizer,
            assets,
            router,
        }
    }

    /// A fresh handle on the router; `oneshot` consumes it.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a [u8]),
}

/// Encode `parts` as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; \
                         filename=\"product.png\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

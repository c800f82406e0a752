//! Scripted collaborators for driving the orchestrator without a network.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adgen_core::types::JobId;
use adgen_db::models::generation_job::{CompleteGenerationJob, CreateGenerationJob, GenerationJob};
use adgen_db::models::user_account::UserAccount;
use adgen_pipeline::{
    GenerationOrchestrator, GenerationRequest, GenerationStore, MemoryStore, StoreError,
};
use adgen_providers::{AssetHost, HostedAsset, ImageSynthesizer, PromptRefiner, ProviderError};
use async_trait::async_trait;

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(4, 4);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn request(email: &str, description: &str) -> GenerationRequest {
    GenerationRequest {
        image: png_bytes(),
        description: Some(description.to_string()),
        size: Some("1024x1024".to_string()),
        user_email: email.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Refiner
// ---------------------------------------------------------------------------

/// How the fake refiner answers.
#[derive(Clone)]
pub enum RefinerScript {
    /// Echo the product context back as prompts.
    Echo,
    /// Return this raw text.
    Raw(String),
    /// Fail with an upstream status and message.
    Fail(u16, String),
}

pub struct FakeRefiner {
    script: RefinerScript,
    pub calls: AtomicUsize,
    pub mime_types: Mutex<Vec<String>>,
}

impl FakeRefiner {
    pub fn new(script: RefinerScript) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            mime_types: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl PromptRefiner for FakeRefiner {
    async fn refine(
        &self,
        _image: &[u8],
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mime_types.lock().unwrap().push(mime_type.to_string());
        match &self.script {
            RefinerScript::Echo => {
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
            RefinerScript::Raw(text) => Ok(text.clone()),
            RefinerScript::Fail(status, message) => Err(ProviderError::Api {
                service: "Gemini",
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

pub struct FakeSynthesizer {
    failure: Option<(u16, String)>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl FakeSynthesizer {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            failure: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(status: u16, message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some((status, message.to_string())),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ImageSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, prompt: &str, size: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), size.to_string()));
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

// ---------------------------------------------------------------------------
// Asset host
// ---------------------------------------------------------------------------

pub struct FakeAssetHost {
    fail: bool,
    pub calls: AtomicUsize,
    pub file_names: Mutex<Vec<String>>,
}

impl FakeAssetHost {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
            file_names: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
            file_names: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AssetHost for FakeAssetHost {
    async fn upload(&self, bytes: Vec<u8>, file_name: &str) -> Result<HostedAsset, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.file_names.lock().unwrap().push(file_name.to_string());
        if self.fail {
            return Err(ProviderError::Api {
                service: "ImageKit",
                status: 403,
                message: "Your account cannot be authenticated.".into(),
            });
        }
        assert!(!bytes.is_empty());
        Ok(HostedAsset {
            url: format!("https://ik.imagekit.io/demo/{n}-{file_name}"),
            file_id: Some(format!("file-{n}")),
        })
    }
}

// ---------------------------------------------------------------------------
// Store with injected faults
// ---------------------------------------------------------------------------

/// Which store writes misbehave.
#[derive(Clone, Copy, Default)]
pub struct StoreFaults {
    /// `fail_job` returns a database error.
    pub fail_job_errors: bool,
    /// `fail_job` reports the job as already finalized.
    pub fail_job_finds_no_pending: bool,
    /// `complete_job` reports the job as no longer pending.
    pub complete_job_not_pending: bool,
}

/// Delegates to a [`MemoryStore`] except where [`StoreFaults`] says otherwise.
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    faults: StoreFaults,
    pub fail_job_calls: AtomicUsize,
}

#[async_trait]
impl GenerationStore for FaultyStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        self.inner.health_check().await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, StoreError> {
        self.inner.find_user_by_email(email).await
    }

    async fn find_or_create_user(
        &self,
        email: &str,
        name: &str,
    ) -> Result<(UserAccount, bool), StoreError> {
        self.inner.find_or_create_user(email, name).await
    }

    async fn create_job(&self, input: &CreateGenerationJob) -> Result<GenerationJob, StoreError> {
        self.inner.create_job(input).await
    }

    async fn complete_job(
        &self,
        id: JobId,
        input: &CompleteGenerationJob,
    ) -> Result<GenerationJob, StoreError> {
        if self.faults.complete_job_not_pending {
            return Err(StoreError::NotPending(id));
        }
        self.inner.complete_job(id, input).await
    }

    async fn fail_job(&self, id: JobId, reason: &str) -> Result<bool, StoreError> {
        self.fail_job_calls.fetch_add(1, Ordering::SeqCst);
        if self.faults.fail_job_errors {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        if self.faults.fail_job_finds_no_pending {
            return Ok(false);
        }
        self.inner.fail_job(id, reason).await
    }

    async fn find_job(&self, id: JobId) -> Result<Option<GenerationJob>, StoreError> {
        self.inner.find_job(id).await
    }

    async fn list_jobs(
        &self,
        email: &str,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<GenerationJob>, StoreError> {
        self.inner.list_jobs(email, limit, offset).await
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub refiner: Arc<FakeRefiner>,
    pub synthesizer: Arc<FakeSynthesizer>,
    pub assets: Arc<FakeAssetHost>,
    pub orchestrator: GenerationOrchestrator,
}

impl Harness {
    pub fn new(
        refiner: Arc<FakeRefiner>,
        synthesizer: Arc<FakeSynthesizer>,
        assets: Arc<FakeAssetHost>,
    ) -> Self {
        let store = Arc::new(MemoryStore::new());
        let orchestrator = GenerationOrchestrator::new(
            store.clone(),
            refiner.clone(),
            synthesizer.clone(),
            assets.clone(),
        );
        Self {
            store,
            refiner,
            synthesizer,
            assets,
            orchestrator,
        }
    }

    /// Like [`Harness::new`], but the orchestrator writes through a
    /// [`FaultyStore`]. `store` still exposes the underlying records.
    pub fn with_faults(
        faults: StoreFaults,
        refiner: Arc<FakeRefiner>,
        synthesizer: Arc<FakeSynthesizer>,
        assets: Arc<FakeAssetHost>,
    ) -> (Self, Arc<FaultyStore>) {
        let store = Arc::new(MemoryStore::new());
        let faulty = Arc::new(FaultyStore {
            inner: store.clone(),
            faults,
            fail_job_calls: AtomicUsize::new(0),
        });
        let orchestrator = GenerationOrchestrator::new(
            faulty.clone(),
            refiner.clone(),
            synthesizer.clone(),
            assets.clone(),
        );
        let harness = Self {
            store,
            refiner,
            synthesizer,
            assets,
            orchestrator,
        };
        (harness, faulty)
    }

    pub fn happy() -> Self {
        Self::new(
            FakeRefiner::new(RefinerScript::Echo),
            FakeSynthesizer::ok(),
            FakeAssetHost::ok(),
        )
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.refiner.calls.load(Ordering::SeqCst),
            self.synthesizer.calls.load(Ordering::SeqCst),
            self.assets.calls.load(Ordering::SeqCst),
        )
    }
}

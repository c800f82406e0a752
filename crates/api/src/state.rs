use std::sync::Arc;

use adgen_pipeline::{GenerationOrchestrator, GenerationStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Record store shared with the orchestrator.
    pub store: Arc<dyn GenerationStore>,
    /// Generation pipeline with its injected provider clients.
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

//! The product image generation pipeline.
//!
//! [`GenerationOrchestrator`] runs one submission end to end against
//! injected collaborators: a [`GenerationStore`] for records and the three
//! provider traits from `adgen_providers`.

pub mod memory;
pub mod orchestrator;
pub mod store;

pub use memory::MemoryStore;
pub use orchestrator::{
    GenerationError, GenerationOrchestrator, GenerationOutcome, GenerationRequest,
};
pub use store::{GenerationStore, PgGenerationStore, StoreError};

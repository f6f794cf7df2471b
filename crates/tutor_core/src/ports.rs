//! crates/tutor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! The generative service sits behind `ContentGenerator`, so the pipeline can
//! run against a real LLM client or a canned fake in tests.

use async_trait::async_trait;
use serde_json::Value;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Sends `prompt` to the generative service, constraining the reply to
    /// `schema`, and returns the raw reply text.
    async fn generate(&self, prompt: &str, schema: &Value) -> PortResult<String>;
}

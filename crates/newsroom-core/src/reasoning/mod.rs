//! Reasoning backend abstraction.
//!
//! The pipeline only needs `invoke(role, prompt) -> text`. Production wires
//! [`openai::OpenAiClient`]; tests inject [`crate::fakes::ScriptedReasoningClient`].

pub mod openai;

use async_trait::async_trait;

use crate::domain::error::UpstreamError;
use crate::stages::roles::RoleDescriptor;

pub use openai::{OpenAiClient, ReasoningConfig};

/// An opaque, possibly slow, possibly failing text generator.
///
/// Implementations must be safe to share between concurrent pipeline runs.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Run one completion for `role` with the task `prompt`.
    async fn invoke(&self, role: &RoleDescriptor, prompt: &str) -> Result<String, UpstreamError>;
}

//! LLM provider trait definition

use crate::{ChatRequest, ChatResponse, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// Implementations provide access to a chat-completion backend. The
/// pipeline treats the returned text as untrusted; providers only
/// guarantee transport, not output shape.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a system-plus-user prompt pair
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Get the provider name (e.g., "openai-compat")
    fn name(&self) -> &str;
}

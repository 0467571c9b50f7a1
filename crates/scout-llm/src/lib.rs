//! LLM provider abstraction for stockscout
//!
//! The query pipeline only needs one capability from a language model:
//! send a system prompt plus a user prompt, get text back. This crate
//! provides:
//!
//! - [`ChatRequest`] / [`ChatResponse`] types for that exchange
//! - The [`LlmProvider`] trait implemented by concrete backends
//! - [`providers::OpenAiCompatProvider`], a chat-completions client that
//!   works against any OpenAI-compatible endpoint (Groq by default)
//!
//! The model's output carries no structural guarantee; callers must treat
//! it as untrusted text and validate before use.

pub mod chat;
pub mod error;
pub mod provider;
pub mod providers;

pub use chat::{ChatRequest, ChatResponse, TokenUsage};
pub use error::{LlmError, Result};
pub use provider::LlmProvider;
pub use providers::{OpenAiCompatConfig, OpenAiCompatProvider};

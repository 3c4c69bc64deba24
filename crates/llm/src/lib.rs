//! Completion-service seam: the router hands over an ordered list of
//! role-tagged messages and gets back raw text.

mod client;
mod config;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use wayfarer_core::ChatMessage;

pub use client::{OpenAiCompatClient, UnconfiguredClient};
pub use config::{
    max_tokens_from_env, max_tokens_from_lookup, CompletionConfig, DEFAULT_BASE_URL,
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL,
};

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion service is not configured (set WAYFARER_LLM_API_KEY)")]
    NotConfigured,
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn model_name(&self) -> &str;
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

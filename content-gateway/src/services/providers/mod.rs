//! Upstream provider abstractions and implementations.
//!
//! The gateway talks to two external collaborators over HTTP: a
//! content-generation endpoint and a search endpoint used for originality
//! checks. Both are reached through trait objects so tests can swap in mocks.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for upstream calls.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("Error {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("failed to parse upstream response: {0}")]
    InvalidResponse(String),
}

/// Generated text together with the raw upstream payload.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub text: String,
    pub raw: serde_json::Value,
}

/// One candidate near-duplicate found on the web.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Instruction prefixed to the original text when the user asks for a
/// rewrite.
pub const REWRITE_INSTRUCTION: &str =
    "Rewrite the following text in your own words while keeping its meaning:";

/// Compose the upstream prompt for a regeneration request.
pub fn rewrite_prompt(original_text: &str) -> String {
    format!("{}\n\n{}", REWRITE_INSTRUCTION, original_text)
}

/// Trait for content-generation backends.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate content for `prompt`. Single attempt, no retries.
    async fn generate(&self, prompt: &str) -> Result<GeneratedContent, ProviderError>;
}

/// Trait for originality-check backends.
#[async_trait]
pub trait OriginalitySearcher: Send + Sync {
    /// Search the web for content close to `query`.
    ///
    /// An empty result is a successful "looks original" answer, not an
    /// error.
    async fn search(&self, query: &str) -> Result<Vec<SearchMatch>, ProviderError>;
}

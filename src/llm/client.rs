//! LLM client abstractions
//!
//! The collaboration core only needs one thing from a provider: turn a list of
//! role-tagged messages into text. [`LLMClient`] is that seam. Providers that can
//! also accept a grouped job implement [`BulkCompletion`].

use crate::types::{AppError, ChatMessage};
use async_trait::async_trait;
use std::time::Duration;

/// Failure taxonomy for a single provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// No credential is configured, so no call was attempted.
    #[error("provider credential is not configured (set {0})")]
    Unavailable(String),

    /// The call did not finish within its timeout.
    #[error("provider call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-2xx status, malformed body or transport failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unavailable(_) => AppError::Configuration(err.to_string()),
            other => AppError::LLM(other.to_string()),
        }
    }
}

/// Generation parameters for one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Generic LLM client trait for provider abstraction
///
/// Implementations must be stateless per call; the gateway may issue many
/// calls concurrently against the same client.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Send the messages and return the generated text.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError>;

    /// Whether a credential is available. Checked before any dispatch.
    fn has_credentials(&self) -> bool;

    /// Human-readable provider name for logs and health output.
    fn provider_name(&self) -> &str;
}

/// One item of a grouped job.
#[derive(Debug, Clone)]
pub struct BulkRequest {
    /// Caller-chosen id used to match results back to requests.
    pub custom_id: String,
    pub messages: Vec<ChatMessage>,
    pub params: CompletionParams,
}

/// Per-item outcome of a grouped job.
pub type BulkItemResult = Result<String, ProviderError>;

/// Bulk-submission capability of a provider.
#[async_trait]
pub trait BulkCompletion: Send + Sync {
    /// Submit all requests as one job and wait for it to finish.
    ///
    /// The outer error is a job-level failure. On success the returned vector
    /// has one entry per request, in request order.
    async fn submit_batch(
        &self,
        batch_name: &str,
        requests: Vec<BulkRequest>,
    ) -> Result<Vec<BulkItemResult>, ProviderError>;
}

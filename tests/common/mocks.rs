//! Mock implementations for testing.
//!
//! Provider doubles shared across the integration test files. Replies are
//! keyed by a needle looked up in the system prompt, so a test can target one
//! persona by its instruction text or the synthesis call by its prompt.

#![allow(dead_code)]

use async_trait::async_trait;
use conclave::llm::{
    BulkCompletion, BulkItemResult, BulkRequest, CompletionParams, LLMClient, ProviderError,
};
use conclave::types::{ChatMessage, MessageRole};
use std::sync::Arc;
use std::sync::Mutex;

/// Text that only appears in the synthesis system prompt.
pub const SYNTHESIS_NEEDLE: &str = "lead AI orchestrator";

/// Mock LLM client with per-needle replies and failures.
pub struct MockLLMClient {
    default_reply: String,
    replies: Vec<(String, String)>,
    failures: Vec<(String, String)>,
    credentials: bool,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLLMClient {
    /// Create a mock client that answers every call with `reply`.
    pub fn new(reply: &str) -> Self {
        Self {
            default_reply: reply.to_string(),
            replies: Vec::new(),
            failures: Vec::new(),
            credentials: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Reply with `text` when the system prompt contains `needle`.
    pub fn replying(mut self, needle: &str, text: &str) -> Self {
        self.replies.push((needle.to_string(), text.to_string()));
        self
    }

    /// Fail with a provider error when the system prompt contains `needle`.
    pub fn failing_on(mut self, needle: &str, message: &str) -> Self {
        self.failures.push((needle.to_string(), message.to_string()));
        self
    }

    /// Behave as if no API key is configured.
    pub fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }
}

fn system_prompt(messages: &[ChatMessage]) -> &str {
    messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        let system = system_prompt(messages);

        if let Some((_, message)) = self.failures.iter().find(|(n, _)| system.contains(n.as_str())) {
            return Err(ProviderError::Provider(message.clone()));
        }
        if let Some((_, text)) = self.replies.iter().find(|(n, _)| system.contains(n.as_str())) {
            return Ok(text.clone());
        }
        Ok(self.default_reply.clone())
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

/// Mock bulk capability that answers every item with `"bulk:{custom_id}"`,
/// or fails the whole job.
pub struct MockBulk {
    fail_job: bool,
    jobs: Mutex<Vec<(String, usize)>>,
}

impl MockBulk {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            fail_job: false,
            jobs: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail_job: true,
            jobs: Mutex::new(Vec::new()),
        })
    }

    /// Submitted jobs as `(batch name, request count)`.
    pub fn jobs(&self) -> Vec<(String, usize)> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl BulkCompletion for MockBulk {
    async fn submit_batch(
        &self,
        batch_name: &str,
        requests: Vec<BulkRequest>,
    ) -> Result<Vec<BulkItemResult>, ProviderError> {
        self.jobs
            .lock()
            .unwrap()
            .push((batch_name.to_string(), requests.len()));

        if self.fail_job {
            return Err(ProviderError::Provider("HTTP 404: batches not supported".to_string()));
        }
        Ok(requests
            .iter()
            .map(|r| Ok(format!("bulk:{}", r.custom_id)))
            .collect())
    }
}

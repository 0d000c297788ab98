//! Scripted LLM client for unit tests.
//!
//! Outcomes are chosen by the first rule whose needle occurs in the system
//! message, so tests can script individual personas by their instruction text.

use crate::llm::client::{CompletionParams, LLMClient, ProviderError};
use crate::types::{ChatMessage, MessageRole};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    Reply(String),
    Fail(String),
    Hang,
}

pub(crate) struct ScriptedClient {
    rules: Vec<(String, Outcome)>,
    default_reply: String,
    credentials: bool,
    delay: Duration,
    calls: Mutex<Vec<(CompletionParams, Vec<ChatMessage>)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedClient {
    pub(crate) fn new(default_reply: &str) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.to_string(),
            credentials: true,
            delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn reply_when(mut self, needle: &str, reply: &str) -> Self {
        self.rules
            .push((needle.to_string(), Outcome::Reply(reply.to_string())));
        self
    }

    pub(crate) fn fail_when(mut self, needle: &str, message: &str) -> Self {
        self.rules
            .push((needle.to_string(), Outcome::Fail(message.to_string())));
        self
    }

    pub(crate) fn hang_when(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Outcome::Hang));
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn without_credentials(mut self) -> Self {
        self.credentials = false;
        self
    }

    /// Recorded message lists, in call order.
    pub(crate) fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    pub(crate) fn models(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(p, _)| p.model.clone()).collect()
    }

    /// System prompt of the first recorded call containing `needle`.
    pub(crate) fn system_prompt_containing(&self, needle: &str) -> Option<String> {
        self.calls()
            .into_iter()
            .filter_map(|messages| system_of(&messages))
            .find(|system| system.contains(needle))
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn outcome_for(&self, messages: &[ChatMessage]) -> Outcome {
        let system = system_of(messages).unwrap_or_default();
        self.rules
            .iter()
            .find(|(needle, _)| system.contains(needle.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Outcome::Reply(self.default_reply.clone()))
    }
}

fn system_of(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.clone())
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        self.calls.lock().push((params.clone(), messages.to_vec()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.outcome_for(messages) {
            Outcome::Reply(text) => Ok(text),
            Outcome::Fail(message) => Err(ProviderError::Provider(message)),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }

    fn has_credentials(&self) -> bool {
        self.credentials
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

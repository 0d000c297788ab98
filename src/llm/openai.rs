//! OpenAI-compatible chat completions client
//!
//! Talks to any endpoint exposing `POST {api_base}/chat/completions` (xAI by
//! default). The grouped-job capability uses the provider's `/batches` API:
//! create a batch, add requests, poll until nothing is pending, then read the
//! results back and match them to requests by id.

use crate::llm::client::{
    BulkCompletion, BulkItemResult, BulkRequest, CompletionParams, LLMClient, ProviderError,
};
use crate::types::ChatMessage;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_LIMIT: usize = 300;

pub struct OpenAIClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    request_timeout: Duration,
    batch_poll_interval: Duration,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct BatchCreated {
    batch_id: String,
}

#[derive(Deserialize, Default)]
struct BatchState {
    #[serde(default)]
    num_pending: u64,
}

#[derive(Deserialize)]
struct BatchStatus {
    #[serde(default)]
    state: BatchState,
}

#[derive(Deserialize)]
struct BatchResults {
    #[serde(default)]
    results: Vec<Value>,
}

impl OpenAIClient {
    pub fn new(api_base: impl Into<String>, api_key: Option<String>) -> Self {
        let request_timeout = Duration::from_secs(300);
        Self {
            http: build_http_client(request_timeout),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            request_timeout,
            batch_poll_interval: Duration::from_secs(2),
        }
    }

    /// Transport-level ceiling for any single HTTP request.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self.http = build_http_client(request_timeout);
        self
    }

    pub fn with_batch_poll_interval(mut self, interval: Duration) -> Self {
        self.batch_poll_interval = interval;
        self
    }

    /// Check whether the provider accepts grouped jobs.
    ///
    /// Lists batches once; any 2xx answer counts as support.
    pub async fn probe_bulk_support(&self) -> bool {
        if self.api_key.is_none() {
            return false;
        }

        let url = format!("{}/batches", self.api_base);
        match self
            .authorized(self.http.get(url))
            .query(&[("limit", "1")])
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::info!(status = %resp.status(), "bulk submission not available");
                false
            }
            Err(e) => {
                tracing::info!(error = %e, "bulk submission probe failed");
                false
            }
        }
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.request_timeout)
        } else {
            ProviderError::Provider(format!("request failed: {}", err))
        }
    }

    /// Send the request and reject non-2xx answers.
    async fn send_checked(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Provider(format!(
                "HTTP {}: {}",
                status.as_u16(),
                truncate(&body, ERROR_BODY_LIMIT)
            )));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ProviderError> {
        self.send_checked(builder)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Provider(format!("malformed response: {}", e)))
    }

    async fn wait_for_batch(&self, batch_id: &str) -> Result<(), ProviderError> {
        let url = format!("{}/batches/{}", self.api_base, batch_id);
        loop {
            let status: BatchStatus = self.send_json(self.http.get(&url)).await?;
            if status.state.num_pending == 0 {
                return Ok(());
            }
            tracing::debug!(batch_id, pending = status.state.num_pending, "batch still running");
            tokio::time::sleep(self.batch_poll_interval).await;
        }
    }
}

fn build_http_client(request_timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn wire_messages(messages: &[ChatMessage]) -> Vec<WireMessage<'_>> {
    messages
        .iter()
        .map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect()
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Pull the completion text out of one batch result entry.
fn batch_item_outcome(entry: &Value) -> BulkItemResult {
    const CONTENT_PATHS: &[&str] = &[
        "/batch_result/response/chat_get_completion/choices/0/message/content",
        "/response/chat_get_completion/choices/0/message/content",
        "/response/choices/0/message/content",
        "/response/body/choices/0/message/content",
    ];

    if let Some(content) = CONTENT_PATHS
        .iter()
        .find_map(|p| entry.pointer(p).and_then(Value::as_str))
    {
        return Ok(content.to_string());
    }

    let error = entry
        .pointer("/batch_result/error")
        .or_else(|| entry.get("error"))
        .map(|e| match e {
            Value::String(s) => s.clone(),
            other => other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        })
        .unwrap_or_else(|| "batch result carried no completion".to_string());

    Err(ProviderError::Provider(error))
}

fn batch_item_id(entry: &Value) -> Option<&str> {
    entry
        .get("batch_request_id")
        .or_else(|| entry.get("custom_id"))
        .and_then(Value::as_str)
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<String, ProviderError> {
        if self.api_key.is_none() {
            return Err(ProviderError::Unavailable("provider api key".to_string()));
        }

        let body = ChatCompletionRequest {
            model: &params.model,
            messages: wire_messages(messages),
            max_tokens: params.max_tokens,
            temperature: params.temperature,
        };

        let url = format!("{}/chat/completions", self.api_base);
        let response: ChatCompletionResponse =
            self.send_json(self.http.post(url).json(&body)).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Provider("no choices in response".to_string()))
    }

    fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}

#[async_trait]
impl BulkCompletion for OpenAIClient {
    async fn submit_batch(
        &self,
        batch_name: &str,
        requests: Vec<BulkRequest>,
    ) -> Result<Vec<BulkItemResult>, ProviderError> {
        if self.api_key.is_none() {
            return Err(ProviderError::Unavailable("provider api key".to_string()));
        }

        let created: BatchCreated = self
            .send_json(
                self.http
                    .post(format!("{}/batches", self.api_base))
                    .json(&json!({ "name": batch_name })),
            )
            .await?;
        let batch_id = created.batch_id;

        let batch_requests: Vec<Value> = requests
            .iter()
            .map(|r| {
                json!({
                    "batch_request_id": r.custom_id,
                    "batch_request": {
                        "chat_get_completion": {
                            "model": r.params.model,
                            "messages": wire_messages(&r.messages),
                            "max_tokens": r.params.max_tokens,
                            "temperature": r.params.temperature,
                        }
                    }
                })
            })
            .collect();

        self.send_checked(
            self.http
                .post(format!("{}/batches/{}/requests", self.api_base, batch_id))
                .json(&json!({ "batch_requests": batch_requests })),
        )
        .await?;

        self.wait_for_batch(&batch_id).await?;

        let results: BatchResults = self
            .send_json(
                self.http
                    .get(format!("{}/batches/{}/results", self.api_base, batch_id))
                    .query(&[("page_size", requests.len().max(1).to_string())]),
            )
            .await?;

        let mut by_id: HashMap<&str, &Value> = HashMap::new();
        for entry in &results.results {
            if let Some(id) = batch_item_id(entry) {
                by_id.insert(id, entry);
            }
        }

        Ok(requests
            .iter()
            .map(|r| match by_id.get(r.custom_id.as_str()) {
                Some(entry) => batch_item_outcome(entry),
                None => Err(ProviderError::Provider(format!(
                    "no batch result returned for {}",
                    r.custom_id
                ))),
            })
            .collect())
    }
}

//! LLM Provider Clients and Abstractions
//!
//! This module hides the completion provider behind a small trait so the
//! collaboration core can be driven by a real HTTP client or a test double.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait: messages in, text out
//! - [`BulkCompletion`] - Optional grouped-job capability
//! - [`CompletionGateway`] - Tier-to-model routing, per-call timeouts, error classification
//! - [`OpenAIClient`] - OpenAI-compatible HTTP implementation (xAI by default)
//!
//! # Example
//!
//! ```ignore
//! use conclave::llm::{CompletionGateway, GatewaySettings, ModelTier, OpenAIClient, Sampling};
//! use std::sync::Arc;
//!
//! let client = Arc::new(OpenAIClient::new("https://api.x.ai/v1", std::env::var("XAI_API_KEY").ok()));
//! let gateway = CompletionGateway::new(client, GatewaySettings::default());
//!
//! let text = gateway
//!     .complete(&messages, ModelTier::Persona, Sampling { max_tokens: 1500, temperature: 0.7 })
//!     .await?;
//! ```

/// Core LLM client trait and the provider error taxonomy.
pub mod client;
/// Timeout and model-tier wrapper used by every collaborator.
pub mod gateway;
/// OpenAI-compatible HTTP client.
pub mod openai;

#[cfg(test)]
pub(crate) mod test_support;

pub use client::{
    BulkCompletion, BulkItemResult, BulkRequest, CompletionParams, LLMClient, ProviderError,
};
pub use gateway::{CompletionGateway, GatewaySettings, ModelTier, Sampling};
pub use openai::OpenAIClient;

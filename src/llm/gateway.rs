//! Completion gateway
//!
//! Thin layer over an [`LLMClient`] that maps a model tier to a model name and
//! wraps every call in its own timeout. A timed-out call is reported as
//! [`ProviderError::Timeout`] and never affects other in-flight calls.

use crate::llm::client::{CompletionParams, LLMClient, ProviderError};
use crate::types::ChatMessage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;

/// Which model a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Fast model used for each persona answer.
    Persona,
    /// Higher-capability model used for the final synthesis.
    Synthesis,
}

/// Token budget and temperature for one tier of calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Model names and timeouts for the gateway.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub persona_model: String,
    pub synthesis_model: String,
    pub persona_timeout: Duration,
    pub synthesis_timeout: Duration,
    /// Environment variable holding the credential, reported when it is missing.
    pub credential_env: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            persona_model: "grok-3-mini".to_string(),
            synthesis_model: "grok-4-1-fast-reasoning".to_string(),
            persona_timeout: Duration::from_secs(120),
            synthesis_timeout: Duration::from_secs(180),
            credential_env: "XAI_API_KEY".to_string(),
        }
    }
}

pub struct CompletionGateway {
    client: Arc<dyn LLMClient>,
    settings: GatewaySettings,
}

impl CompletionGateway {
    pub fn new(client: Arc<dyn LLMClient>, settings: GatewaySettings) -> Self {
        Self { client, settings }
    }

    /// Fail fast when the provider has no credential.
    pub fn ensure_configured(&self) -> Result<(), ProviderError> {
        if self.client.has_credentials() {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(
                self.settings.credential_env.clone(),
            ))
        }
    }

    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Persona => &self.settings.persona_model,
            ModelTier::Synthesis => &self.settings.synthesis_model,
        }
    }

    pub fn timeout_for(&self, tier: ModelTier) -> Duration {
        match tier {
            ModelTier::Persona => self.settings.persona_timeout,
            ModelTier::Synthesis => self.settings.synthesis_timeout,
        }
    }

    pub fn params_for(&self, tier: ModelTier, sampling: Sampling) -> CompletionParams {
        CompletionParams {
            model: self.model_for(tier).to_string(),
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        }
    }

    /// Issue one completion call under the tier's timeout.
    pub async fn complete(
        &self,
        messages: &[ChatMessage],
        tier: ModelTier,
        sampling: Sampling,
    ) -> Result<String, ProviderError> {
        self.ensure_configured()?;

        let params = self.params_for(tier, sampling);
        let limit = self.timeout_for(tier);
        let start = Instant::now();

        let result = match timeout(limit, self.client.complete(messages, &params)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(limit)),
        };

        tracing::debug!(
            model = %params.model,
            tier = ?tier,
            elapsed_ms = start.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "completion call finished"
        );

        result
    }
}

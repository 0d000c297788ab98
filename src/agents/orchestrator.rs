use crate::{
    agents::{
        batch::BatchCollaborator,
        catalog::{Persona, MAX_AGENTS_PER_SESSION},
        selector,
        sequential::{ContextDigest, SequentialCollaborator},
        synthesizer::Synthesizer,
    },
    llm::{BulkCompletion, CompletionGateway, GatewaySettings, LLMClient, Sampling},
    types::{AppError, ChatMessage, CollaborationEvent, CollaborationMode, CollaborationResult, Result},
    utils::toml_config::ConclaveConfig,
};
use async_stream::stream;
use chrono::Utc;
use futures::Stream;
use std::sync::Arc;
use std::time::Duration;

/// Panel size used when the caller does not ask for one.
pub const DEFAULT_AGENT_COUNT: usize = 7;

/// Panels at least this large are dispatched as a batch.
pub const BATCH_THRESHOLD: usize = 5;

/// Clamp a caller-supplied panel size into `1..=25`.
pub fn clamp_agent_count(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_AGENT_COUNT,
        Some(n) => n.clamp(1, MAX_AGENTS_PER_SESSION as i64) as usize,
    }
}

/// Sampling and timeout tuning for a collaboration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollaborationSettings {
    pub persona_sampling: Sampling,
    pub synthesis_sampling: Sampling,
    /// Ceiling for a whole bulk job, submission to results.
    pub batch_job_timeout: Duration,
}

impl Default for CollaborationSettings {
    fn default() -> Self {
        Self {
            persona_sampling: Sampling {
                max_tokens: 1500,
                temperature: 0.7,
            },
            synthesis_sampling: Sampling {
                max_tokens: 4000,
                temperature: 0.5,
            },
            batch_job_timeout: Duration::from_secs(600),
        }
    }
}

impl CollaborationSettings {
    pub fn from_config(config: &ConclaveConfig) -> Self {
        let c = &config.collaboration;
        Self {
            persona_sampling: Sampling {
                max_tokens: c.persona_max_tokens,
                temperature: c.persona_temperature,
            },
            synthesis_sampling: Sampling {
                max_tokens: c.synthesis_max_tokens,
                temperature: c.synthesis_temperature,
            },
            batch_job_timeout: Duration::from_secs(c.batch_timeout_secs),
        }
    }
}

/// Entry point for a collaboration: selects the panel, picks sequential or
/// batch mode, and always synthesizes.
///
/// Cheap to clone; every component sits behind an `Arc`.
#[derive(Clone)]
pub struct Orchestrator {
    gateway: Arc<CompletionGateway>,
    sequential: Arc<SequentialCollaborator>,
    batch: Arc<BatchCollaborator>,
    synthesizer: Arc<Synthesizer>,
}

impl Orchestrator {
    pub fn new(
        client: Arc<dyn LLMClient>,
        bulk: Option<Arc<dyn BulkCompletion>>,
        gateway_settings: GatewaySettings,
        settings: CollaborationSettings,
    ) -> Self {
        let gateway = Arc::new(CompletionGateway::new(client, gateway_settings));
        Self {
            sequential: Arc::new(SequentialCollaborator::new(
                gateway.clone(),
                settings.persona_sampling,
            )),
            batch: Arc::new(BatchCollaborator::from_capabilities(
                gateway.clone(),
                settings.persona_sampling,
                bulk,
                settings.batch_job_timeout,
            )),
            synthesizer: Arc::new(Synthesizer::new(
                gateway.clone(),
                settings.synthesis_sampling,
            )),
            gateway,
        }
    }

    /// Build from the loaded configuration.
    pub fn from_config(
        config: &ConclaveConfig,
        client: Arc<dyn LLMClient>,
        bulk: Option<Arc<dyn BulkCompletion>>,
    ) -> Self {
        Self::new(
            client,
            bulk,
            config.gateway_settings(),
            CollaborationSettings::from_config(config),
        )
    }

    fn prepare(&self, query: &str, requested: Option<i64>) -> Result<Vec<&'static Persona>> {
        // Blank queries are refused outright instead of being sent to the panel.
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("query must not be empty".to_string()));
        }
        self.gateway.ensure_configured()?;

        let count = clamp_agent_count(requested);
        Ok(selector::select(query, count))
    }

    fn mode_for(panel_size: usize) -> CollaborationMode {
        if panel_size >= BATCH_THRESHOLD {
            CollaborationMode::BatchPrimary
        } else {
            CollaborationMode::Sequential
        }
    }

    /// Run one full collaboration.
    pub async fn orchestrate(
        &self,
        query: &str,
        requested: Option<i64>,
        history: &[ChatMessage],
    ) -> Result<CollaborationResult> {
        let personas = self.prepare(query, requested)?;
        let requested_agent_count = clamp_agent_count(requested);

        tracing::info!(
            agents = personas.len(),
            batch = personas.len() >= BATCH_THRESHOLD,
            strategy = self.batch.strategy_name(),
            "starting collaboration"
        );

        let (answers, mode, batch_id) = match Self::mode_for(personas.len()) {
            CollaborationMode::Sequential => (
                self.sequential.run(query, &personas, history).await,
                CollaborationMode::Sequential,
                None,
            ),
            _ => {
                let outcome = self.batch.run(query, &personas, history).await;
                (outcome.answers, outcome.mode, outcome.batch_id)
            }
        };

        let synthesis = self.synthesizer.synthesize(query, &answers).await;

        let failed = answers.iter().filter(|a| a.failed).count();
        tracing::info!(mode = ?mode, answers = answers.len(), failed, "collaboration finished");

        Ok(CollaborationResult {
            mode,
            query: query.to_string(),
            requested_agent_count,
            answers,
            synthesis: Some(synthesis),
            produced_at: Utc::now(),
            batch_id,
        })
    }

    /// Streaming variant of [`orchestrate`](Self::orchestrate).
    ///
    /// Validation and the credential check happen before the stream is
    /// returned, so callers can still answer with a plain error.
    pub fn orchestrate_stream(
        &self,
        query: String,
        requested: Option<i64>,
        history: Vec<ChatMessage>,
    ) -> Result<impl Stream<Item = CollaborationEvent> + Send + 'static> {
        let personas = self.prepare(&query, requested)?;
        let this = self.clone();

        Ok(stream! {
            yield CollaborationEvent::Agents {
                agents: personas.iter().map(|p| p.summary()).collect(),
            };

            let answers = match Self::mode_for(personas.len()) {
                CollaborationMode::Sequential => {
                    let mut digest = ContextDigest::new();
                    let mut answers = Vec::with_capacity(personas.len());
                    for &persona in &personas {
                        let answer = this.sequential.respond(persona, &query, &digest, &history).await;
                        digest.record(&answer);
                        yield CollaborationEvent::AgentResponse { response: answer.clone() };
                        answers.push(answer);
                    }
                    answers
                }
                _ => {
                    let outcome = this.batch.run(&query, &personas, &history).await;
                    for answer in &outcome.answers {
                        yield CollaborationEvent::AgentResponse { response: answer.clone() };
                    }
                    outcome.answers
                }
            };

            let content = this.synthesizer.synthesize(&query, &answers).await;
            yield CollaborationEvent::Synthesis { content };
            yield CollaborationEvent::Done;
        })
    }
}

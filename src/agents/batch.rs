//! Batch collaboration for larger panels.
//!
//! Every persona answers independently; nobody sees anyone else's answer. The
//! answers are produced either by one grouped provider job ([`BulkDispatch`])
//! or by concurrent single calls awaited together ([`ParallelDispatch`]).
//! Either way they come back in selection order.

use crate::agents::answer_from;
use crate::agents::catalog::Persona;
use crate::llm::{BulkCompletion, BulkRequest, CompletionGateway, ModelTier, ProviderError, Sampling};
use crate::types::{AgentAnswer, ChatMessage, CollaborationMode};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Answers plus the path that actually produced them.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub answers: Vec<AgentAnswer>,
    pub mode: CollaborationMode,
    /// Bulk job name, set only when the bulk path succeeded.
    pub batch_id: Option<String>,
}

/// Prompt for one persona in an independent panel of `panel_size`.
pub fn batch_messages(
    persona: &Persona,
    query: &str,
    panel_size: usize,
    history: &[ChatMessage],
) -> Vec<ChatMessage> {
    let system = format!(
        "{}\n\nYou are one of {} AI agents collaborating to answer a question. \
         Provide your unique perspective as {}. Be thorough but concise.",
        persona.instruction, panel_size, persona.name
    );

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().cloned());
    messages.push(ChatMessage::user(query));
    messages
}

/// How a batch of independent persona prompts gets dispatched.
#[async_trait]
pub trait DispatchStrategy: Send + Sync {
    /// Produce exactly one answer per persona, in the given order.
    async fn dispatch(
        &self,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> BatchOutcome;

    fn name(&self) -> &'static str;
}

/// Concurrent single calls, one per persona.
pub struct ParallelDispatch {
    gateway: Arc<CompletionGateway>,
    sampling: Sampling,
}

impl ParallelDispatch {
    pub fn new(gateway: Arc<CompletionGateway>, sampling: Sampling) -> Self {
        Self { gateway, sampling }
    }

    async fn ask(
        &self,
        persona: &'static Persona,
        query: &str,
        panel_size: usize,
        history: &[ChatMessage],
    ) -> AgentAnswer {
        let messages = batch_messages(persona, query, panel_size, history);
        let result = self
            .gateway
            .complete(&messages, ModelTier::Persona, self.sampling)
            .await;

        if let Err(ref e) = result {
            tracing::warn!(persona = persona.id, error = %e, "persona call failed");
        }

        answer_from(persona, result)
    }
}

#[async_trait]
impl DispatchStrategy for ParallelDispatch {
    async fn dispatch(
        &self,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> BatchOutcome {
        let calls = personas
            .iter()
            .map(|&persona| self.ask(persona, query, personas.len(), history));

        // join_all keeps input order regardless of completion order
        let answers = join_all(calls).await;

        BatchOutcome {
            answers,
            mode: CollaborationMode::BatchFallback,
            batch_id: None,
        }
    }

    fn name(&self) -> &'static str {
        "parallel"
    }
}

/// One grouped provider job, falling back to [`ParallelDispatch`] when the job
/// as a whole fails.
pub struct BulkDispatch {
    bulk: Arc<dyn BulkCompletion>,
    gateway: Arc<CompletionGateway>,
    sampling: Sampling,
    job_timeout: Duration,
    fallback: ParallelDispatch,
}

impl BulkDispatch {
    pub fn new(
        bulk: Arc<dyn BulkCompletion>,
        gateway: Arc<CompletionGateway>,
        sampling: Sampling,
        job_timeout: Duration,
    ) -> Self {
        Self {
            fallback: ParallelDispatch::new(gateway.clone(), sampling),
            bulk,
            gateway,
            sampling,
            job_timeout,
        }
    }

    async fn submit(
        &self,
        batch_name: &str,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> Result<Vec<AgentAnswer>, ProviderError> {
        let params = self.gateway.params_for(ModelTier::Persona, self.sampling);
        let requests: Vec<BulkRequest> = personas
            .iter()
            .map(|persona| BulkRequest {
                custom_id: persona.id.to_string(),
                messages: batch_messages(persona, query, personas.len(), history),
                params: params.clone(),
            })
            .collect();

        let results = tokio::time::timeout(
            self.job_timeout,
            self.bulk.submit_batch(batch_name, requests),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.job_timeout))??;

        if results.len() != personas.len() {
            return Err(ProviderError::Provider(format!(
                "bulk job returned {} results for {} requests",
                results.len(),
                personas.len()
            )));
        }

        Ok(personas
            .iter()
            .zip(results)
            .map(|(&persona, result)| {
                if let Err(ref e) = result {
                    tracing::warn!(persona = persona.id, error = %e, "bulk item failed");
                }
                answer_from(persona, result)
            })
            .collect())
    }
}

#[async_trait]
impl DispatchStrategy for BulkDispatch {
    async fn dispatch(
        &self,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> BatchOutcome {
        let uuid = uuid::Uuid::new_v4().simple().to_string();
        let batch_name = format!("conclave_collab_{}", &uuid[..8]);

        match self.submit(&batch_name, query, personas, history).await {
            Ok(answers) => {
                tracing::info!(batch_id = %batch_name, agents = personas.len(), "bulk job finished");
                BatchOutcome {
                    answers,
                    mode: CollaborationMode::BatchPrimary,
                    batch_id: Some(batch_name),
                }
            }
            Err(e) => {
                tracing::warn!(
                    batch_id = %batch_name,
                    error = %e,
                    "bulk job failed, falling back to parallel calls"
                );
                self.fallback.dispatch(query, personas, history).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "bulk"
    }
}

/// Runs independent panels through whichever strategy was chosen at startup.
pub struct BatchCollaborator {
    strategy: Arc<dyn DispatchStrategy>,
}

impl BatchCollaborator {
    pub fn new(strategy: Arc<dyn DispatchStrategy>) -> Self {
        Self { strategy }
    }

    /// Pick the bulk strategy when the provider offers it, parallel otherwise.
    pub fn from_capabilities(
        gateway: Arc<CompletionGateway>,
        sampling: Sampling,
        bulk: Option<Arc<dyn BulkCompletion>>,
        job_timeout: Duration,
    ) -> Self {
        let strategy: Arc<dyn DispatchStrategy> = match bulk {
            Some(bulk) => Arc::new(BulkDispatch::new(bulk, gateway, sampling, job_timeout)),
            None => Arc::new(ParallelDispatch::new(gateway, sampling)),
        };
        Self::new(strategy)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub async fn run(
        &self,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> BatchOutcome {
        tracing::debug!(strategy = self.strategy.name(), agents = personas.len(), "dispatching batch");
        self.strategy.dispatch(query, personas, history).await
    }
}

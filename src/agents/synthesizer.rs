//! Merges persona answers into one final response.

use crate::llm::{CompletionGateway, ModelTier, Sampling};
use crate::types::{AgentAnswer, ChatMessage};
use std::sync::Arc;

const SYNTHESIS_PROMPT: &str = "You are Conclave, the lead AI orchestrator. Multiple AI agents have \
shared their perspectives on the user's question. Your job is to:\n\
1. Synthesize all perspectives into a comprehensive, unified answer\n\
2. Highlight where agents agreed and any important disagreements\n\
3. Add your own analysis where the agents missed something\n\
4. Structure the final answer clearly with appropriate formatting\n\
5. Credit individual agents when referencing their specific insights\n\n\
Be thorough, well-structured, and provide the best possible answer.";

/// Returned when every persona failed; no provider call is made.
pub const NO_ANSWERS_NOTICE: &str =
    "No agent produced a usable answer, so there is nothing to synthesize. Check the individual agent errors and try again.";

pub struct Synthesizer {
    gateway: Arc<CompletionGateway>,
    sampling: Sampling,
}

impl Synthesizer {
    pub fn new(gateway: Arc<CompletionGateway>, sampling: Sampling) -> Self {
        Self { gateway, sampling }
    }

    /// Labelled block of every successful answer, in answer order.
    pub fn agent_inputs(answers: &[AgentAnswer]) -> String {
        answers
            .iter()
            .filter(|a| !a.failed)
            .map(|a| format!("### {} {}:\n{}", a.persona.emoji, a.persona.name, a.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Always returns text. A failed synthesis call degrades to the raw inputs.
    pub async fn synthesize(&self, query: &str, answers: &[AgentAnswer]) -> String {
        if answers.iter().all(|a| a.failed) {
            tracing::warn!(answers = answers.len(), "no successful answers to synthesize");
            return NO_ANSWERS_NOTICE.to_string();
        }

        let inputs = Self::agent_inputs(answers);
        let messages = vec![
            ChatMessage::system(SYNTHESIS_PROMPT),
            ChatMessage::user(format!(
                "Original question: {}\n\nAgent responses:\n{}",
                query, inputs
            )),
        ];

        match self
            .gateway
            .complete(&messages, ModelTier::Synthesis, self.sampling)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed, returning raw answers");
                format!("Synthesis error: {}\n\nRaw agent responses:\n{}", e, inputs)
            }
        }
    }
}

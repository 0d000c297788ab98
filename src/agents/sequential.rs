//! Sequential collaboration for small panels.
//!
//! Personas answer one at a time in selection order. Each later persona sees a
//! digest of the earlier successful answers, so calls are causally ordered and
//! never overlap.

use crate::agents::answer_from;
use crate::agents::catalog::Persona;
use crate::llm::{CompletionGateway, ModelTier, Sampling};
use crate::types::{AgentAnswer, ChatMessage};
use std::sync::Arc;

/// How much of each answer is carried forward to later personas.
pub const DIGEST_EXCERPT_CHARS: usize = 500;

/// Running summary of prior answers injected into later prompts.
#[derive(Debug, Clone, Default)]
pub struct ContextDigest {
    text: String,
}

impl ContextDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an answer's excerpt. Failed answers are skipped so errors never
    /// reach downstream prompts.
    pub fn record(&mut self, answer: &AgentAnswer) {
        if answer.failed {
            return;
        }
        let excerpt: String = answer.content.chars().take(DIGEST_EXCERPT_CHARS).collect();
        self.text
            .push_str(&format!("{}: {}\n", answer.persona.name, excerpt));
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

pub struct SequentialCollaborator {
    gateway: Arc<CompletionGateway>,
    sampling: Sampling,
}

impl SequentialCollaborator {
    pub fn new(gateway: Arc<CompletionGateway>, sampling: Sampling) -> Self {
        Self { gateway, sampling }
    }

    /// Build the prompt for one persona given what came before it.
    pub fn messages(
        persona: &Persona,
        query: &str,
        digest: &ContextDigest,
        history: &[ChatMessage],
    ) -> Vec<ChatMessage> {
        let mut system = format!(
            "{}\n\nYou are collaborating with other AI agents to answer a question. \
             The user asked: \"{}\"\n",
            persona.instruction, query
        );

        if !digest.is_empty() {
            system.push_str(&format!(
                "\nPrevious agents have shared these insights:\n{}\n\
                 Build on their work and add your unique perspective as {}. \
                 Don't repeat what others said; contribute new value.",
                digest.as_str(),
                persona.name
            ));
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::user(query));
        messages
    }

    /// Ask one persona. Never fails: provider errors become a failed answer.
    pub async fn respond(
        &self,
        persona: &'static Persona,
        query: &str,
        digest: &ContextDigest,
        history: &[ChatMessage],
    ) -> AgentAnswer {
        let messages = Self::messages(persona, query, digest, history);
        let result = self
            .gateway
            .complete(&messages, ModelTier::Persona, self.sampling)
            .await;

        if let Err(ref e) = result {
            tracing::warn!(persona = persona.id, error = %e, "persona call failed");
        }

        answer_from(persona, result)
    }

    /// Run the whole panel in order, one call at a time.
    pub async fn run(
        &self,
        query: &str,
        personas: &[&'static Persona],
        history: &[ChatMessage],
    ) -> Vec<AgentAnswer> {
        let mut digest = ContextDigest::new();
        let mut answers = Vec::with_capacity(personas.len());

        for &persona in personas {
            let answer = self.respond(persona, query, &digest, history).await;
            digest.record(&answer);
            answers.push(answer);
        }

        answers
    }
}

//! Multi-persona collaboration
//!
//! A query is answered by a panel of personas drawn from a fixed catalog and the
//! answers are merged into one synthesis.
//!
//! # Pipeline
//!
//! 1. [`selector`] scores the catalog against the query and picks the panel.
//! 2. Small panels run through [`sequential`]: one call at a time, each persona
//!    seeing a digest of the earlier answers.
//! 3. Larger panels run through [`batch`]: independent calls, either as one bulk
//!    job or as parallel single calls.
//! 4. [`synthesizer`] merges the successful answers.
//!
//! [`orchestrator`] ties the steps together and provides the streaming variant.

pub mod batch;
pub mod catalog;
pub mod orchestrator;
pub mod selector;
pub mod sequential;
pub mod synthesizer;

use crate::llm::ProviderError;
use crate::types::AgentAnswer;
use catalog::Persona;
use chrono::Utc;

pub use batch::{BatchCollaborator, BatchOutcome, BulkDispatch, DispatchStrategy, ParallelDispatch};
pub use catalog::{find, roster, MAX_AGENTS_PER_SESSION, PERSONAS};
pub use orchestrator::{clamp_agent_count, CollaborationSettings, Orchestrator};
pub use sequential::{ContextDigest, SequentialCollaborator};
pub use synthesizer::Synthesizer;

/// Turn a provider outcome into an answer record. Errors become failed answers
/// with a readable `Error: ...` body.
pub(crate) fn answer_from(
    persona: &'static Persona,
    result: Result<String, ProviderError>,
) -> AgentAnswer {
    let (content, failed, error_detail) = match result {
        Ok(text) => (text, false, None),
        Err(e) => (format!("Error: {}", e), true, Some(e.to_string())),
    };

    AgentAnswer {
        persona_id: persona.id.to_string(),
        persona: persona.snapshot(),
        content,
        produced_at: Utc::now(),
        failed,
        error_detail,
    }
}

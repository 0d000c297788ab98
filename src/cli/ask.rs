//! `ask` command: one collaboration rendered in the terminal.

use super::output::Output;
use crate::agents::Orchestrator;
use crate::types::{CollaborationResult, Result};

/// Run one collaboration and print the panel, answers, mode and synthesis.
pub async fn run(
    orchestrator: &Orchestrator,
    query: &str,
    agents: Option<i64>,
    output: &Output,
) -> Result<CollaborationResult> {
    output.info("Consulting the panel...");
    let result = orchestrator.orchestrate(query, agents, &[]).await?;

    output.header("Panel");
    let names: Vec<_> = result
        .answers
        .iter()
        .map(|a| format!("{} {}", a.persona.emoji, a.persona.name))
        .collect();
    output.kv("Personas", &names.join(", "));
    output.mode(result.mode, result.batch_id.as_deref());

    output.header("Answers");
    for (index, answer) in result.answers.iter().enumerate() {
        output.answer(index + 1, answer);
    }

    if let Some(synthesis) = &result.synthesis {
        output.synthesis(synthesis);
    }

    let failed = result.answers.iter().filter(|a| a.failed).count();
    if failed > 0 {
        output.warning(&format!(
            "{} of {} personas failed",
            failed,
            result.answers.len()
        ));
    }
    output.complete("Collaboration finished");

    Ok(result)
}

//! Keyword-based persona selection.
//!
//! Scoring is a pure function of the query text and the catalog; there is no
//! randomness, so the same query always yields the same panel.

use crate::agents::catalog::{Persona, PERSONAS};

const SPECIALTY_MATCH: u32 = 2;
const TOPIC_BOOST: u32 = 3;
const DIVERSITY_BIAS: u32 = 1;

/// Topic keywords and the persona ids they boost. Every matching row adds
/// [`TOPIC_BOOST`], evaluated top to bottom.
static TOPIC_BOOSTS: &[(&[&str], &[&str])] = &[
    (
        &["code", "program", "function", "bug", "error"],
        &["coder", "debugger", "architect", "testing"],
    ),
    (
        &["design", "ui", "ux", "interface"],
        &["ux", "creative", "accessibility"],
    ),
    (
        &["plan", "strategy", "roadmap"],
        &["planner", "strategist", "product"],
    ),
    (&["security", "risk", "vulnerable"], &["security", "critic"]),
    (
        &["data", "analytics", "metrics"],
        &["analyst", "data_eng", "ml_eng"],
    ),
    (
        &["learn", "explain", "understand", "how"],
        &["educator", "mentor"],
    ),
];

/// A persona paired with its relevance score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionScore {
    pub persona: &'static Persona,
    pub score: u32,
}

/// Score one persona against an already lower-cased query.
fn score(persona: &Persona, query_lower: &str) -> u32 {
    let specialty = persona.specialty.to_lowercase();
    let specialty_hits = specialty
        .split(", ")
        .filter(|phrase| {
            phrase
                .split_whitespace()
                .any(|word| query_lower.contains(word))
        })
        .count() as u32;

    let boosts = TOPIC_BOOSTS
        .iter()
        .filter(|(keywords, ids)| {
            ids.contains(&persona.id) && keywords.iter().any(|k| query_lower.contains(k))
        })
        .count() as u32;

    specialty_hits * SPECIALTY_MATCH + boosts * TOPIC_BOOST + DIVERSITY_BIAS
}

/// Score every persona in catalog order.
pub fn score_all(query: &str) -> Vec<SelectionScore> {
    let query_lower = query.to_lowercase();
    PERSONAS
        .iter()
        .map(|persona| SelectionScore {
            persona,
            score: score(persona, &query_lower),
        })
        .collect()
}

/// Pick the `count` most relevant personas for `query`.
///
/// Returns `min(count, catalog size)` personas, highest score first. Ties keep
/// catalog order.
pub fn select(query: &str, count: usize) -> Vec<&'static Persona> {
    let mut scores = score_all(query);
    // `sort_by` is stable, which is what keeps tie order reproducible.
    scores.sort_by(|a, b| b.score.cmp(&a.score));

    scores
        .into_iter()
        .take(count.min(PERSONAS.len()))
        .map(|s| s.persona)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(personas: &[&Persona]) -> Vec<&'static str> {
        personas.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_returns_requested_count_of_distinct_personas() {
        for count in [1, 4, 5, 7, 25] {
            let selected = select("how do I plan a data migration?", count);
            assert_eq!(selected.len(), count);
            let unique: HashSet<_> = selected.iter().map(|p| p.id).collect();
            assert_eq!(unique.len(), count);
        }
    }

    #[test]
    fn test_count_larger_than_catalog_is_capped() {
        assert_eq!(select("anything", 100).len(), PERSONAS.len());
    }

    #[test]
    fn test_no_keywords_falls_back_to_catalog_order() {
        let selected = select("zzz qqq", 3);
        assert_eq!(ids(&selected), vec!["analyst", "coder", "researcher"]);
        assert!(score_all("zzz qqq").iter().all(|s| s.score == 1));
    }

    #[test]
    fn test_code_query_boosts_engineering_panel() {
        let selected = select("Why does this function throw an error?", 4);
        assert_eq!(
            ids(&selected),
            vec!["coder", "debugger", "architect", "testing"]
        );
    }

    #[test]
    fn test_specialty_and_boost_add_up() {
        let scores = score_all("security risk in our data design");
        let security = scores.iter().find(|s| s.persona.id == "security").unwrap();
        // "risk assessment" phrase, security boost row, bias
        assert_eq!(
            security.score,
            SPECIALTY_MATCH + TOPIC_BOOST + DIVERSITY_BIAS
        );

        let analyst = scores.iter().find(|s| s.persona.id == "analyst").unwrap();
        // "data analysis" phrase, data boost row, bias
        assert_eq!(analyst.score, SPECIALTY_MATCH + TOPIC_BOOST + DIVERSITY_BIAS);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let query = "Explain how to design a secure data pipeline";
        let first = ids(&select(query, 10));
        for _ in 0..5 {
            assert_eq!(ids(&select(query, 10)), first);
        }
    }

    #[test]
    fn test_query_case_is_ignored() {
        assert_eq!(
            ids(&select("DEBUG THIS CODE", 5)),
            ids(&select("debug this code", 5))
        );
    }
}

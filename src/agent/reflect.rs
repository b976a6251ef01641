//! Reflection stage.
//!
//! The sole decision point of the research loop: given the accumulated
//! documents, the model judges whether they suffice to answer the
//! question and, if not, proposes refined queries.

use crate::error::{AgentError, Stage};
use crate::llm::{strip_code_fences, LanguageModel};
use crate::models::{Document, ReflectionVerdict};
use serde::Deserialize;
use tracing::{debug, info};

const REFLECT_PROMPT: &str = r#"You are a research analyst. Decide whether the search results below are sufficient to answer the user's question comprehensively. If they are not, propose 1-3 new, refined search queries that are distinct from what was already searched.

Respond with a JSON object of this exact shape and nothing else:
{"sufficient": true} or {"sufficient": false, "refined_queries": ["query one"]}"#;

/// Shape of the model's JSON reply.
#[derive(Debug, Deserialize)]
struct ReflectOutput {
    sufficient: bool,
    #[serde(default)]
    refined_queries: Vec<String>,
}

/// Judge the accumulated documents against the original question.
pub async fn reflect(
    llm: &dyn LanguageModel,
    question: &str,
    documents: &[Document],
) -> Result<ReflectionVerdict, AgentError> {
    info!("Reflecting on {} documents", documents.len());

    let prompt = build_prompt(question, documents);
    let reply = llm.generate(&prompt).await?;

    let verdict = parse_verdict(&reply)?;
    debug!(
        "Reflection verdict: sufficient={}, {} refined queries",
        verdict.sufficient,
        verdict.refined_queries.len()
    );

    Ok(verdict)
}

fn build_prompt(question: &str, documents: &[Document]) -> String {
    let snippets = if documents.is_empty() {
        "(no documents gathered yet)".to_string()
    } else {
        documents
            .iter()
            .map(|d| format!("- {}", d.snippet))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "{}\n\nOriginal question: {}\n\nSearch results:\n{}",
        REFLECT_PROMPT, question, snippets
    )
}

/// Parse the model reply into a verdict.
///
/// An "insufficient" reply that carries no refined queries is coerced to
/// sufficient: there is nothing new to search for, so synthesis with the
/// accumulated documents is the only useful next step.
fn parse_verdict(reply: &str) -> Result<ReflectionVerdict, AgentError> {
    let output: ReflectOutput = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| AgentError::malformed(Stage::Reflect, e.to_string()))?;

    let refined_queries: Vec<String> = output
        .refined_queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if output.sufficient || refined_queries.is_empty() {
        return Ok(ReflectionVerdict::sufficient());
    }

    Ok(ReflectionVerdict {
        sufficient: false,
        refined_queries,
    })
}

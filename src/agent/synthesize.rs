//! Synthesis stage.
//!
//! Composes the final cited answer from the accumulated documents. The
//! model sees the documents numbered in accumulation order and replies
//! with an answer plus the source ids it used; those ids are renumbered
//! into the contiguous citation sequence attached to the answer.

use crate::error::{AgentError, Stage};
use crate::llm::{strip_code_fences, LanguageModel};
use crate::models::{Answer, Citation, Document};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};

const SYNTHESIZE_PROMPT: &str = r#"You are a report writer. Synthesize a concise English answer (at most 80 words) to the user's question from the numbered documents below. Do NOT put citations inside the answer text. Instead list the ids of the documents you used, in the order they should be cited.

Respond with a JSON object of this exact shape and nothing else:
{"answer": "...", "cited_ids": [1, 3]}"#;

/// Answer returned when the run accumulated no documents at all.
const NO_INFORMATION_ANSWER: &str = "No information found.";

/// Shape of the model's JSON reply.
#[derive(Debug, Deserialize)]
struct SynthesizeOutput {
    answer: String,
    #[serde(default)]
    cited_ids: Vec<usize>,
}

/// Compose the final answer from the accumulated documents.
///
/// With an empty document set no LLM call is made and a fixed
/// no-information answer is returned. Provider errors abort the run;
/// there is no partial-answer fallback.
pub async fn synthesize(
    llm: &dyn LanguageModel,
    question: &str,
    documents: &[Document],
) -> Result<Answer, AgentError> {
    if documents.is_empty() {
        info!("No documents accumulated, skipping synthesis call");
        return Ok(Answer {
            answer: NO_INFORMATION_ANSWER.to_string(),
            citations: Vec::new(),
        });
    }

    info!("Synthesizing answer from {} documents", documents.len());

    let prompt = build_prompt(question, documents);
    let reply = llm.generate(&prompt).await?;

    let output: SynthesizeOutput = serde_json::from_str(strip_code_fences(&reply))
        .map_err(|e| AgentError::malformed(Stage::Synthesize, e.to_string()))?;

    let citations = number_citations(documents, &output.cited_ids);
    debug!("Answer cites {} sources", citations.len());

    Ok(Answer {
        answer: append_citation_markers(&output.answer, &citations),
        citations,
    })
}

fn build_prompt(question: &str, documents: &[Document]) -> String {
    let numbered = documents
        .iter()
        .enumerate()
        .map(|(i, d)| {
            format!(
                "[Document {}] URL: {}\nTitle: {}\nContent: {}",
                i + 1,
                d.url,
                d.title,
                d.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\nQuestion: {}\n\nDocuments:\n{}",
        SYNTHESIZE_PROMPT, question, numbered
    )
}

/// Renumber the model's cited document ids into final citations.
///
/// Final ids follow the order ids first appear in `cited_ids`, renumbered
/// 1-based and contiguous. Ids outside the document range and repeat
/// references to an already-cited url are dropped.
fn number_citations(documents: &[Document], cited_ids: &[usize]) -> Vec<Citation> {
    let mut seen_urls: HashSet<&str> = HashSet::new();
    let mut citations = Vec::new();

    for &id in cited_ids {
        let Some(doc) = id.checked_sub(1).and_then(|i| documents.get(i)) else {
            debug!("Dropping out-of-range cited id {}", id);
            continue;
        };

        if seen_urls.insert(&doc.url) {
            citations.push(Citation {
                id: citations.len() + 1,
                url: doc.url.clone(),
                title: doc.title.clone(),
            });
        }
    }

    citations
}

/// Append the trailing `[1][2]…` citation markers to the answer text.
fn append_citation_markers(answer: &str, citations: &[Citation]) -> String {
    let markers: String = citations.iter().map(|c| format!("[{}]", c.id)).collect();
    format!("{}{}", answer.trim(), markers)
}

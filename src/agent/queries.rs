//! Query generation stage.
//!
//! Turns the user question into the first cycle's search queries. Later
//! cycles get their queries from the reflection stage instead, so this
//! runs exactly once per run.

use crate::error::{AgentError, Stage};
use crate::llm::{strip_code_fences, LanguageModel};
use serde::Deserialize;
use tracing::{debug, info};

const QUERY_PROMPT: &str = r#"You are a research assistant. Generate a set of 3-5 diverse and relevant search engine queries for the user's question.

Respond with a JSON object of this exact shape and nothing else:
{"queries": ["query one", "query two", "query three"]}"#;

/// Shape of the model's JSON reply.
#[derive(Debug, Deserialize)]
struct QueriesOutput {
    queries: Vec<String>,
}

/// Generate the initial search queries for a question.
///
/// Fails fast on provider errors or an empty/unparseable reply; there is
/// no retry for this stage.
pub async fn generate_queries(
    llm: &dyn LanguageModel,
    question: &str,
) -> Result<Vec<String>, AgentError> {
    info!("Generating search queries");

    let prompt = format!("{}\n\nUser question: {}", QUERY_PROMPT, question);
    let reply = llm.generate(&prompt).await?;

    let queries = parse_queries(&reply)?;
    debug!("Generated {} queries", queries.len());

    Ok(queries)
}

/// Parse the model reply into a non-empty query list.
fn parse_queries(reply: &str) -> Result<Vec<String>, AgentError> {
    let output: QueriesOutput = serde_json::from_str(strip_code_fences(reply))
        .map_err(|e| AgentError::malformed(Stage::GenerateQueries, e.to_string()))?;

    let queries: Vec<String> = output
        .queries
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    if queries.is_empty() {
        return Err(AgentError::malformed(
            Stage::GenerateQueries,
            "model returned no queries",
        ));
    }

    Ok(queries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_queries() {
        let queries =
            parse_queries(r#"{"queries": ["capital of France", "France capital city"]}"#).unwrap();
        assert_eq!(queries, vec!["capital of France", "France capital city"]);
    }

    #[test]
    fn test_parse_queries_strips_fences() {
        let reply = "```json\n{\"queries\": [\"a\"]}\n```";
        assert_eq!(parse_queries(reply).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_parse_queries_rejects_empty_list() {
        let err = parse_queries(r#"{"queries": []}"#).unwrap_err();
        assert!(matches!(
            err,
            AgentError::MalformedOutput {
                stage: Stage::GenerateQueries,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_queries_drops_blank_entries() {
        let queries = parse_queries(r#"{"queries": ["  ", "real query"]}"#).unwrap();
        assert_eq!(queries, vec!["real query"]);
    }

    #[test]
    fn test_parse_queries_rejects_prose() {
        assert!(parse_queries("Here are some queries you could try").is_err());
    }
}

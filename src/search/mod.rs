//! Search providers and the concurrent search stage.
//!
//! A single-method trait hides whether searches hit the live Tavily API
//! or the deterministic offline mock; both return the same document
//! shape. The stage itself is a scatter/gather: every query in the
//! current set is dispatched at once, the stage waits for all outcomes,
//! and a failing query simply contributes nothing.

pub mod mock;
pub mod tavily;

pub use mock::MockSearch;
pub use tavily::TavilySearch;

use crate::config::SearchConfig;
use crate::error::AgentError;
use crate::models::Document;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// A web search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short backend name, e.g. `"tavily"`.
    fn name(&self) -> &str;

    /// Run one query and return its result documents.
    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError>;
}

/// Select a search provider from an optional Tavily key.
///
/// A missing key is not an error: the offline mock is selected instead so
/// the agent stays usable without a search credential. `force_mock`
/// (the `--mock-search` flag) overrides a present key.
pub fn select_provider(
    config: &SearchConfig,
    tavily_key: Option<String>,
    force_mock: bool,
) -> Box<dyn SearchProvider> {
    if force_mock {
        info!("Using mock search (forced)");
        return Box::new(MockSearch::new(config.max_results));
    }

    match tavily_key.filter(|k| !k.is_empty()) {
        Some(key) => {
            info!("Using Tavily search");
            Box::new(TavilySearch::new(key, config))
        }
        None => {
            info!("TAVILY_API_KEY not set, using mock search");
            Box::new(MockSearch::new(config.max_results))
        }
    }
}

/// Select a search provider from the process environment.
pub fn from_env(config: &SearchConfig, force_mock: bool) -> Box<dyn SearchProvider> {
    select_provider(config, std::env::var("TAVILY_API_KEY").ok(), force_mock)
}

/// Dispatch every query concurrently and gather all results.
///
/// This is a barrier join, not a race: the stage suspends until every
/// dispatched call has completed or failed. A failing query is isolated
/// (it contributes zero documents); if all queries fail the returned set
/// is empty but well-formed. Results are flattened in query order and
/// de-duplicated by url.
pub async fn search_all(provider: &dyn SearchProvider, queries: &[String]) -> Vec<Document> {
    debug!("Dispatching {} queries to {}", queries.len(), provider.name());

    let outcomes = join_all(queries.iter().map(|q| provider.search(q))).await;

    let mut seen: HashSet<String> = HashSet::new();
    let mut documents = Vec::new();

    for (query, outcome) in queries.iter().zip(outcomes) {
        match outcome {
            Ok(results) => {
                for doc in results {
                    if seen.insert(doc.url.clone()) {
                        documents.push(doc);
                    }
                }
            }
            Err(e) => {
                warn!("Search for {:?} failed: {}", query, e);
            }
        }
    }

    debug!("Gathered {} unique documents", documents.len());
    documents
}

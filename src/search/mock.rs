//! Deterministic offline search provider.
//!
//! Used when no Tavily key is configured or `--mock-search` is passed.
//! Every query produces the same fixed set of documents (urls derived
//! from a slug of the query), so keyless runs and tests are reproducible.

use crate::error::AgentError;
use crate::models::Document;
use crate::search::SearchProvider;
use async_trait::async_trait;
use tracing::debug;

/// Offline search provider returning synthetic results.
pub struct MockSearch {
    max_results: usize,
}

impl MockSearch {
    pub fn new(max_results: usize) -> Self {
        Self { max_results }
    }
}

/// Reduce a query to a stable url-safe slug.
fn slugify(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());

    for ch in query.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError> {
        debug!("Mock searching for: {}", query);

        let slug = slugify(query);
        let documents = (1..=self.max_results)
            .map(|n| Document {
                url: format!("https://example.com/{}/{}", slug, n),
                title: format!("{} (result {})", query, n),
                snippet: format!(
                    "Offline placeholder result {} for the query \"{}\".",
                    n, query
                ),
            })
            .collect();

        Ok(documents)
    }
}

//! Tavily search API client.

use crate::config::SearchConfig;
use crate::error::AgentError;
use crate::models::Document;
use crate::search::SearchProvider;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SEARCH_URL: &str = "https://api.tavily.com/search";

/// Tavily search request body.
#[derive(Debug, Serialize)]
struct SearchRequest {
    api_key: String,
    query: String,
    max_results: usize,
}

/// Tavily search response body.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
    title: String,
    #[serde(default)]
    content: String,
}

impl From<SearchResult> for Document {
    fn from(result: SearchResult) -> Self {
        Document {
            url: result.url,
            title: result.title,
            snippet: result.content,
        }
    }
}

/// Live web search backed by the Tavily API.
pub struct TavilySearch {
    client: reqwest::Client,
    api_key: String,
    max_results: usize,
}

impl TavilySearch {
    /// Create a client with the configured result cap and timeout.
    pub fn new(api_key: String, config: &SearchConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            max_results: config.max_results,
        }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str) -> Result<Vec<Document>, AgentError> {
        let request = SearchRequest {
            api_key: self.api_key.clone(),
            query: query.to_string(),
            max_results: self.max_results,
        };

        debug!("Searching Tavily for: {}", query);

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::provider("tavily", "request timed out")
                } else if e.is_connect() {
                    AgentError::provider("tavily", "cannot reach the Tavily API")
                } else {
                    AgentError::provider("tavily", e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::provider(
                "tavily",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            AgentError::provider("tavily", format!("failed to parse response: {}", e))
        })?;

        Ok(body.results.into_iter().map(Document::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = SearchRequest {
            api_key: "key".to_string(),
            query: "capital of France".to_string(),
            max_results: 3,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["api_key"], "key");
        assert_eq!(json["query"], "capital of France");
        assert_eq!(json["max_results"], 3);
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "query": "capital of France",
            "results": [
                {"url": "https://example.com/paris", "title": "Paris", "content": "Paris is the capital."},
                {"url": "https://example.com/france", "title": "France"}
            ]
        }"#;

        let response: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.results.len(), 2);

        let doc = Document::from(response.results.into_iter().next().unwrap());
        assert_eq!(doc.url, "https://example.com/paris");
        assert_eq!(doc.snippet, "Paris is the capital.");
    }

    #[test]
    fn test_empty_response_parses() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}

//! OpenAI provider implementation.
//!
//! Wraps the chat-completions REST endpoint; the prompt is sent as a
//! single user message.

use crate::config::ModelConfig;
use crate::error::AgentError;
use crate::llm::LanguageModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://api.openai.com/v1";

/// Chat-completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Language model backed by OpenAI.
#[derive(Debug)]
pub struct OpenAiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiModel {
    /// Create a client with the configured model and timeout.
    pub fn new(api_key: String, config: &ModelConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            model: config.openai_model.clone(),
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        let url = format!("{}/chat/completions", BASE_URL);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        debug!("Sending OpenAI request ({} chars)", prompt.len());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::provider("openai", "request timed out")
                } else if e.is_connect() {
                    AgentError::provider("openai", "cannot reach the OpenAI API")
                } else {
                    AgentError::provider("openai", e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::provider(
                "openai",
                format!("HTTP {}: {}", status, body),
            ));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            AgentError::provider("openai", format!("failed to parse response: {}", e))
        })?;

        let text = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AgentError::provider("openai", "response contained no choices"))?;

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            temperature: 0.0,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "generated text"}}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.choices[0].message.content, "generated text");
    }

    #[test]
    fn test_model_identity() {
        let model = OpenAiModel::new("key".to_string(), &ModelConfig::default());
        assert_eq!(model.name(), "openai");
        assert_eq!(model.model(), "gpt-4o-mini");
    }
}

//! Language model providers.
//!
//! A single-method trait hides the vendor behind the rest of the system:
//! stages hand over a prompt and get back generated text. The concrete
//! implementation is chosen exactly once at startup from whichever API
//! key is present, Google first, then OpenAI.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

use crate::config::ModelConfig;
use crate::error::AgentError;
use async_trait::async_trait;
use tracing::info;

/// A language model backend.
///
/// Implementations wrap one vendor API behind a single `generate` call;
/// everything else in the system is oblivious to which vendor is active.
#[async_trait]
pub trait LanguageModel: Send + Sync + std::fmt::Debug {
    /// Short backend name, e.g. `"gemini"`.
    fn name(&self) -> &str;

    /// Model identifier sent to the API, e.g. `"gemini-1.5-flash"`.
    fn model(&self) -> &str;

    /// Generate text for a prompt.
    async fn generate(&self, prompt: &str) -> Result<String, AgentError>;
}

/// Select a model from the two optional vendor keys.
///
/// Google is preferred when both keys are present. Returns
/// [`AgentError::MissingCredentials`] when neither is set; this is checked
/// before any stage runs, so no network call is ever attempted without a
/// credential.
pub fn select_model(
    config: &ModelConfig,
    google_key: Option<String>,
    openai_key: Option<String>,
) -> Result<Box<dyn LanguageModel>, AgentError> {
    if let Some(key) = google_key.filter(|k| !k.is_empty()) {
        info!("Using Google Gemini ({})", config.gemini_model);
        return Ok(Box::new(GeminiModel::new(key, config)));
    }

    if let Some(key) = openai_key.filter(|k| !k.is_empty()) {
        info!("Using OpenAI ({})", config.openai_model);
        return Ok(Box::new(OpenAiModel::new(key, config)));
    }

    Err(AgentError::MissingCredentials)
}

/// Select a model from the process environment.
pub fn from_env(config: &ModelConfig) -> Result<Box<dyn LanguageModel>, AgentError> {
    select_model(
        config,
        std::env::var("GOOGLE_API_KEY").ok(),
        std::env::var("OPENAI_API_KEY").ok(),
    )
}

/// Strip a markdown code fence from a model reply, if present.
///
/// Models asked for JSON frequently wrap it in ```json fences; parsing
/// happens on the inner text.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Skip an optional language tag on the opening fence line.
    let body = match rest.split_once('\n') {
        Some((_lang, body)) => body,
        None => rest,
    };

    body.strip_suffix("```").unwrap_or(body).trim()
}

//! Error taxonomy for the research agent.
//!
//! Three failure classes exist: missing credentials (fatal before any
//! stage runs), provider failures (transport or API errors from the LLM
//! or search backends), and malformed model output. Reaching the
//! refinement-cycle cap is a normal terminal condition, not an error.

use std::fmt;
use thiserror::Error;

/// LLM stage that asked for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    GenerateQueries,
    Reflect,
    Synthesize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::GenerateQueries => write!(f, "generate-queries"),
            Stage::Reflect => write!(f, "reflect"),
            Stage::Synthesize => write!(f, "synthesize"),
        }
    }
}

/// Errors surfaced by the research agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No usable language model credential was found at startup.
    #[error("no language model credential found: set GOOGLE_API_KEY or OPENAI_API_KEY")]
    MissingCredentials,

    /// An LLM or search call failed (transport, timeout, or API error).
    #[error("{provider} request failed: {message}")]
    Provider { provider: String, message: String },

    /// The model replied, but the reply could not be parsed into the
    /// structure the stage asked for.
    #[error("{stage} stage returned malformed output: {message}")]
    MalformedOutput { stage: Stage, message: String },
}

impl AgentError {
    /// Build a provider error tagged with the backend name.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Build a malformed-output error for the given stage.
    pub fn malformed(stage: Stage, message: impl Into<String>) -> Self {
        Self::MalformedOutput {
            stage,
            message: message.into(),
        }
    }

    /// True for configuration errors that should exit with code 2.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::GenerateQueries.to_string(), "generate-queries");
        assert_eq!(Stage::Synthesize.to_string(), "synthesize");
    }

    #[test]
    fn test_error_messages() {
        let err = AgentError::provider("tavily", "HTTP 429: Too Many Requests");
        assert_eq!(
            err.to_string(),
            "tavily request failed: HTTP 429: Too Many Requests"
        );

        let err = AgentError::malformed(Stage::Reflect, "expected JSON object");
        assert!(err.to_string().contains("reflect"));
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_configuration_classification() {
        assert!(AgentError::MissingCredentials.is_configuration());
        assert!(!AgentError::provider("gemini", "boom").is_configuration());
    }
}

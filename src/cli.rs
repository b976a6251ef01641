//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Sleuth - LLM-powered web research agent
///
/// Ask a question; sleuth generates search queries, searches the web,
/// refines its queries when coverage is thin, and prints a concise
/// answer with numbered source citations.
///
/// Examples:
///   sleuth "Who won the 2022 FIFA World Cup?"
///   sleuth "What is Rust's release cadence?" --format text
///   sleuth "capital of France" --mock-search --max-cycles 1
///   sleuth --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// The question to research
    ///
    /// Not required when using --init-config.
    #[arg(value_name = "QUESTION", required_unless_present = "init_config")]
    pub question: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .sleuth.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Maximum refinement cycles before synthesis is forced
    #[arg(long, default_value = "2", value_name = "COUNT")]
    pub max_cycles: usize,

    /// Search results requested per query
    #[arg(long, default_value = "3", value_name = "COUNT")]
    pub max_results: usize,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.0")]
    pub temperature: f32,

    /// Request timeout in seconds for provider calls
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format (json, text)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the result to a file instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Use the offline mock search provider even if a Tavily key is set
    #[arg(long)]
    pub mock_search: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .sleuth.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON object with answer and citations (default)
    #[default]
    Json,
    /// Human-readable text
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the question, defaulting to empty (validated before use).
    pub fn question(&self) -> &str {
        self.question.as_deref().unwrap_or("")
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.question().trim().is_empty() {
            return Err("Question must not be empty".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        if self.max_results == 0 {
            return Err("Max results must be at least 1".to_string());
        }

        if self.max_cycles > 10 {
            return Err("Max cycles must be 10 or fewer".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

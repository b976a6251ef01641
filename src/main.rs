//! Sleuth - LLM-powered web research agent
//!
//! A CLI tool that answers a natural-language question by generating
//! search queries, searching the web, reflecting on coverage (with a
//! bounded refinement loop), and synthesizing a cited answer.
//!
//! Exit codes:
//!   0 - Success (answer printed to stdout)
//!   1 - Runtime error (provider failure, malformed model output, I/O)
//!   2 - Configuration error (no usable model credential)

mod agent;
mod cli;
mod config;
mod error;
mod llm;
mod models;
mod output;
mod search;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use error::AgentError;
use indicatif::{ProgressBar, ProgressStyle};
use models::RunMetadata;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Sleuth v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the research
    match run_research(args).await {
        Ok(()) => {
            std::process::exit(0);
        }
        Err(e) => {
            error!("Research failed: {}", e);
            eprintln!("\n❌ Error: {}", e);

            let is_config_error = e
                .downcast_ref::<AgentError>()
                .is_some_and(AgentError::is_configuration);
            std::process::exit(if is_config_error { 2 } else { 1 });
        }
    }
}

/// Handle --init-config: generate a default .sleuth.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".sleuth.toml");

    if path.exists() {
        eprintln!("⚠️  .sleuth.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .sleuth.toml")?;

    println!("✅ Created .sleuth.toml with default settings.");
    println!("   Edit it to customize models, search, and the refinement cap.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr: stdout is reserved for the answer.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete research workflow.
async fn run_research(args: Args) -> Result<()> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let question = args.question().to_string();

    // Select providers. The model credential check happens here, before
    // any stage runs or any network call is attempted.
    let llm = llm::from_env(&config.model)?;
    let search = search::from_env(&config.search, args.mock_search);

    let agent = agent::ResearchAgent::new(llm, search, config.agent.max_cycles);
    let model_name = agent.model_name();
    let search_name = agent.search_name().to_string();

    if !args.quiet {
        eprintln!("🔎 Researching: {}", question);
        eprintln!("   Model: {}", model_name);
        eprintln!("   Search: {}", search_name);
    }

    // Spinner on stderr with per-phase status messages.
    let spinner = make_spinner(args.quiet);
    let agent = agent.with_progress(spinner.clone());

    let result = agent.run(&question).await;
    spinner.finish_and_clear();
    let answer = result?;

    let duration = start_time.elapsed().as_secs_f64();
    info!(
        "Research complete in {:.1}s with {} citations",
        duration,
        answer.citations.len()
    );

    let metadata = RunMetadata {
        question,
        model: model_name,
        search_provider: search_name,
        duration_seconds: duration,
        completed_at: Utc::now(),
    };

    let rendered = match args.format {
        OutputFormat::Json => output::render_json(&answer)?,
        OutputFormat::Text => output::render_text(&answer, &metadata),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write result to {}", path.display()))?;
            if !args.quiet {
                eprintln!("✅ Answer saved to: {}", path.display());
            }
        }
        None => {
            println!("{}", rendered);
        }
    }

    Ok(())
}

/// Create the phase spinner; hidden in quiet mode.
fn make_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .expect("valid spinner template"),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .sleuth.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

//! Stratus CLI — entry point.
//!
//! # Commands
//!
//! - `stratus chat [--profile P] [-m MESSAGE]` — chat with one agent profile
//!   (single-shot or REPL)
//! - `stratus compare [-q QUERY] [-o FILE]` — run every profile on one query
//!   and record ratings
//! - `stratus onboard` — write a default config file
//! - `stratus status` — show configuration status

mod compare;
mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use stratus_agent::{builtin_registry, AgentProfile, DialogueLoop, ProfileKind, ResultsLog};
use stratus_core::config::{load_config, Config};
use stratus_core::types::Conversation;
use stratus_providers::HttpGateway;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Stratus — weather assistant comparing prompting strategies
#[derive(Parser)]
#[command(name = "stratus", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with one agent profile (single-shot or interactive REPL)
    Chat {
        /// Agent profile: basic, cot or react
        #[arg(short, long, default_value = "basic")]
        profile: String,

        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run one query through every profile and rate the answers
    Compare {
        /// Query to evaluate. Prompted for when omitted.
        #[arg(short, long)]
        query: Option<String>,

        /// CSV file to append ratings to (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            profile,
            message,
            logs,
        } => {
            init_logging(logs);
            run_chat(&profile, message).await
        }
        Commands::Compare {
            query,
            output,
            logs,
        } => {
            init_logging(logs);
            run_compare(query, output).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(profile_name: &str, message: Option<String>) -> Result<()> {
    let config = load_config(None);
    let kind = helpers::resolve_profile(profile_name);
    let dialogue = build_dialogue(&config)?;
    let profile = AgentProfile::build(kind, &builtin_registry(&config)?)?;

    match message {
        Some(msg) => {
            info!(profile = profile.name(), "processing single message");
            let mut conversation = Conversation::new(profile.system_prompt());
            let outcome = dialogue
                .send(&mut conversation, &profile, &msg)
                .await
                .context("exchange failed")?;
            helpers::print_response(profile.name(), outcome.answer.as_deref());
        }
        None => repl::run(&dialogue, &profile).await?,
    }

    Ok(())
}

// ─────────────────────────────────────────────
// Compare command
// ─────────────────────────────────────────────

async fn run_compare(query: Option<String>, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(None);
    let dialogue = build_dialogue(&config)?;
    let registry = builtin_registry(&config)?;
    let profiles = ProfileKind::ALL
        .iter()
        .map(|&kind| AgentProfile::build(kind, &registry))
        .collect::<Result<Vec<_>, _>>()?;

    let log = match output {
        Some(path) => ResultsLog::new(path),
        None => ResultsLog::from_config(&config),
    };

    compare::run(&dialogue, &profiles, query, &log).await
}

/// Build a `DialogueLoop` over the configured completion service.
fn build_dialogue(config: &Config) -> Result<DialogueLoop> {
    if !config.provider.is_configured() {
        warn!("no API key configured for the completion service (set API_KEY)");
    }
    if !config.weather.is_configured() {
        warn!("no weather API key configured (set WEATHER_API_KEY)");
    }

    let gateway =
        HttpGateway::new(&config.provider).context("failed to create completion gateway")?;
    Ok(DialogueLoop::from_config(Arc::new(gateway), config))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("stratus=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_defaults_to_basic() {
        let cli = Cli::parse_from(["stratus", "chat"]);
        match cli.command {
            Commands::Chat {
                profile, message, ..
            } => {
                assert_eq!(profile, "basic");
                assert!(message.is_none());
            }
            _ => panic!("expected chat"),
        }
    }

    #[test]
    fn compare_accepts_query_and_output() {
        let cli = Cli::parse_from(["stratus", "compare", "-q", "Rain in Oslo?", "-o", "out.csv"]);
        match cli.command {
            Commands::Compare { query, output, .. } => {
                assert_eq!(query.as_deref(), Some("Rain in Oslo?"));
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn build_dialogue_without_keys() {
        let dialogue = build_dialogue(&Config::default()).unwrap();
        assert_eq!(dialogue.model(), "gpt-4o-mini");
    }
}

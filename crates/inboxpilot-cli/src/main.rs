//! CLI entry point for Inboxpilot.
//!
//! This binary provides the `inboxpilot` command with subcommands for
//! running the interactive assistant and checking collaborator status.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use inboxpilot_agent::{LlmClient, LlmClientConfig, TextGenerator};
use inboxpilot_mailbox::{Mailbox, MailboxClient};
use inboxpilot_tools::{InboxAssistant, ToolSurface};

mod config;
mod repl;

use config::Config;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Inboxpilot — an email assistant with a confirmation-gated reply flow.
#[derive(Parser)]
#[command(
    name = "inboxpilot",
    version,
    about = "Inboxpilot — list, search, summarize, and reply to email",
    long_about = "An email assistant that lists, searches, and summarizes your inbox and \
                  drafts replies, sending only after you explicitly confirm."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "inboxpilot.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive assistant REPL.
    Run,

    /// Show which collaborators are configured and reachable.
    Status,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so config can reference variables defined there.
    let _ = dotenvy::dotenv();
    init_tracing("info");

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Run => repl::cmd_run(&config).await,
        Commands::Status => cmd_status(&config).await,
    }
}

/// Initialize the tracing subscriber, honoring `RUST_LOG`.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// Collaborator construction
// ---------------------------------------------------------------------------

/// Build the mailbox client from configuration, if a token is present.
pub fn build_mailbox(config: &Config) -> Option<Arc<dyn Mailbox>> {
    let token = match std::env::var(&config.mailbox.token_env) {
        Ok(token) if !token.is_empty() => token,
        _ => {
            warn!(
                env = %config.mailbox.token_env,
                "mailbox access token not set; mailbox operations unavailable"
            );
            return None;
        }
    };

    let client = match &config.mailbox.base_url {
        Some(base_url) => MailboxClient::with_base_url(token, base_url),
        None => MailboxClient::new(token),
    };

    match client {
        Ok(client) => {
            info!("mailbox client ready");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "failed to build mailbox client");
            None
        }
    }
}

/// Build the generation backend from configuration, if an API key is present.
pub fn build_generator(config: &Config) -> Option<Arc<dyn TextGenerator>> {
    let api_key_env = config.llm.api_key_env();
    let api_key = match std::env::var(api_key_env) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            warn!(env = %api_key_env, "LLM api key not set; generation unavailable");
            return None;
        }
    };

    let llm_config = match (config.llm.provider.as_str(), &config.llm.base_url) {
        ("openai", Some(base_url)) => {
            LlmClientConfig::openai_compatible(api_key, &config.llm.model, base_url)
        }
        ("openai", None) => LlmClientConfig::openai(api_key, &config.llm.model),
        (_, _) => LlmClientConfig::anthropic(api_key, &config.llm.model),
    };

    match LlmClient::new(llm_config) {
        Ok(client) => {
            info!(model = %config.llm.model, provider = %config.llm.provider, "LLM client ready");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "failed to build LLM client");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

async fn cmd_status(config: &Config) -> Result<()> {
    let mailbox = build_mailbox(config);
    let generator = build_generator(config);

    let assistant = InboxAssistant::new("inboxpilot", mailbox, generator);
    let health = assistant.health_check().await;

    println!("Inboxpilot status: {health}");
    println!(
        "  mailbox token env:  {} ({})",
        config.mailbox.token_env,
        presence(&config.mailbox.token_env)
    );
    println!(
        "  llm api key env:    {} ({})",
        config.llm.api_key_env(),
        presence(config.llm.api_key_env())
    );
    println!("  llm provider/model: {}/{}", config.llm.provider, config.llm.model);
    println!("  tools exposed:      {}", assistant.tools().len());

    Ok(())
}

fn presence(env: &str) -> &'static str {
    match std::env::var(env) {
        Ok(v) if !v.is_empty() => "set",
        _ => "missing",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

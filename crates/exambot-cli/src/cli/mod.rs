//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use exambot::config;

mod commands;

#[derive(Parser)]
#[command(name = "exambot")]
#[command(version)]
#[command(about = "Telegram bot that answers exam questions from text or photos")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the webhook HTTP server
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long, value_name = "ADDR", env = "EXAMBOT_BIND")]
        bind: Option<String>,
    },
    /// Handle one API gateway event and print the gateway response
    Invoke {
        /// Event JSON file (reads stdin when omitted)
        #[arg(long, value_name = "FILE")]
        event: Option<PathBuf>,
    },
    /// Manage the Telegram webhook registration
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum WebhookCommands {
    /// Point Telegram at URL and publish the command menu
    Set {
        /// Public HTTPS URL of the webhook
        #[arg(value_name = "URL")]
        url: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    crate::logging::init();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { bind } => commands::serve::run(load_config()?, bind).await,
        Commands::Invoke { event } => commands::invoke::run(&load_config()?, event.as_deref()).await,
        Commands::Webhook { command } => match command {
            WebhookCommands::Set { url } => commands::webhook::set(&load_config()?, &url).await,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        },
    }
}

fn load_config() -> Result<config::Config> {
    config::Config::load().context("load config")
}

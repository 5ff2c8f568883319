// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Dexter CLI
//!
//! The `dexter` binary hosts the assistant.
//!
//! ## Commands
//!
//! - `dexter serve` - Run the HTTP API until Ctrl+C / SIGTERM
//! - `dexter chat` - Interactive session against a running server
//! - `dexter ask <QUERY>` - One query through the clarification workflow, in-process
//! - `dexter config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use dexter_cli::commands::{self, ConfigCommand};
use dexter_cli::daemon;
use dexter_core::domain::config::DexterConfig;

/// Dexter - a personal assistant that asks before it answers
#[derive(Parser)]
#[command(name = "dexter")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "DEXTER_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// HTTP API port (default: server.port from config, else 8000)
    #[arg(long, global = true, env = "DEXTER_PORT")]
    port: Option<u16>,

    /// HTTP API host (default: server.host from config, else 127.0.0.1)
    #[arg(long, global = true, env = "DEXTER_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DEXTER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    #[command(name = "serve")]
    Serve,

    /// Chat with a running server
    #[command(name = "chat")]
    Chat {
        /// Reuse an existing conversation session
        #[arg(long)]
        session: Option<String>,
    },

    /// Ask one question in-process
    #[command(name = "ask")]
    Ask {
        /// The request for Dexter
        query: String,

        /// Answer without asking clarifying questions first
        #[arg(long)]
        skip_clarifications: bool,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Some(Commands::Serve) => {
            info!("Starting Dexter server");
            daemon::start_server(cli.config, cli.host, cli.port).await
        }
        Some(Commands::Chat { session }) => {
            let server = DexterConfig::load_or_default(cli.config)
                .map(|config| config.server)
                .unwrap_or_default();
            let host = cli.host.unwrap_or(server.host);
            let port = cli.port.unwrap_or(server.port);
            commands::chat::handle_command(&host, port, session).await
        }
        Some(Commands::Ask {
            query,
            skip_clarifications,
        }) => commands::ask::handle_command(query, skip_clarifications, cli.config).await,
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}

// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use dexter_core::domain::config::{DexterConfig, ProviderConfig};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a configuration file with every default filled in
    Generate {
        /// Output path (default: ./dexter-config.yaml)
        #[arg(short, long, default_value = "./dexter-config.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, force } => generate(&output, force).await,
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = DexterConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. DEXTER_CONFIG_PATH: {}",
            std::env::var("DEXTER_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./dexter-config.yaml");
        println!("  4. ~/.dexter/config.yaml");
        println!("  5. /etc/dexter/config.yaml");
        println!();
    }

    if as_yaml {
        let yaml = serde_yaml::to_string(&config).context("Failed to render configuration")?;
        print!("{}", yaml);
        return Ok(());
    }

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Memory:".bold());
    println!("  Short-term limit: {}", config.memory.short_term_limit);
    println!("  Context limit: {}", config.memory.context_limit);
    println!(
        "  Long-term: {:?} ({})",
        config.memory.long_term.backend,
        config.memory.long_term.database_path.display()
    );
    println!(
        "  Learner: dimension {}, learning rate {}",
        config.memory.learner.dimension, config.memory.learner.learning_rate
    );
    if config.memory.learner.ephemeral {
        println!("  Weights: {}", "(not persisted)".dimmed());
    } else {
        println!("  Weights: {}", config.memory.learner.weights_path.display());
    }
    println!();

    println!("{}", "Autonomy:".bold());
    println!("  Minimum questions: {}", config.autonomy.minimum_questions);
    println!(
        "  Question generator: {:?}",
        config.autonomy.question_generator
    );
    println!();

    println!("{}", "Language models:".bold());
    print_provider("dexter", &config.llm.dexter);
    print_provider("partner", &config.llm.partner);
    println!();

    println!("{}", "Server:".bold());
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!(
        "  Conversations: {}",
        config.conversations.database_path.display()
    );
    println!();

    Ok(())
}

fn print_provider(role: &str, provider: &ProviderConfig) {
    let state = if provider.enabled {
        "enabled".green()
    } else {
        "disabled".dimmed()
    };
    println!("  {} ({}, {})", role.bold(), provider.provider, state);
    if provider.provider != "echo" {
        println!("    Endpoint: {}", provider.endpoint);
        println!("    Model: {}", provider.model);
    }
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = DexterConfig::load_or_default(config_path)
        .context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    DexterConfig::default()
        .to_yaml_file(output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

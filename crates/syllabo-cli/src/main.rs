//! Syllabo CLI
//!
//! Analyze course syllabi and generate teaching materials.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use syllabo_core::error::exit_codes;
use syllabo_core::{Config, Pipeline, SyllaboError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands, ConfigAction};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = if is_config_init(&cli.command) {
        Config::default()
    } else {
        load_config(cli.config.as_deref())?
    };

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, config, cli.json).await,
        Commands::Generate(args) => commands::generate::run(args, &config, cli.json).await,
        Commands::Bundle(args) => commands::bundle::run(args, &config, cli.json).await,
        Commands::Encode(args) => commands::encode::run(args, &config, cli.json),
        Commands::Types => commands::types::run(cli.json),
        Commands::Config(args) => commands::config::run(args, &config, cli.config.as_deref(), cli.json),
        Commands::Mcp => {
            let pipeline = Pipeline::from_config(&config)?;
            syllabo_mcp::start_server(&pipeline).await
        }
    }
}

/// An explicit config path must exist; the default location may be absent
fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(path) => {
            return Err(SyllaboError::InvalidInput(format!(
                "Config file not found: {} (run `syllabo config init` to create it)",
                path.display()
            ))
            .into())
        }
        None => Config::load()?,
    };
    Ok(config)
}

fn is_config_init(command: &Commands) -> bool {
    matches!(command, Commands::Config(args) if matches!(args.action, ConfigAction::Init { .. }))
}

/// Exit code of the first `SyllaboError` in the chain
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<SyllaboError>())
        .map(SyllaboError::exit_code)
        .unwrap_or(exit_codes::GENERAL_ERROR)
}

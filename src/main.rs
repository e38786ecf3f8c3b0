// ABOUTME: Entry point for the iics-promote CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use iics_promote::config::{Config, UAT_DESTINATION};
use iics_promote::error::Result;
use iics_promote::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn,iics_promote=info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let config = load_config(&cli)?;
    let output = Output::new(mode);

    match cli.command {
        Commands::Login { target } => commands::login(&config, target, output).await,
        Commands::Pull { commit, object } => {
            commands::pull(&config, &commit, object.as_deref(), output).await
        }
        Commands::Test {
            commit,
            object_type,
        } => commands::test(&config, &commit, object_type.as_deref(), output).await,
        Commands::Deploy {
            commit,
            object_type,
        } => commands::deploy(&config, &commit, object_type.as_deref(), output).await,
        Commands::Rollback {
            path,
            name,
            object_type,
        } => commands::rollback(&config, &path, &name, &object_type, output).await,
        Commands::Objects {
            commit,
            object_type,
        } => commands::objects(&config, &commit, object_type.as_deref(), output).await,
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_env(&env::current_dir()?)?,
    };

    let destination = cli
        .destination
        .as_deref()
        .or_else(|| default_destination(cli, &config));
    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}

/// Rollbacks restore the promoted org, so they target `uat` unless told otherwise.
fn default_destination(cli: &Cli, config: &Config) -> Option<&'static str> {
    match cli.command {
        Commands::Rollback { .. } if config.destinations.contains_key(UAT_DESTINATION) => {
            Some(UAT_DESTINATION)
        }
        _ => None,
    }
}

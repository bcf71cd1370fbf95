//! Numbridge CLI - Command-line interface for the phone-number vendor
//!
//! Provides commands for:
//! - Listing rented numbers
//! - Buying numbers in rate-limited batches
//! - Reading the latest SMS (verification codes) of a number
//! - Inspecting configuration

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use numbridge_core::config::{Config, TOKEN_ENV_VAR};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    config::ConfigCommand, numbers::NumbersCommand, purchase::PurchaseCommand, sms::SmsCommand,
    CommandContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "numbridge",
    version,
    about = "Rate-limited client for the phone-number vendor API"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all rented numbers
    Numbers(NumbersCommand),
    /// Buy numbers one at a time
    Purchase(PurchaseCommand),
    /// Show the latest SMS of a number
    Sms(SmsCommand),
    /// View and check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Loads the configuration and returns it with the path it came from.
///
/// A file named with `--config` must exist and parse; the default location
/// falls back to built-in defaults.
fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = Config::load(path).context("Cannot use the file given with --config")?;
            Ok((config, path.to_path_buf()))
        }
        None => {
            let path = Config::default_path();
            Ok((Config::load_or_default(&path), path))
        }
    }
}

/// Cancels `token` on Ctrl+C so a running batch stops between purchases.
async fn shutdown_signal(token: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }
    info!("Received Ctrl+C, stopping after the current request");
    token.cancel();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let (config, config_path) = match load_config(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            output::report_error(format, &e);
            std::process::exit(1);
        }
    };
    let config = config.with_token_override(std::env::var(TOKEN_ENV_VAR).ok());

    // Setup tracing; RUST_LOG wins over -v and logging.level
    let filter = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    let ctx = CommandContext::new(config, config_path, cancel);

    let result = match &cli.command {
        Commands::Numbers(cmd) => cmd.execute(&ctx, format).await,
        Commands::Purchase(cmd) => cmd.execute(&ctx, format).await,
        Commands::Sms(cmd) => cmd.execute(&ctx, format).await,
        Commands::Config(cmd) => cmd.execute(&ctx, format).await,
    };

    if let Err(e) = result {
        output::report_error(format, &e);
        std::process::exit(1);
    }
    Ok(())
}

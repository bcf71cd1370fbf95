//! Config command - View and check Numbridge configuration
//!
//! Provides the `numbridge config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON, token redacted)
//! 2. Validates the configuration file and reports errors
//! 3. Prints the configuration file path

use anyhow::{Context, Result};
use clap::Subcommand;
use numbridge_core::config::Config;
use serde_json::json;
use tracing::info;

use super::CommandContext;
use crate::output::{get_formatter, OutputFormat, Reported};

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Print the configuration file path
    Path,
}

impl ConfigCommand {
    pub async fn execute(&self, ctx: &CommandContext, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => execute_show(ctx, format),
            ConfigCommand::Validate => execute_validate(ctx, format),
            ConfigCommand::Path => {
                let formatter = get_formatter(format);
                if format.is_json() {
                    formatter.print_json(&json!({
                        "config_path": ctx.config_path.display().to_string(),
                        "exists": ctx.config_path.exists(),
                    }));
                } else {
                    println!("{}", ctx.config_path.display());
                }
                Ok(())
            }
        }
    }
}

/// Copy of `config` safe to print.
fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.api.token.is_some() {
        config.api.token = Some("********".to_string());
    }
    config
}

fn execute_show(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let config = redacted(&ctx.config);

    info!(config_path = %ctx.config_path.display(), "Showing configuration");

    if format.is_json() {
        let json =
            serde_json::to_value(&config).context("Failed to serialize configuration to JSON")?;
        formatter.print_json(&json);
        return Ok(());
    }

    formatter.success(&format!("Configuration ({})", ctx.config_path.display()));
    if !ctx.config_path.exists() {
        formatter.info("File not found, showing defaults");
    }
    formatter.info("");
    let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration to YAML")?;
    for line in yaml.lines() {
        formatter.info(line);
    }
    Ok(())
}

fn execute_validate(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let path = &ctx.config_path;

    if !path.exists() {
        if format.is_json() {
            formatter.print_json(&json!({
                "valid": true,
                "config_path": path.display().to_string(),
                "errors": [],
                "note": "Configuration file not found. Using defaults.",
            }));
        } else {
            formatter.info(&format!("Configuration file not found at {}", path.display()));
            formatter.info("Using default configuration.");
        }
        return Ok(());
    }

    let errors: Vec<String> = match Config::load(path) {
        Ok(config) => config.validate().iter().map(|e| e.to_string()).collect(),
        Err(e) => vec![format!("{e:#}")],
    };

    info!(config_path = %path.display(), errors = errors.len(), "Validated configuration");

    if format.is_json() {
        formatter.print_json(&json!({
            "valid": errors.is_empty(),
            "config_path": path.display().to_string(),
            "errors": errors,
        }));
    } else if errors.is_empty() {
        formatter.success("Configuration is valid");
        formatter.info(&format!("File: {}", path.display()));
    } else {
        formatter.error(&format!(
            "Configuration has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        formatter.info(&format!("File: {}", path.display()));
        for error in &errors {
            formatter.info(&format!("  {}", error));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(Reported("Invalid configuration".to_string()).into())
    }
}

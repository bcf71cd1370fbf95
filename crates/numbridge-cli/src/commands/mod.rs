//! CLI subcommands
//!
//! Every command receives a [`CommandContext`] with the loaded configuration
//! and the Ctrl+C cancellation token.

pub mod config;
pub mod numbers;
pub mod purchase;
pub mod sms;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use numbridge_core::{
    config::{Config, TOKEN_ENV_VAR},
    ports::NumberProvider,
};
use numbridge_vendor::{client::VendorClient, provider::VendorNumberProvider};
use tokio_util::sync::CancellationToken;

/// Shared state handed to each command
pub struct CommandContext {
    pub config: Config,
    pub config_path: PathBuf,
    pub cancel: CancellationToken,
}

impl CommandContext {
    pub fn new(config: Config, config_path: PathBuf, cancel: CancellationToken) -> Self {
        Self {
            config,
            config_path,
            cancel,
        }
    }

    /// Builds the vendor-backed provider from the configuration.
    ///
    /// Fails when the configuration does not validate.
    pub fn provider(&self) -> Result<Arc<dyn NumberProvider>> {
        self.config
            .ensure_valid()
            .with_context(|| format!("Check {}", self.config_path.display()))?;
        let client = VendorClient::from_config(&self.config).with_context(|| {
            format!(
                "Set {} or api.token in {}",
                TOKEN_ENV_VAR,
                self.config_path.display()
            )
        })?;
        Ok(Arc::new(VendorNumberProvider::new(client)))
    }
}

/// `2026-03-14T09:30:00Z` → `2026-03-14 09:30`; unparseable values pass through.
pub(crate) fn display_time(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => chrono::DateTime::parse_from_rfc3339(raw)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => "N/A".to_string(),
    }
}

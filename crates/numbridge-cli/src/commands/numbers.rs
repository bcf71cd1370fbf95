//! Numbers command - List every rented number
//!
//! Provides the `numbridge numbers` CLI command which walks the vendor
//! listing page by page and prints each number with its status and expiry.

use anyhow::{Context, Result};
use clap::Args;
use numbridge_core::domain::PhoneNumber;
use numbridge_vendor::Outcome;
use serde_json::json;
use tracing::info;

use super::{display_time, CommandContext};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct NumbersCommand {
    /// Only show active numbers
    #[arg(long)]
    pub active: bool,
}

impl NumbersCommand {
    pub async fn execute(&self, ctx: &CommandContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let provider = ctx.provider()?;

        let list = provider
            .list_numbers()
            .await
            .context("Failed to list numbers")?;

        let shown: Vec<&PhoneNumber> = list
            .numbers
            .iter()
            .filter(|n| !self.active || n.is_active())
            .collect();

        info!(total = list.pagination.total, shown = shown.len(), "Listed numbers");

        if format.is_json() {
            let outcome = Outcome::success(json!({
                "numbers": shown,
                "pagination": list.pagination,
            }));
            formatter.print_json(&serde_json::to_value(outcome)?);
            return Ok(());
        }

        if shown.is_empty() {
            formatter.info("No numbers found");
            return Ok(());
        }

        formatter.success(&format!(
            "{} number{} (vendor total {})",
            shown.len(),
            if shown.len() == 1 { "" } else { "s" },
            list.pagination.total
        ));
        for (i, number) in shown.iter().enumerate() {
            print_number(&*formatter, i + 1, number);
        }
        Ok(())
    }
}

pub(crate) fn print_number(formatter: &dyn OutputFormatter, index: usize, number: &PhoneNumber) {
    formatter.info("");
    formatter.info(&format!(
        "#{} {} [{}]",
        index,
        number.phone_number,
        number.status.as_deref().unwrap_or("unknown")
    ));
    formatter.info(&format!("  ID:      {}", number.piv_num_id));
    formatter.info(&format!(
        "  Expires: {}",
        display_time(number.expires_at.as_deref())
    ));
    if let Some(name) = number.custom_name.as_deref().filter(|n| !n.is_empty()) {
        formatter.info(&format!("  Name:    {}", name));
    }
}

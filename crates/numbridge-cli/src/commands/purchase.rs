//! Purchase command - Buy several numbers in one batch
//!
//! Provides the `numbridge purchase <QUANTITY>` CLI command which:
//! 1. Buys numbers one at a time with the configured delay between them
//! 2. Reports progress after each purchase
//! 3. Stops between purchases on Ctrl+C, keeping what was already bought
//! 4. Lists purchased numbers and a truncated list of per-item errors

use anyhow::Result;
use clap::Args;
use numbridge_core::{
    config::PurchaseConfig,
    usecases::{BatchReport, PurchaseBatchUseCase},
};
use serde_json::json;

use super::{numbers::print_number, CommandContext};
use crate::output::{get_formatter, OutputFormat, OutputFormatter, Reported};

/// Errors listed when at least one number was bought
const ERRORS_SHOWN_ON_PARTIAL: usize = 5;
/// Errors listed when nothing was bought
const ERRORS_SHOWN_ON_FAILURE: usize = 10;

#[derive(Debug, Args)]
pub struct PurchaseCommand {
    /// How many numbers to buy
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub quantity: u32,

    /// Country code (defaults to purchase.country_code)
    #[arg(long)]
    pub country: Option<String>,

    /// Rental period in months (defaults to purchase.duration_months)
    #[arg(long)]
    pub months: Option<u32>,

    /// Turn on auto-renewal for the purchased numbers
    #[arg(long)]
    pub auto_renew: bool,
}

impl PurchaseCommand {
    /// Purchase settings from the config file with command-line overrides
    fn settings(&self, defaults: &PurchaseConfig) -> PurchaseConfig {
        let mut settings = defaults.clone();
        if let Some(country) = &self.country {
            settings.country_code = country.to_uppercase();
        }
        if let Some(months) = self.months {
            settings.duration_months = months;
        }
        settings.auto_renew |= self.auto_renew;
        settings
    }

    pub async fn execute(&self, ctx: &CommandContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let settings = self.settings(&ctx.config.purchase);
        let uc = PurchaseBatchUseCase::new(ctx.provider()?, settings.clone());

        let estimate = settings.request_delay() * self.quantity.saturating_sub(1);
        formatter.info(&format!(
            "Buying {} number{} in {} for {} month{} (about {} s)",
            self.quantity,
            plural(self.quantity as usize),
            settings.country_code,
            settings.duration_months,
            plural(settings.duration_months as usize),
            estimate.as_secs()
        ));

        let report = uc
            .execute(self.quantity, &ctx.cancel, |p| {
                formatter.progress(&format!(
                    "Purchased {}/{} ({} failed)",
                    p.purchased, p.requested, p.failed
                ));
            })
            .await?;

        if format.is_json() {
            formatter.print_json(&json!({
                "success": !report.is_total_failure(),
                "data": report,
            }));
        } else {
            print_report(&*formatter, &report);
        }

        if report.is_total_failure() {
            return Err(Reported("No numbers were purchased".to_string()).into());
        }
        Ok(())
    }
}

fn print_report(formatter: &dyn OutputFormatter, report: &BatchReport) {
    if report.cancelled {
        formatter.warn(&format!(
            "Cancelled after {} of {} purchases",
            report.purchased.len() + report.errors.len(),
            report.requested
        ));
    }

    let limit = if report.is_total_failure() {
        formatter.error(&format!(
            "No numbers were purchased ({} error{})",
            report.errors.len(),
            plural(report.errors.len())
        ));
        ERRORS_SHOWN_ON_FAILURE
    } else {
        formatter.success(&format!(
            "Purchased {}/{} numbers, total cost {:.2}",
            report.purchased.len(),
            report.requested,
            report.total_cost
        ));
        for (i, number) in report.purchased.iter().enumerate() {
            print_number(formatter, i + 1, number);
        }
        ERRORS_SHOWN_ON_PARTIAL
    };

    if report.errors.is_empty() {
        return;
    }
    let (shown, omitted) = report.error_summary(limit);
    formatter.warn(&format!("Errors ({}):", report.errors.len()));
    for error in shown {
        formatter.info(&format!("- {}", error));
    }
    if omitted > 0 {
        formatter.info(&format!("...and {} more", omitted));
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

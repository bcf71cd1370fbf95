//! SMS command - Show the latest messages of a number
//!
//! Provides the `numbridge sms <QUERY>` CLI command which resolves a number
//! by phone or custom name and prints its most recent SMS, highlighting
//! verification codes.

use anyhow::Result;
use clap::Args;
use numbridge_core::usecases::{ReadSmsUseCase, MAX_SMS_COUNT};
use numbridge_vendor::Outcome;

use super::{display_time, CommandContext};
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct SmsCommand {
    /// Phone number (spaces and dashes ignored) or custom name
    pub query: String,

    /// How many recent messages to show
    #[arg(short = 'n', long, default_value_t = 5)]
    pub count: usize,
}

impl SmsCommand {
    pub async fn execute(&self, ctx: &CommandContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let uc = ReadSmsUseCase::new(ctx.provider()?);

        let report = uc.execute(&self.query, self.count).await?;

        if format.is_json() {
            formatter.print_json(&serde_json::to_value(Outcome::success(&report))?);
            return Ok(());
        }

        formatter.success(&format!(
            "{} ({})",
            report.number.phone_number,
            report.number.custom_name.as_deref().unwrap_or("-")
        ));
        formatter.info(&format!(
            "Country: {}",
            report.number.country_code.as_deref().unwrap_or("-")
        ));

        if report.messages.is_empty() {
            formatter.info("No messages yet");
            return Ok(());
        }

        for (i, sms) in report.messages.iter().enumerate() {
            formatter.info("");
            formatter.info(&format!(
                "#{} from {} at {}",
                i + 1,
                sms.from_number.as_deref().unwrap_or("unknown"),
                display_time(sms.received_at.as_deref())
            ));
            if let Some(code) = sms.verification_code.as_deref() {
                formatter.info(&format!("  CODE: {}", code));
            }
            formatter.info(&format!("  {}", sms.message_body));
        }

        if report.total > report.messages.len() as u64 {
            formatter.info("");
            formatter.info(&format!(
                "Showing {} of {} messages (at most {})",
                report.messages.len(),
                report.total,
                MAX_SMS_COUNT
            ));
        }
        Ok(())
    }
}

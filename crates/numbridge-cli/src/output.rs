//! Human and JSON output formatting for CLI commands

use std::fmt;

use numbridge_core::domain::DomainError;
use numbridge_vendor::{ApiError, Outcome};
use serde_json::{json, Value};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    /// Transient status line (batch progress)
    fn progress(&self, message: &str);
    fn print_json(&self, value: &Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn progress(&self, message: &str) {
        eprintln!("\u{2026} {}", message);
    }
    fn print_json(&self, _value: &Value) {}
}

/// JSON output formatter
///
/// Only `print_json` writes to stdout so that it carries exactly one document.
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, _message: &str) {}
    fn error(&self, message: &str) {
        eprintln!("{}", json!({"level": "error", "message": message}));
    }
    fn warn(&self, message: &str) {
        eprintln!("{}", json!({"level": "warning", "message": message}));
    }
    fn info(&self, _message: &str) {}
    fn progress(&self, _message: &str) {}
    fn print_json(&self, value: &Value) {
        println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
    }
}

pub fn get_formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Human => Box::new(HumanFormatter),
    }
}

/// Marks an error whose details were already written by the command.
#[derive(Debug)]
pub struct Reported(pub String);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Reported {}

/// Failure envelope for `err`, `{"success": false, "error", "detail"}`.
///
/// Vendor errors keep their kind (`rate_limited`, `http_403`, ...); input
/// errors become `invalid_input`; anything else is `error`.
pub fn failure_json(err: &anyhow::Error) -> Value {
    if let Some(api) = err.chain().find_map(|e| e.downcast_ref::<ApiError>()) {
        return serde_json::to_value(Outcome::<()>::failure(api)).unwrap_or(Value::Null);
    }

    let kind = if err.chain().any(|e| e.is::<DomainError>()) {
        "invalid_input"
    } else {
        "error"
    };
    json!({
        "success": false,
        "error": kind,
        "detail": format!("{err:#}"),
    })
}

/// Prints a command failure in the selected format.
pub fn report_error(format: OutputFormat, err: &anyhow::Error) {
    if err.is::<Reported>() {
        return;
    }
    let formatter = get_formatter(format);
    if format.is_json() {
        formatter.print_json(&failure_json(err));
    } else {
        formatter.error(&format!("{err:#}"));
    }
}

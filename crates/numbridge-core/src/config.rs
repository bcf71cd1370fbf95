//! Configuration module for Numbridge.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api.token`.
pub const TOKEN_ENV_VAR: &str = "NUMBRIDGE_API_TOKEN";

/// Default vendor API root.
pub const DEFAULT_BASE_URL: &str = "https://luboydomen.info/api/ggl";

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Numbridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub rate_limiting: RateLimitingConfig,
    pub purchase: PurchaseConfig,
    pub logging: LoggingConfig,
}

/// Vendor API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root, e.g. `https://luboydomen.info/api/ggl`.
    pub base_url: String,
    /// API token sent as `Authorization: Token <value>`.
    pub token: Option<String>,
    /// Per-request transport timeout in seconds.
    pub timeout_secs: u64,
}

/// Client-side throttling and retry policy.
///
/// Defaults follow the vendor's published limits: 10 requests/minute per IP
/// and 20 per token, so one request every 6 seconds per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitingConfig {
    /// Minimum spacing between any two requests to the same endpoint.
    pub endpoint_interval_secs: f64,
    /// Minimum spacing between byte-for-byte identical requests.
    pub identical_interval_secs: f64,
    /// First retry delay when the server gives no hint.
    pub base_backoff_secs: f64,
    /// Upper bound for any retry delay.
    pub max_backoff_secs: f64,
    /// Retries after the first attempt before giving up.
    pub max_retries: u32,
    /// `limit` used when paging through the number listing.
    pub page_size: u32,
}

/// Fixed parameters for number purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseConfig {
    /// ISO 3166 alpha-2 country code.
    pub country_code: String,
    pub duration_months: u32,
    pub auto_renew: bool,
    /// Seconds to wait between consecutive purchases in a batch.
    pub request_delay_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/numbridge/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("numbridge")
            .join("config.yaml")
    }

    /// Replace `api.token` with `token` when one is given.
    ///
    /// Callers pass the value of [`TOKEN_ENV_VAR`] so the environment wins
    /// over the file.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.api.token = Some(token);
        }
        self
    }
}

impl RateLimitingConfig {
    pub fn endpoint_interval(&self) -> Duration {
        seconds(self.endpoint_interval_secs)
    }

    pub fn identical_interval(&self) -> Duration {
        seconds(self.identical_interval_secs)
    }

    pub fn base_backoff(&self) -> Duration {
        seconds(self.base_backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        seconds(self.max_backoff_secs)
    }
}

/// Converts a seconds value to a `Duration`, mapping negative or
/// non-finite values to zero.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl PurchaseConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        Self {
            endpoint_interval_secs: 6.0,
            identical_interval_secs: 1.0,
            base_backoff_secs: 1.0,
            max_backoff_secs: 60.0,
            max_retries: 6,
            page_size: 100,
        }
    }
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            country_code: "GB".to_string(),
            duration_months: 1,
            auto_renew: false,
            request_delay_secs: 6,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"rate_limiting.page_size"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

fn push_if(errors: &mut Vec<ValidationError>, failed: bool, field: &str, message: &str) {
    if failed {
        errors.push(ValidationError {
            field: field.into(),
            message: message.into(),
        });
    }
}

fn is_non_negative_seconds(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- api ---
        push_if(
            &mut errors,
            !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")),
            "api.base_url",
            "must start with http:// or https://",
        );
        push_if(
            &mut errors,
            self.api.timeout_secs == 0,
            "api.timeout_secs",
            "must be greater than 0",
        );

        // --- rate_limiting ---
        let rl = &self.rate_limiting;
        push_if(
            &mut errors,
            !is_non_negative_seconds(rl.endpoint_interval_secs),
            "rate_limiting.endpoint_interval_secs",
            "must be a finite number of seconds >= 0",
        );
        push_if(
            &mut errors,
            !is_non_negative_seconds(rl.identical_interval_secs),
            "rate_limiting.identical_interval_secs",
            "must be a finite number of seconds >= 0",
        );
        push_if(
            &mut errors,
            !(rl.base_backoff_secs.is_finite() && rl.base_backoff_secs > 0.0),
            "rate_limiting.base_backoff_secs",
            "must be greater than 0",
        );
        if !rl.max_backoff_secs.is_finite() || rl.max_backoff_secs < rl.base_backoff_secs {
            errors.push(ValidationError {
                field: "rate_limiting.max_backoff_secs".into(),
                message: format!(
                    "max_backoff_secs ({}) must not be less than base_backoff_secs ({})",
                    rl.max_backoff_secs, rl.base_backoff_secs
                ),
            });
        }
        push_if(
            &mut errors,
            rl.page_size == 0,
            "rate_limiting.page_size",
            "must be greater than 0",
        );

        // --- purchase ---
        let cc = &self.purchase.country_code;
        push_if(
            &mut errors,
            !(cc.len() == 2 && cc.chars().all(|c| c.is_ascii_uppercase())),
            "purchase.country_code",
            "must be a two-letter uppercase country code",
        );
        push_if(
            &mut errors,
            self.purchase.duration_months == 0,
            "purchase.duration_months",
            "must be greater than 0",
        );

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }

    /// Like [`validate`](Self::validate), failing with every problem joined
    /// into one message.
    pub fn ensure_valid(&self) -> anyhow::Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        anyhow::bail!("Invalid configuration: {joined}")
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use numbridge_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .api_token("secret")
///     .rate_limiting_endpoint_interval_secs(10.0)
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- api ---

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api.base_url = url.into();
        self
    }

    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.config.api.token = Some(token.into());
        self
    }

    pub fn api_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.api.timeout_secs = seconds;
        self
    }

    // --- rate_limiting ---

    pub fn rate_limiting_endpoint_interval_secs(mut self, seconds: f64) -> Self {
        self.config.rate_limiting.endpoint_interval_secs = seconds;
        self
    }

    pub fn rate_limiting_identical_interval_secs(mut self, seconds: f64) -> Self {
        self.config.rate_limiting.identical_interval_secs = seconds;
        self
    }

    pub fn rate_limiting_base_backoff_secs(mut self, seconds: f64) -> Self {
        self.config.rate_limiting.base_backoff_secs = seconds;
        self
    }

    pub fn rate_limiting_max_backoff_secs(mut self, seconds: f64) -> Self {
        self.config.rate_limiting.max_backoff_secs = seconds;
        self
    }

    pub fn rate_limiting_max_retries(mut self, n: u32) -> Self {
        self.config.rate_limiting.max_retries = n;
        self
    }

    pub fn rate_limiting_page_size(mut self, n: u32) -> Self {
        self.config.rate_limiting.page_size = n;
        self
    }

    // --- purchase ---

    pub fn purchase_country_code(mut self, code: impl Into<String>) -> Self {
        self.config.purchase.country_code = code.into();
        self
    }

    pub fn purchase_duration_months(mut self, months: u32) -> Self {
        self.config.purchase.duration_months = months;
        self
    }

    pub fn purchase_auto_renew(mut self, auto_renew: bool) -> Self {
        self.config.purchase.auto_renew = auto_renew;
        self
    }

    pub fn purchase_request_delay_secs(mut self, seconds: u64) -> Self {
        self.config.purchase.request_delay_secs = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Request governor for the vendor API
//!
//! The vendor allows roughly one request every six seconds per endpoint and
//! rejects identical requests repeated within a second. Every call goes
//! through [`RateGovernor::execute`], which:
//!
//! 1. takes the per-endpoint lock, then the per-identical-request lock
//!    (both FIFO, created lazily per key)
//! 2. sleeps until the configured interval has passed since the last
//!    completed request for each key
//! 3. sends the request and records the completion time for both keys
//! 4. on 429 or a transport failure, releases both locks, sleeps and starts
//!    over; any other response ends the call
//!
//! The 429 delay is the body's `wait_time`, else the `Retry-After` header,
//! else the current exponential backoff, always capped at `max_backoff`.
//! 429s and transport failures share one retry counter.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use numbridge_vendor::governor::RateGovernor;
//! use numbridge_vendor::request::ApiRequest;
//! use numbridge_vendor::transport::ReqwestTransport;
//!
//! # async fn example() {
//! let governor = RateGovernor::default();
//! let transport = ReqwestTransport::new();
//! let request = ApiRequest::get("https://vendor.test/api/numbers").param("offset", 0);
//! let result = governor.execute(&transport, &request).await;
//! # }
//! ```

use std::{fmt, sync::Arc, time::Duration};

use chrono::Utc;
use dashmap::DashMap;
use numbridge_core::config::RateLimitingConfig;
use serde_json::Value;
use tokio::{
    sync::Mutex,
    time::{sleep, sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    request::ApiRequest,
    transport::{Transport, TransportError, TransportResponse},
    ApiError, ApiResponse, ApiResult,
};

// ============================================================================
// Configuration
// ============================================================================

/// Timing parameters of the governor
#[derive(Debug, Clone, PartialEq)]
pub struct GovernorConfig {
    /// Minimum gap between completed requests to the same endpoint
    pub endpoint_interval: Duration,
    /// Minimum gap between completed identical requests
    pub identical_interval: Duration,
    /// First backoff delay; doubles after every retry
    pub base_backoff: Duration,
    /// Upper bound for every retry delay, server hints included
    pub max_backoff: Duration,
    /// Retries allowed after the first attempt
    pub max_retries: u32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            endpoint_interval: Duration::from_secs(6),
            identical_interval: Duration::from_secs(1),
            base_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            max_retries: 6,
        }
    }
}

impl From<&RateLimitingConfig> for GovernorConfig {
    fn from(config: &RateLimitingConfig) -> Self {
        Self {
            endpoint_interval: config.endpoint_interval(),
            identical_interval: config.identical_interval(),
            base_backoff: config.base_backoff(),
            max_backoff: config.max_backoff(),
            max_retries: config.max_retries,
        }
    }
}

// ============================================================================
// Backoff
// ============================================================================

/// Exponential backoff state for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            current: base.min(max),
            max,
        }
    }

    pub fn current(&self) -> Duration {
        self.current
    }

    /// Doubles the delay, saturating at the maximum.
    pub fn advance(&mut self) {
        self.current = self.current.saturating_mul(2).min(self.max);
    }
}

// ============================================================================
// Keyed gates
// ============================================================================

/// Per-key FIFO locks and last-completion timestamps
#[derive(Debug, Default)]
struct KeyedGate {
    locks: DashMap<String, Arc<Mutex<()>>>,
    last_completed: DashMap<String, Instant>,
}

impl KeyedGate {
    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(key.to_string()).or_default().value())
    }

    fn last(&self, key: &str) -> Option<Instant> {
        self.last_completed.get(key).map(|t| *t.value())
    }

    fn record(&self, key: &str, at: Instant) {
        self.last_completed.insert(key.to_string(), at);
    }

    /// Sleeps until `interval` has elapsed since the last completion for
    /// `key`. Caller holds the key's lock.
    async fn wait_for_gap(&self, key: &str, interval: Duration) {
        let Some(ready_at) = self.last(key).and_then(|last| last.checked_add(interval)) else {
            return;
        };
        let now = Instant::now();
        if ready_at > now {
            debug!(
                key,
                wait_ms = (ready_at - now).as_millis() as u64,
                "Waiting for rate interval"
            );
            sleep_until(ready_at).await;
        }
    }
}

// ============================================================================
// Retry state machine
// ============================================================================

/// Why an attempt will be retried
#[derive(Debug)]
enum RetryCause {
    RateLimited,
    Transport(TransportError),
}

impl fmt::Display for RetryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => f.write_str("429 Too Many Requests"),
            Self::Transport(e) => write!(f, "{e}"),
        }
    }
}

/// Evaluation of one attempt
#[derive(Debug)]
enum Verdict {
    Done(ApiResult),
    Backoff { cause: RetryCause, delay: Duration },
}

// ============================================================================
// RateGovernor
// ============================================================================

/// Shared gatekeeper for every vendor call
///
/// One instance should be shared (via `Arc`) by everything talking to the
/// vendor so that intervals hold across callers.
#[derive(Debug, Default)]
pub struct RateGovernor {
    config: GovernorConfig,
    endpoints: KeyedGate,
    identical: KeyedGate,
}

impl RateGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            config,
            endpoints: KeyedGate::default(),
            identical: KeyedGate::default(),
        }
    }

    pub fn config(&self) -> &GovernorConfig {
        &self.config
    }

    /// Completion time of the last request to `endpoint_key`.
    pub fn last_endpoint_request(&self, endpoint_key: &str) -> Option<Instant> {
        self.endpoints.last(endpoint_key)
    }

    /// Completion time of the last request with `identical_key`.
    pub fn last_identical_request(&self, identical_key: &str) -> Option<Instant> {
        self.identical.last(identical_key)
    }

    /// Sends `request` through `transport` under the rate rules
    ///
    /// Dropping the returned future releases any lock it holds.
    pub async fn execute(&self, transport: &dyn Transport, request: &ApiRequest) -> ApiResult {
        let endpoint_key = request.endpoint_key();
        let identical_key = request.identical_key();
        let endpoint_lock = self.endpoints.lock_for(&endpoint_key);
        let identical_lock = self.identical.lock_for(&identical_key);

        let mut backoff = Backoff::new(self.config.base_backoff, self.config.max_backoff);
        let mut retries: u32 = 0;

        loop {
            let verdict = {
                let _endpoint_guard = endpoint_lock.lock().await;
                let _identical_guard = identical_lock.lock().await;

                self.endpoints
                    .wait_for_gap(&endpoint_key, self.config.endpoint_interval)
                    .await;
                self.identical
                    .wait_for_gap(&identical_key, self.config.identical_interval)
                    .await;

                let sent = transport.send(request).await;
                if sent.is_ok() {
                    let now = Instant::now();
                    self.endpoints.record(&endpoint_key, now);
                    self.identical.record(&identical_key, now);
                }

                self.evaluate(sent, &backoff)
            };

            match verdict {
                Verdict::Done(result) => return result,
                Verdict::Backoff { cause, delay } => {
                    retries += 1;
                    if retries > self.config.max_retries {
                        warn!(
                            endpoint = %endpoint_key,
                            retries = self.config.max_retries,
                            last_cause = %cause,
                            "Retries exhausted"
                        );
                        return Err(self.exhausted(cause));
                    }
                    info!(
                        endpoint = %endpoint_key,
                        attempt = retries,
                        delay_ms = delay.as_millis() as u64,
                        cause = %cause,
                        "Backing off before retry"
                    );
                    sleep(delay).await;
                    backoff.advance();
                }
            }
        }
    }

    fn evaluate(
        &self,
        sent: Result<TransportResponse, TransportError>,
        backoff: &Backoff,
    ) -> Verdict {
        let response = match sent {
            Ok(response) => response,
            Err(e) if e.is_retryable() => {
                warn!(error = %e, "Transport failure");
                return Verdict::Backoff {
                    cause: RetryCause::Transport(e),
                    delay: self.cap(backoff.current()),
                };
            }
            Err(e) => {
                return Verdict::Done(Err(ApiError::Network {
                    detail: e.to_string(),
                }))
            }
        };

        if response.status == 429 {
            let hint = parse_wait_time(&response.body).or_else(|| {
                response
                    .retry_after
                    .as_deref()
                    .and_then(parse_retry_after)
            });
            let delay = self.cap(hint.unwrap_or(backoff.current()));
            info!(
                hinted = hint.is_some(),
                delay_ms = delay.as_millis() as u64,
                "Received 429"
            );
            return Verdict::Backoff {
                cause: RetryCause::RateLimited,
                delay,
            };
        }

        Verdict::Done(interpret(response))
    }

    fn cap(&self, delay: Duration) -> Duration {
        delay.min(self.config.max_backoff)
    }

    fn exhausted(&self, cause: RetryCause) -> ApiError {
        match cause {
            RetryCause::RateLimited => ApiError::RateLimited {
                detail: format!(
                    "Still rate limited after {} retries",
                    self.config.max_retries
                ),
            },
            RetryCause::Transport(e) => ApiError::Network {
                detail: e.to_string(),
            },
        }
    }
}

/// Maps a non-429 response to the call result.
fn interpret(response: TransportResponse) -> ApiResult {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    let TransportResponse { status, body, .. } = response;

    let data: Value = match serde_json::from_str(&body) {
        Ok(data) => data,
        Err(_) => return Err(ApiError::Http { status, body }),
    };

    if data.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(ApiError::Rejected {
            reason: rejection_reason(&data),
        });
    }

    Ok(ApiResponse { status, data })
}

fn rejection_reason(data: &Value) -> String {
    ["error", "detail", "message"]
        .iter()
        .find_map(|field| {
            data.get(*field)
                .filter(|v| !v.is_null())
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
        })
        .unwrap_or_else(|| "Request rejected by vendor".to_string())
}

// ============================================================================
// Server hints
// ============================================================================

/// Parses a `Retry-After` header value
///
/// Accepts (possibly fractional) seconds or an HTTP-date. Returns `None`
/// for unparseable values, negative numbers and dates in the past.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();

    if let Ok(seconds) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(seconds).ok();
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value) {
        return (date.with_timezone(&Utc) - Utc::now()).to_std().ok();
    }

    warn!(value, "Could not parse Retry-After header");
    None
}

/// Reads `wait_time` (seconds, number or numeric string) from a 429 body.
pub fn parse_wait_time(body: &str) -> Option<Duration> {
    let data: Value = serde_json::from_str(body).ok()?;
    let seconds = match data.get("wait_time")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Duration::try_from_secs_f64(seconds).ok()
}

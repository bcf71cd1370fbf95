//! Numbridge Vendor - rate-governed client for the phone-number vendor API
//!
//! Every call to the vendor goes through a single [`governor::RateGovernor`]
//! that spaces requests per endpoint and per identical request, and retries
//! on 429 responses and transport failures.
//!
//! ## Modules
//!
//! - [`request`] - Request description and the keys used for rate limiting
//! - [`transport`] - HTTP transport seam (`reqwest` in production)
//! - [`governor`] - Interval gating, 429 handling and backoff
//! - [`client`] - Typed vendor operations (listing, purchase, SMS)
//! - [`provider`] - `NumberProvider` port implementation

pub mod client;
pub mod governor;
pub mod provider;
pub mod request;
pub mod transport;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Terminal failure of a governed API call
///
/// Only the kinds below are distinguishable by callers; see [`ApiError::kind`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Still receiving 429 after every retry was spent
    #[error("rate_limited: {detail}")]
    RateLimited { detail: String },

    /// Transport failure on the last attempt
    #[error("network_error: {detail}")]
    Network { detail: String },

    /// Non-2xx, non-429 status, or a 2xx body that is not JSON
    #[error("http_{status}: {body}")]
    Http { status: u16, body: String },

    /// 2xx response carrying `success: false`
    #[error("{reason}")]
    Rejected { reason: String },
}

impl ApiError {
    /// Short machine-readable kind: `rate_limited`, `network_error`,
    /// `http_<status>` or `rejected`.
    pub fn kind(&self) -> String {
        match self {
            Self::RateLimited { .. } => "rate_limited".to_string(),
            Self::Network { .. } => "network_error".to_string(),
            Self::Http { status, .. } => format!("http_{status}"),
            Self::Rejected { .. } => "rejected".to_string(),
        }
    }

    /// Human-readable detail (server body, transport message or reason).
    pub fn detail(&self) -> &str {
        match self {
            Self::RateLimited { detail } | Self::Network { detail } => detail,
            Self::Http { body, .. } => body,
            Self::Rejected { reason } => reason,
        }
    }
}

/// Successful response of a governed call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed JSON body
    pub data: Value,
}

pub type ApiResult = Result<ApiResponse, ApiError>;

/// Wire form of a call result: `{"success": true, "data": ...}` or
/// `{"success": false, "error": ..., "detail": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome<T> {
    Success { success: bool, data: T },
    Failure {
        success: bool,
        error: String,
        detail: String,
    },
}

impl<T> Outcome<T> {
    pub fn success(data: T) -> Self {
        Self::Success {
            success: true,
            data,
        }
    }

    pub fn failure(error: &ApiError) -> Self {
        Self::Failure {
            success: false,
            error: error.kind(),
            detail: error.detail().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl<T> From<Result<T, ApiError>> for Outcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(&e),
        }
    }
}

//! Vendor API client
//!
//! Typed operations on top of the [`RateGovernor`]: full number listing with
//! pagination, single-number purchase and SMS retrieval. Every request
//! carries `Authorization: Token <token>`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use numbridge_vendor::client::VendorClient;
//!
//! # async fn example() -> Result<(), numbridge_vendor::ApiError> {
//! let client = VendorClient::new("api-token");
//! let list = client.list_all_numbers().await?;
//! println!("{} numbers", list.pagination.total);
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use anyhow::{bail, Result};
use numbridge_core::{
    config::{Config, DEFAULT_BASE_URL},
    domain::{NumberList, Pagination, PhoneNumber, PurchaseOrder, PurchaseReceipt, SmsPage},
};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    governor::{GovernorConfig, RateGovernor},
    request::ApiRequest,
    transport::{ReqwestTransport, Transport},
    ApiError, ApiResponse, ApiResult,
};

/// Page size used when walking the number listing
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// ============================================================================
// Response shapes
// ============================================================================

/// `data` of one listing page
#[derive(Debug, Default, Deserialize)]
struct ListingPage {
    #[serde(default)]
    numbers: Vec<PhoneNumber>,
    #[serde(default)]
    pagination: Option<PageInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct PageInfo {
    #[serde(default)]
    total: Option<u64>,
}

// ============================================================================
// VendorClient
// ============================================================================

/// HTTP client for the number vendor
///
/// Cloning is cheap; clones share the transport and the governor.
#[derive(Clone)]
pub struct VendorClient {
    transport: Arc<dyn Transport>,
    governor: Arc<RateGovernor>,
    base_url: String,
    token: String,
    page_size: u32,
}

impl VendorClient {
    /// Creates a client for the production API with default rate limits
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (useful for testing)
    ///
    /// A trailing slash on `base_url` is ignored.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            transport: Arc::new(ReqwestTransport::new()),
            governor: Arc::new(RateGovernor::default()),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Builds a client from the loaded configuration
    ///
    /// # Errors
    ///
    /// Fails when the configuration does not validate or no API token is
    /// configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.ensure_valid()?;
        let token = match config.api.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => bail!("No API token configured"),
        };

        let transport =
            ReqwestTransport::with_timeout(Duration::from_secs(config.api.timeout_secs));
        let governor = RateGovernor::new(GovernorConfig::from(&config.rate_limiting));

        Ok(Self::with_base_url(token, &config.api.base_url)
            .with_transport(Arc::new(transport))
            .with_governor(Arc::new(governor))
            .with_page_size(config.rate_limiting.page_size))
    }

    /// Shares `governor` with this client.
    pub fn with_governor(mut self, governor: Arc<RateGovernor>) -> Self {
        self.governor = governor;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Page size for the listing walk; zero is treated as one.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn governor(&self) -> &Arc<RateGovernor> {
        &self.governor
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Builds an authenticated request for `path` under the base URL
    pub fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Token {}", self.token))
    }

    /// Sends a prepared request through the governor
    pub async fn execute_raw(&self, request: ApiRequest) -> ApiResult {
        self.governor.execute(self.transport.as_ref(), &request).await
    }

    /// Fetches every rented number, walking the listing page by page
    ///
    /// The total is taken from the first page. The walk stops once the
    /// offset reaches it or a page comes back empty. Any page error aborts
    /// the walk and is returned as is.
    pub async fn list_all_numbers(&self) -> Result<NumberList, ApiError> {
        let limit = self.page_size;
        let mut numbers: Vec<PhoneNumber> = Vec::new();
        let mut offset: u64 = 0;
        let mut total: Option<u64> = None;

        loop {
            let request = self
                .request(Method::GET, "/numbers")
                .param("limit", limit)
                .param("offset", offset);
            let response = self.execute_raw(request).await?;
            let page: ListingPage = decode_field(&response, "data")?;

            let received = page.numbers.len();
            numbers.extend(page.numbers);

            let total = *total.get_or_insert_with(|| {
                page.pagination
                    .and_then(|p| p.total)
                    .unwrap_or(received as u64)
            });

            debug!(offset, received, total, "Fetched listing page");

            offset += u64::from(limit);
            if offset >= total || received == 0 {
                break;
            }
        }

        let total = match total {
            Some(total) if total > 0 => total,
            _ => numbers.len() as u64,
        };
        info!(count = numbers.len(), total, "Listed numbers");

        Ok(NumberList {
            numbers,
            pagination: Pagination {
                total,
                limit: u64::from(limit),
                offset: 0,
            },
        })
    }

    /// Buys one number
    ///
    /// The receipt is read from the top level of the response, falling back
    /// to its `data` object.
    pub async fn purchase_number(
        &self,
        order: &PurchaseOrder,
    ) -> Result<PurchaseReceipt, ApiError> {
        let body = serde_json::to_value(order).map_err(|e| ApiError::Rejected {
            reason: format!("Could not encode purchase order: {e}"),
        })?;
        let request = self.request(Method::POST, "/numbers/purchase/").json(body);
        let response = self.execute_raw(request).await?;

        let receipt = receipt_from(&response);
        info!(
            custom_name = %order.custom_name,
            numbers = receipt.numbers.len(),
            cost = receipt.cost,
            "Purchased number"
        );
        Ok(receipt)
    }

    /// Fetches one page of SMS for `number_id`
    pub async fn get_sms(
        &self,
        number_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SmsPage, ApiError> {
        let request = self
            .request(Method::GET, &format!("/numbers/{number_id}/sms"))
            .param("limit", limit)
            .param("offset", offset);
        let response = self.execute_raw(request).await?;
        decode_field(&response, "data")
    }
}

impl std::fmt::Debug for VendorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VendorClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Decodes `response.data[field]`; a missing or null field decodes as `T::default()`.
fn decode_field<T: DeserializeOwned + Default>(
    response: &ApiResponse,
    field: &str,
) -> Result<T, ApiError> {
    match response.data.get(field) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| ApiError::Http {
            status: response.status,
            body: format!("Unexpected response shape: {e}"),
        }),
    }
}

/// Reads the receipt of a purchase the vendor already accepted
///
/// Numbers and cost are read from the top level, falling back to `data`.
/// This never fails: entries that do not decode are dropped with a warning
/// so a charged purchase is still reported as bought.
fn receipt_from(response: &ApiResponse) -> PurchaseReceipt {
    let nested = response.data.get("data");
    let field = |name: &str| {
        response
            .data
            .get(name)
            .filter(|v| !is_blank(v))
            .or_else(|| nested.and_then(|d| d.get(name)).filter(|v| !is_blank(v)))
    };

    let numbers = match field("numbers") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match PhoneNumber::deserialize(item) {
                Ok(number) => Some(number),
                Err(e) => {
                    warn!(error = %e, entry = %item, "Skipping unreadable purchased number");
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(numbers = %other, "Purchase response has no number list");
            Vec::new()
        }
        None => Vec::new(),
    };

    let cost = match field("cost") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
            warn!(cost = %s, "Unreadable purchase cost");
            0.0
        }),
        _ => 0.0,
    };

    if numbers.is_empty() {
        warn!(status = response.status, "Purchase accepted but no number was returned");
    }
    PurchaseReceipt { numbers, cost }
}

/// Null, zero, empty string or empty array
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

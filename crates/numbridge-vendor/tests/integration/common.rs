//! Shared test helpers for vendor API integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server and returns a
//! VendorClient pointing at it. The governor uses millisecond intervals so
//! tests run in real time without waiting seconds per request.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use numbridge_vendor::client::VendorClient;
use numbridge_vendor::governor::{GovernorConfig, RateGovernor};

pub const TOKEN: &str = "test-token";

/// Governor with short intervals and backoff for real-time tests.
pub fn fast_governor() -> Arc<RateGovernor> {
    Arc::new(RateGovernor::new(GovernorConfig {
        endpoint_interval: Duration::from_millis(5),
        identical_interval: Duration::from_millis(1),
        base_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(100),
        max_retries: 6,
    }))
}

/// Starts a mock server and returns a (MockServer, VendorClient) tuple.
pub async fn setup_vendor_mock() -> (MockServer, VendorClient) {
    let server = MockServer::start().await;
    let client = VendorClient::with_base_url(TOKEN, server.uri()).with_governor(fast_governor());
    (server, client)
}

/// A number as the vendor renders it.
pub fn number_json(i: usize) -> Value {
    json!({
        "piv_num_id": format!("piv-{i}"),
        "phone_number": format!("+44740000{i:04}"),
        "custom_name": format!("number{i}"),
        "country_code": "GB",
        "status": "active",
        "expires_at": "2026-12-01T00:00:00Z"
    })
}

/// Mounts one listing page answering `offset` with numbers `range`.
pub async fn mount_listing_page(
    server: &MockServer,
    offset: usize,
    range: std::ops::Range<usize>,
    total: usize,
) {
    let numbers: Vec<Value> = range.map(number_json).collect();
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .and(query_param("offset", offset.to_string()))
        .and(header("Authorization", format!("Token {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "numbers": numbers,
                "pagination": {"total": total, "limit": 100, "offset": offset}
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

//! Rate limiting and error mapping over real HTTP

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use numbridge_vendor::client::VendorClient;
use numbridge_vendor::governor::{GovernorConfig, RateGovernor};

use crate::common;

#[tokio::test]
async fn test_429_with_retry_after_then_success() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-1/sms"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-1/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"messages": [{"message_body": "hello"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.get_sms("piv-1", 100, 0).await.expect("retry failed");

    assert_eq!(page.messages[0].message_body, "hello");
}

#[tokio::test]
async fn test_429_wait_time_in_body_is_honored() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-1/sms"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "detail": "Request was throttled.",
            "wait_time": 0.05
        })))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-1/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let started = std::time::Instant::now();
    client.get_sms("piv-1", 100, 0).await.expect("retry failed");

    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[tokio::test]
async fn test_persistent_429_is_rate_limited() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .respond_with(ResponseTemplate::new(429))
        .expect(7)
        .mount(&server)
        .await;

    let err = client.list_all_numbers().await.unwrap_err();

    assert_eq!(err.kind(), "rate_limited");
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "Invalid token."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_all_numbers().await.unwrap_err();

    assert_eq!(err.kind(), "http_403");
    assert!(err.detail().contains("Invalid token."));
}

#[tokio::test]
async fn test_html_success_body_is_http_error() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_all_numbers().await.unwrap_err();

    assert_eq!(err.kind(), "http_200");
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Nothing listens on port 9 locally.
    let governor = Arc::new(RateGovernor::new(GovernorConfig {
        endpoint_interval: Duration::ZERO,
        identical_interval: Duration::ZERO,
        base_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        max_retries: 2,
    }));
    let client =
        VendorClient::with_base_url(common::TOKEN, "http://127.0.0.1:9").with_governor(governor);

    let err = client.get_sms("piv-1", 100, 0).await.unwrap_err();

    assert_eq!(err.kind(), "network_error");
}

#[tokio::test]
async fn test_shared_governor_spaces_clients() {
    let server = wiremock::MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-1/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(2)
        .mount(&server)
        .await;

    let governor = Arc::new(RateGovernor::new(GovernorConfig {
        endpoint_interval: Duration::from_millis(200),
        ..GovernorConfig::default()
    }));
    let a = VendorClient::with_base_url("a", server.uri()).with_governor(Arc::clone(&governor));
    let b = VendorClient::with_base_url("b", server.uri()).with_governor(governor);

    let started = std::time::Instant::now();
    a.get_sms("piv-1", 100, 0).await.unwrap();
    b.get_sms("piv-1", 100, 1).await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(200));
}

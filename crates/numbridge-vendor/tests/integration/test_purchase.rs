//! Purchase endpoint against a mock vendor

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use numbridge_core::domain::PurchaseOrder;
use numbridge_core::ports::NumberProvider;
use numbridge_vendor::provider::VendorNumberProvider;
use numbridge_vendor::ApiError;

use crate::common;

fn order() -> PurchaseOrder {
    PurchaseOrder {
        country_code: "GB".to_string(),
        duration_months: 1,
        auto_renew: false,
        custom_name: "03/14/2026_09:26:53.589".to_string(),
    }
}

#[tokio::test]
async fn test_purchase_posts_order_and_reads_receipt() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("POST"))
        .and(path("/numbers/purchase/"))
        .and(header("Authorization", "Token test-token"))
        .and(body_json(json!({
            "country_code": "GB",
            "duration_months": 1,
            "auto_renew": false,
            "custom_name": "03/14/2026_09:26:53.589"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "numbers": [common::number_json(7)],
            "cost": 1.25
        })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client.purchase_number(&order()).await.expect("purchase failed");

    assert_eq!(receipt.numbers.len(), 1);
    assert_eq!(receipt.numbers[0].phone_number, "+447400000007");
    assert_eq!(receipt.cost, 1.25);
}

#[tokio::test]
async fn test_purchase_rejection_reason_surfaces() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("POST"))
        .and(path("/numbers/purchase/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Insufficient balance"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.purchase_number(&order()).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Rejected {
            reason: "Insufficient balance".to_string()
        }
    );
}

#[tokio::test]
async fn test_provider_keeps_api_error_downcastable() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("POST"))
        .and(path("/numbers/purchase/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = VendorNumberProvider::new(client);
    let err = provider.purchase(&order()).await.unwrap_err();

    assert_eq!(err.to_string(), "http_500: upstream down");
    assert_eq!(
        err.downcast_ref::<ApiError>().map(ApiError::kind).as_deref(),
        Some("http_500")
    );
}

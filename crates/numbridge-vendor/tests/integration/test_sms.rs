//! SMS endpoint against a mock vendor

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_get_sms_reads_messages_and_pagination() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-3/sms"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "messages": [
                    {
                        "from_number": "Google",
                        "message_body": "G-123456 is your Google verification code.",
                        "verification_code": "123456",
                        "received_at": "2026-03-14T09:30:00Z"
                    },
                    {"message_body": "older"}
                ],
                "pagination": {"total": 2, "limit": 100, "offset": 0}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.get_sms("piv-3", 100, 0).await.expect("sms failed");

    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.messages[0].verification_code.as_deref(), Some("123456"));
    assert_eq!(page.messages[1].from_number, None);
    assert_eq!(page.total(), 2);
}

#[tokio::test]
async fn test_get_sms_empty_inbox() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers/piv-9/sms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"messages": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.get_sms("piv-9", 100, 0).await.expect("sms failed");

    assert!(page.messages.is_empty());
    assert_eq!(page.total(), 0);
}

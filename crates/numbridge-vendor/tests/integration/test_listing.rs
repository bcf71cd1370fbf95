//! Listing pagination against a mock vendor

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_all_numbers_walks_every_page() {
    let (server, client) = common::setup_vendor_mock().await;
    common::mount_listing_page(&server, 0, 0..100, 250).await;
    common::mount_listing_page(&server, 100, 100..200, 250).await;
    common::mount_listing_page(&server, 200, 200..250, 250).await;

    let list = client.list_all_numbers().await.expect("listing failed");

    assert_eq!(list.numbers.len(), 250);
    assert_eq!(list.numbers[0].piv_num_id, "piv-0");
    assert_eq!(list.numbers[249].piv_num_id, "piv-249");
    assert_eq!(list.pagination.total, 250);
    assert_eq!(list.pagination.limit, 100);
    assert_eq!(list.pagination.offset, 0);
}

#[tokio::test]
async fn test_list_stops_on_empty_page() {
    let (server, client) = common::setup_vendor_mock().await;
    common::mount_listing_page(&server, 0, 0..100, 1000).await;
    common::mount_listing_page(&server, 100, 0..0, 1000).await;

    let list = client.list_all_numbers().await.expect("listing failed");

    assert_eq!(list.numbers.len(), 100);
    assert_eq!(list.pagination.total, 1000);
}

#[tokio::test]
async fn test_list_without_pagination_uses_page_length() {
    let (server, client) = common::setup_vendor_mock().await;
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"numbers": [common::number_json(1), common::number_json(2)]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.list_all_numbers().await.expect("listing failed");

    assert_eq!(list.numbers.len(), 2);
    assert_eq!(list.pagination.total, 2);
}

#[tokio::test]
async fn test_list_error_on_later_page_aborts() {
    let (server, client) = common::setup_vendor_mock().await;
    common::mount_listing_page(&server, 0, 0..100, 250).await;
    Mock::given(method("GET"))
        .and(path("/numbers"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid token"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.list_all_numbers().await.unwrap_err();

    assert_eq!(err.kind(), "http_403");
    assert_eq!(err.detail(), "Invalid token");
}

#[tokio::test]
async fn test_small_page_size_is_sent_as_limit() {
    let (server, client) = common::setup_vendor_mock().await;
    let client = client.with_page_size(1);
    for i in 0..3 {
        Mock::given(method("GET"))
            .and(path("/numbers"))
            .and(query_param("limit", "1"))
            .and(query_param("offset", i.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "numbers": [common::number_json(i)],
                    "pagination": {"total": 3, "limit": 1, "offset": i}
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
    }

    let list = client.list_all_numbers().await.expect("listing failed");

    assert_eq!(list.numbers.len(), 3);
    assert_eq!(list.pagination.limit, 1);
}

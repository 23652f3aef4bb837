//! Integration tests for the HTTP sync transport
//!
//! Verifies the request shape and the status-class mapping against a
//! wiremock server: 200 parses the authoritative array, 404 classifies as
//! invalid credential, 429 as rate-limited, and everything else (or a
//! malformed body) as an opaque cycle failure.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jotlist_core::domain::{ItemId, SyncPayload};
use jotlist_core::ports::{SyncTransport, TransportError};
use jotlist_api::HttpSyncTransport;

fn transport(server: &MockServer) -> HttpSyncTransport {
    HttpSyncTransport::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn payload(id: &str, version: u64, value: Option<&str>) -> SyncPayload {
    SyncPayload {
        id: ItemId::new(id.to_string()).unwrap(),
        version,
        value: value.map(|v| json!(v)),
    }
}

#[tokio::test]
async fn test_exchange_success_parses_authoritative_set() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!([
            {"id": "~0.abc", "version": 1, "value": "x"}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "r7", "version": 1, "value": "x", "replaces": "~0.abc"},
            {"id": "r9", "version": 4, "value": "other"}
        ])))
        .mount(&server)
        .await;

    let items = transport(&server)
        .exchange("tok-1", &[payload("~0.abc", 1, Some("x"))])
        .await
        .expect("exchange failed");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id.as_str(), "r7");
    assert_eq!(items[0].replaces.as_ref().unwrap().as_str(), "~0.abc");
    assert_eq!(items[1].id.as_str(), "r9");
    assert!(items[1].replaces.is_none());
}

#[tokio::test]
async fn test_exchange_empty_batch_sends_empty_array() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .and(body_json(json!([])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let items = transport(&server).exchange("tok-1", &[]).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_exchange_404_is_auth_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = transport(&server)
        .exchange("stale-token", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::AuthInvalid));
}

#[tokio::test]
async fn test_exchange_429_is_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = transport(&server).exchange("tok-1", &[]).await.unwrap_err();
    assert!(matches!(err, TransportError::RateLimited));
}

#[tokio::test]
async fn test_exchange_500_is_opaque_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = transport(&server).exchange("tok-1", &[]).await.unwrap_err();
    assert!(matches!(err, TransportError::Failed(_)));
}

#[tokio::test]
async fn test_exchange_malformed_body_is_opaque_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = transport(&server).exchange("tok-1", &[]).await.unwrap_err();
    assert!(matches!(err, TransportError::Failed(_)));
}

#[tokio::test]
async fn test_exchange_tombstone_payload_serializes_null() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/item/sync"))
        .and(body_json(json!([
            {"id": "r7", "version": 6, "value": null}
        ])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let items = transport(&server)
        .exchange("tok-1", &[payload("r7", 6, None)])
        .await
        .unwrap();
    assert!(items.is_empty());
}

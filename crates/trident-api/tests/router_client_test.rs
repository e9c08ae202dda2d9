#![allow(clippy::unwrap_used)]
// Integration tests for `RouterClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use trident_api::{BasicAuth, Error, RouterClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RouterClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let auth = BasicAuth::new("api", SecretString::from("hunter2".to_string()));
    let client = RouterClient::with_client(reqwest::Client::new(), base_url, auth);
    (server, client)
}

// ── Interfaces ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_interfaces_parses_string_values() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                ".id": "*1",
                "name": "ether1",
                "type": "ether",
                "running": "true",
                "disabled": "false",
                "rx-byte": "123456",
                "tx-byte": "654321",
                "rx-packet": "100",
                "tx-packet": "200"
            }
        ])))
        .mount(&server)
        .await;

    let interfaces = client.list_interfaces().await.unwrap();
    assert_eq!(interfaces.len(), 1);
    assert_eq!(interfaces[0].running, Some(true));
    assert_eq!(interfaces[0].disabled, Some(false));
    assert_eq!(interfaces[0].rx_byte, 123_456);
    assert_eq!(interfaces[0].tx_packet, 200);
}

#[tokio::test]
async fn test_interface_addresses_filters_by_name() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/address"))
        .and(query_param("interface", "bridge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { ".id": "*2", "address": "192.168.88.1/24", "interface": "bridge" }
        ])))
        .mount(&server)
        .await;

    let addrs = client.interface_addresses("bridge").await.unwrap();
    assert_eq!(addrs[0].ip(), "192.168.88.1");
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_routeros_error_body_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/rest/queue/simple"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 400,
            "message": "Bad Request",
            "detail": "failure: target not found"
        })))
        .mount(&server)
        .await;

    let queue = trident_api::router::models::SimpleQueue {
        name: "voice".into(),
        target: "nowhere".into(),
        max_limit: "10M/10M".into(),
        limit_at: "1M/1M".into(),
        priority: "1/1".into(),
        packet_marks: None,
        comment: "trident:p1".into(),
    };

    match client.add_simple_queue(&queue).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Bad Request: failure: target not found");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_bad_credentials() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": 401,
            "message": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let result = client.system_resource().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

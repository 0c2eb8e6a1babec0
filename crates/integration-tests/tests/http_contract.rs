//! HTTP contract tests against a live storefront.
//!
//! These tests verify status codes, session headers and JSON bodies for every
//! endpoint over a real TCP connection.

#![allow(clippy::unwrap_used)]

use cartwheel_integration_tests::TestServer;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

const SESSION: &str = "x-session-id";

fn session_of(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(SESSION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// =============================================================================
// Health and Catalog
// =============================================================================

#[tokio::test]
async fn test_healthz_ok() {
    let server = TestServer::start().await;
    let response = Client::new()
        .get(server.url("/healthz"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(SESSION));
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.json::<Value>().await.unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_catalog_mints_session() {
    let server = TestServer::start().await;
    let response = Client::new()
        .get(server.url("/catalog"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session_id = session_of(&response);
    assert!(uuid::Uuid::parse_str(&session_id).is_ok());

    let body: Value = response.json().await.unwrap();
    let ids: Vec<&str> = body["catalog"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);
}

// =============================================================================
// Cart Flows
// =============================================================================

#[tokio::test]
async fn test_shopping_flow() {
    let server = TestServer::start().await;
    let client = Client::new();

    let response = client
        .post(server.url("/cart/add"))
        .header(SESSION, "flow")
        .json(&json!({"item_id": "2", "qty": 2}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_of(&response), "flow");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["subtotal"], json!(79.0));

    client
        .post(server.url("/cart/add"))
        .header(SESSION, "flow")
        .json(&json!({"item_id": 3}))
        .send()
        .await
        .unwrap();

    let body: Value = client
        .get(server.url("/cart"))
        .header(SESSION, "flow")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["session_id"], "flow");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["subtotal"], json!(108.0));

    let response = client
        .post(server.url("/checkout"))
        .header(SESSION, "flow")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order: Value = response.json().await.unwrap();
    assert_eq!(order["total"], json!(108.0));
    assert!(uuid::Uuid::parse_str(order["order_id"].as_str().unwrap()).is_ok());

    let body: Value = client
        .get(server.url("/cart"))
        .header(SESSION, "flow")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["subtotal"], json!(0.0));
}

#[tokio::test]
async fn test_rejections_leave_cart_unchanged() {
    let server = TestServer::start().await;
    let client = Client::new();

    client
        .post(server.url("/cart/add"))
        .header(SESSION, "keep")
        .json(&json!({"item_id": "1", "qty": 1}))
        .send()
        .await
        .unwrap();

    let cases = [
        ("/cart/add", json!({"item_id": "999"}), "invalid_item"),
        ("/cart/add", json!({"item_id": "1", "qty": -1}), "invalid_qty"),
        ("/cart/remove", json!({"item_id": "4"}), "not_in_cart"),
        ("/cart/remove", json!({"item_id": "1", "qty": 0}), "invalid_qty"),
    ];
    for (path, body, reason) in cases {
        let response = client
            .post(server.url(path))
            .header(SESSION, "keep")
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path} {body}");
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["reason"], reason, "{path} {body}");
        assert!(error["error"].is_string());
    }

    let cart = server.state.store().peek(&"keep".into()).unwrap();
    assert_eq!(cart.quantity("1"), Some(1));
    assert_eq!(cart.len(), 1);
}

#[tokio::test]
async fn test_empty_checkout_is_rejected() {
    let server = TestServer::start().await;
    let response = Client::new()
        .post(server.url("/checkout"))
        .header(SESSION, "nobody")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"error": "Cart is empty", "reason": "empty_cart"})
    );
}

#[tokio::test]
async fn test_clear_then_view() {
    let server = TestServer::start().await;
    let client = Client::new();

    client
        .post(server.url("/cart/add"))
        .header(SESSION, "clr")
        .json(&json!({"item_id": "4", "qty": 3}))
        .send()
        .await
        .unwrap();

    let response = client
        .delete(server.url("/cart"))
        .header(SESSION, "clr")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.json::<Value>().await.unwrap(),
        json!({"message": "cleared"})
    );

    assert!(server.state.store().peek(&"clr".into()).unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_invalid_item() {
    let server = TestServer::start().await;
    let response = Client::new()
        .post(server.url("/cart/add"))
        .header(SESSION, "junk")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>().await.unwrap()["reason"], "invalid_item");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = TestServer::start().await;
    let response = Client::new()
        .get(server.url("/does-not-exist"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key(SESSION));
    assert_eq!(response.json::<Value>().await.unwrap()["error"], "not_found");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = TestServer::start().await;
    let response = Client::new()
        .get(server.url("/healthz"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-me");
}

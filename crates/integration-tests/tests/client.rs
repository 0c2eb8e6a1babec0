//! Typed client calls against a live storefront.

#![allow(clippy::unwrap_used)]

use cartwheel_cli::client::{ClientError, ShopClient};
use cartwheel_core::SessionId;
use cartwheel_integration_tests::TestServer;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_client_round_trip() {
    let server = TestServer::start().await;
    let client = ShopClient::new(&server.base_url(), "integration-test").unwrap();

    assert!(client.health().await);

    let page = client.catalog().await.unwrap();
    assert_eq!(page.products.len(), 5);
    let session_id = page.session_id.unwrap();

    let cart = client.add(&session_id, "4", 2).await.unwrap();
    assert_eq!(cart.subtotal, Decimal::new(39_800, 2));

    let cart = client.view_cart(&session_id).await.unwrap();
    assert_eq!(cart.item_count(), 1);

    let order = client.checkout(&session_id).await.unwrap();
    assert_eq!(order.total, Decimal::new(39_800, 2));
    assert_eq!(order.item_count(), 1);
}

#[tokio::test]
async fn test_client_surfaces_rejections() {
    let server = TestServer::start().await;
    let client = ShopClient::new(&server.base_url(), "integration-test").unwrap();
    let session_id = SessionId::from("empty");

    let err = client.checkout(&session_id).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Status {
            endpoint: "/checkout",
            status: 400
        }
    ));

    let err = client.add(&session_id, "nope", 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}

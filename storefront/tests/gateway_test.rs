//! HTTP gateway against a mock backend.

use serde_json::json;
use storefront::config::BackendSettings;
use storefront::dtos::{NewProduct, ProductImage};
use storefront::error::StorefrontError;
use storefront::models::{PaymentStatus, ProductId};
use storefront::services::http::build_client;
use storefront::services::{HttpInventoryGateway, InventoryGateway};
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer) -> HttpInventoryGateway {
    storefront_core::observability::init_test_tracing();
    let settings = BackendSettings {
        base_url: server.uri(),
        request_timeout_secs: 2,
    };
    let client = build_client(&settings).unwrap();
    HttpInventoryGateway::new(client, settings.base_url)
}

#[tokio::test]
async fn lists_products_and_ignores_extra_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "name": "Desk Lamp",
                "description": null,
                "price": 49.99,
                "availableQuantity": 3,
                "pictureUrl": "lamp.png",
                "stock": 3,
                "realTimeStock": 3,
                "createdAt": "2024-05-01T10:00:00"
            },
            {
                "id": 2,
                "name": "Notebook",
                "description": "A5 dotted",
                "price": 4.5,
                "availableQuantity": -2
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let products = gateway_for(&server).list_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId(1));
    assert_eq!(products[0].description, "");
    assert_eq!(products[0].picture_url.as_deref(), Some("lamp.png"));
    assert_eq!(products[1].available_quantity, 0);
    assert!(!products[1].is_purchasable());
}

#[tokio::test]
async fn listing_failure_with_error_body_is_application_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "Database unavailable" })),
        )
        .mount(&server)
        .await;

    let err = gateway_for(&server).list_products().await.unwrap_err();
    assert_eq!(err, StorefrontError::Application("Database unavailable".into()));
}

#[tokio::test]
async fn listing_failure_without_body_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway_for(&server).list_products().await.unwrap_err();
    assert!(matches!(err, StorefrontError::Network(_)));
}

#[tokio::test]
async fn unreadable_listing_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = gateway_for(&server).list_products().await.unwrap_err();
    assert!(matches!(err, StorefrontError::Network(_)));
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);
    drop(server);

    let err = gateway.list_products().await.unwrap_err();
    assert!(matches!(err, StorefrontError::Network(_)));
}

#[tokio::test]
async fn create_product_sends_multipart_form_with_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products/upload"))
        .and(body_string_contains("name=\"availableQuantity\""))
        .and(body_string_contains("name=\"productImage\"; filename=\"lamp.png\""))
        .and(body_string_contains("Desk Lamp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let product = NewProduct {
        name: "Desk Lamp".to_string(),
        description: "Warm light".to_string(),
        price: 49.99,
        available_quantity: 3,
        image: Some(ProductImage {
            file_name: "lamp.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: b"fake-png-bytes".to_vec(),
        }),
    };

    gateway_for(&server).create_product(product).await.unwrap();
}

#[tokio::test]
async fn create_product_rejection_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Price must be positive" })),
        )
        .mount(&server)
        .await;

    let product = NewProduct {
        name: "Lamp".to_string(),
        description: String::new(),
        price: 0.0,
        available_quantity: 1,
        image: None,
    };

    let err = gateway_for(&server).create_product(product).await.unwrap_err();
    assert_eq!(err, StorefrontError::Application("Price must be positive".into()));
}

#[tokio::test]
async fn update_stock_puts_quantity_and_ignores_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/stock/4"))
        .and(body_json(json!({ "quantity": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_string("not even json"))
        .expect(1)
        .mount(&server)
        .await;

    gateway_for(&server)
        .update_stock(ProductId(4), 5)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_stock_for_missing_product_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/products/stock/9"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .update_stock(ProductId(9), 1)
        .await
        .unwrap_err();
    assert_eq!(err, StorefrontError::NotFound(ProductId(9)));
}

#[tokio::test]
async fn lists_payments_with_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 10,
                "productId": 1,
                "amount": 99.98,
                "quantity": 2,
                "status": "SUCCESS",
                "timestamp": "2024-05-01T10:15:30",
                "stripeSessionId": "cs_test_a1"
            },
            {
                "id": 11,
                "productId": 404,
                "amount": 5.0,
                "status": "REFUNDED",
                "timestamp": "yesterday"
            }
        ])))
        .mount(&server)
        .await;

    let payments = gateway_for(&server).list_payments().await.unwrap();

    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0].status, PaymentStatus::Success);
    assert!(payments[0].timestamp.is_some());
    assert_eq!(payments[0].session_id.as_deref(), Some("cs_test_a1"));
    assert_eq!(payments[1].quantity, 1);
    assert_eq!(
        payments[1].status,
        PaymentStatus::Unrecognized("REFUNDED".to_string())
    );
    assert!(payments[1].timestamp.is_none());
    assert!(payments[1].session_id.is_none());
}

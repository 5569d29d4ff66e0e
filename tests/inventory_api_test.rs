mod common;

use axum::http::Method;
use common::{response_json, row, TestApp, INVENTORY};
use serde_json::json;

#[tokio::test]
async fn list_returns_coerced_rows() {
    let app = TestApp::new();
    app.gateway.seed(
        INVENTORY,
        vec![
            common::inventory_header(),
            row(&["123", "Coffee", "ground", "Drinks", "12,50", "10"]),
            row(&["456", "Tea", "", "Drinks", "bad-price", "3"]),
        ],
    );

    let response = app.request(Method::GET, "/api/inventory", None).await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    let items = body.as_array().expect("array body");

    // the unparseable row is skipped, the comma price is normalized
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["barcode"], "123");
    assert_eq!(items[0]["price"], "12.50");
    assert_eq!(items[0]["quantity"], 10);
}

#[tokio::test]
async fn get_unknown_barcode_is_404() {
    let app = TestApp::new();

    let response = app.request(Method::GET, "/api/inventory/999", None).await;
    assert_eq!(response.status(), 404);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("999"));
}

#[tokio::test]
async fn create_then_fetch_then_duplicate_conflicts() {
    let app = TestApp::new();

    let payload = json!({
        "barcode": "123",
        "name": "Coffee",
        "description": "ground",
        "category": "Drinks",
        "price": "12,50",
        "quantity": 10
    });

    let response = app
        .request(Method::POST, "/api/inventory", Some(payload.clone()))
        .await;
    assert_eq!(response.status(), 201);

    let response = app.request(Method::GET, "/api/inventory/123", None).await;
    assert_eq!(response.status(), 200);
    let item = response_json(response).await;
    assert_eq!(item["name"], "Coffee");
    assert_eq!(item["price"], "12.50");
    assert_eq!(item["quantity"], 10);

    let response = app
        .request(Method::POST, "/api/inventory", Some(payload))
        .await;
    assert_eq!(response.status(), 409);
    let body = response_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("123"));
}

#[tokio::test]
async fn create_with_missing_required_fields_is_400() {
    let app = TestApp::new();

    let response = app
        .request(
            Method::POST,
            "/api/inventory",
            Some(json!({ "barcode": "123", "name": "Coffee" })),
        )
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert!(body.get("error").is_some());
}

#[tokio::test]
async fn update_touches_only_the_named_field() {
    let app = TestApp::new();
    app.gateway.seed(
        INVENTORY,
        vec![
            common::inventory_header(),
            row(&["123", "Coffee", "ground", "Drinks", "12.50", "10"]),
        ],
    );

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/123",
            Some(json!({ "price": "15,00" })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = app.request(Method::GET, "/api/inventory/123", None).await;
    let item = response_json(response).await;
    assert_eq!(item["price"], "15.00");
    assert_eq!(item["name"], "Coffee");
    assert_eq!(item["description"], "ground");
    assert_eq!(item["category"], "Drinks");
    assert_eq!(item["quantity"], 10);
}

#[tokio::test]
async fn empty_update_is_not_modified_not_success() {
    let app = TestApp::new();
    app.gateway.seed(
        INVENTORY,
        vec![
            common::inventory_header(),
            row(&["123", "Coffee", "", "", "12.50", "10"]),
        ],
    );

    let response = app
        .request(Method::PUT, "/api/inventory/123", Some(json!({})))
        .await;
    assert_eq!(response.status(), 304);
}

#[tokio::test]
async fn update_unknown_barcode_is_404() {
    let app = TestApp::new();

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/999",
            Some(json!({ "price": "1.00" })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn update_with_unparseable_price_is_400() {
    let app = TestApp::new();
    app.gateway.seed(
        INVENTORY,
        vec![
            common::inventory_header(),
            row(&["123", "Coffee", "", "", "12.50", "10"]),
        ],
    );

    let response = app
        .request(
            Method::PUT,
            "/api/inventory/123",
            Some(json!({ "price": "expensive" })),
        )
        .await;
    assert_eq!(response.status(), 400);

    // the row is untouched
    let response = app.request(Method::GET, "/api/inventory/123", None).await;
    let item = response_json(response).await;
    assert_eq!(item["price"], "12.50");
}

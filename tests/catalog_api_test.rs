mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, test_config, TestApp, TEST_ADMIN_KEY};
use fastfood_api::middleware_helpers::API_KEY_HEADER;
use fastfood_api::models::ProductCategory;
use rust_decimal_macros::dec;
use serde_json::json;

fn guarded_app() -> TestApp {
    let mut cfg = test_config();
    cfg.admin_api_key = Some(TEST_ADMIN_KEY.to_string());
    TestApp::with_config(cfg)
}

#[tokio::test]
async fn product_crud_round_trip() {
    let app = TestApp::new();

    let created = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Onion Rings", "price": "11.50", "category": "Acompanhamento" })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = response_json(created).await;
    let id = created["id"].as_i64().expect("product id");
    assert_eq!(created["category"], "Acompanhamento");

    let fetched = response_json(
        app.request(Method::GET, &format!("/api/v1/products/{id}"), None)
            .await,
    )
    .await;
    assert_eq!(fetched["name"], "Onion Rings");
    assert_eq!(fetched["price"], "11.50");

    let updated = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{id}"),
            Some(json!({ "name": "Onion Rings", "price": "12.00", "category": "Acompanhamento" })),
        )
        .await;
    assert_eq!(updated.status(), StatusCode::OK);
    assert_eq!(response_json(updated).await["price"], "12.00");

    let deleted = app
        .request(Method::DELETE, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(
        response_json(deleted).await["message"],
        "Product deleted successfully"
    );

    let gone = app
        .request(Method::GET, &format!("/api/v1/products/{id}"), None)
        .await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_names_conflict() {
    let app = TestApp::new();
    app.seed_product("X-Bacon", dec!(23.50), ProductCategory::Lanche)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "X-Bacon", "price": "20.00", "category": "Lanche" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn negative_prices_fail_validation() {
    let app = TestApp::new();
    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({ "name": "Free Lunch", "price": "-1.00", "category": "Lanche" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_listing_filters_and_rejects_unknown_categories() {
    let app = TestApp::new();
    app.seed_product("X-Salada", dec!(20.90), ProductCategory::Lanche)
        .await;
    app.seed_product("Suco de Laranja", dec!(8.50), ProductCategory::Bebida)
        .await;
    app.seed_product("Refrigerante Lata", dec!(6.00), ProductCategory::Bebida)
        .await;

    let drinks = response_json(
        app.request(Method::GET, "/api/v1/products/category/Bebida", None)
            .await,
    )
    .await;
    let drinks = drinks.as_array().expect("products array");
    assert_eq!(drinks.len(), 2);
    assert!(drinks.iter().all(|p| p["category"] == "Bebida"));

    let unknown = app
        .request(Method::GET, "/api/v1/products/category/Pizza", None)
        .await;
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_key_guards_mutations_only() {
    let app = guarded_app();
    let body = json!({ "name": "Sundae", "price": "10.90", "category": "Sobremesa" });

    let anonymous = app
        .request(Method::POST, "/api/v1/products", Some(body.clone()))
        .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .request_with_headers(
            Method::POST,
            "/api/v1/products",
            Some(body.clone()),
            &[(API_KEY_HEADER, "nope")],
        )
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let authorized = app
        .request_with_headers(
            Method::POST,
            "/api/v1/products",
            Some(body),
            &[(API_KEY_HEADER, TEST_ADMIN_KEY)],
        )
        .await;
    assert_eq!(authorized.status(), StatusCode::CREATED);

    let listing = app.request(Method::GET, "/api/v1/products", None).await;
    assert_eq!(listing.status(), StatusCode::OK);
    assert_eq!(response_json(listing).await.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn order_and_payment_routes_ignore_the_admin_key() {
    let app = guarded_app();
    let burger = app
        .seed_product("X-Burger", dec!(18.90), ProductCategory::Lanche)
        .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/orders/checkout",
            Some(json!({ "product_ids": [burger.id] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn health_reports_in_memory_storage() {
    let app = TestApp::new();
    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["storage"], "in-memory");
    assert!(body["database"].is_null());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = response_json(response).await;
    assert!(doc["paths"]["/api/v1/orders/checkout"].is_object());
}

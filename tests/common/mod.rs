#![allow(dead_code)]

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use fastfood_api::{
    config::AppConfig,
    models::{NewProduct, Product, ProductCategory},
    AppState,
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret_0123456789";
pub const TEST_ADMIN_KEY: &str = "admin-test-key";

/// Development config suitable for tests: permissive CORS, default policies.
pub fn test_config() -> AppConfig {
    AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "development".to_string(),
    )
}

/// Helper harness driving the full router over in-memory stores.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(cfg: AppConfig) -> Self {
        let state = AppState::in_memory(cfg);
        let router = fastfood_api::app_router(state.clone());
        Self { router, state }
    }

    /// Adds a catalog entry directly through the product service.
    pub async fn seed_product(&self, name: &str, price: Decimal, category: ProductCategory) -> Product {
        self.state
            .products
            .create_product(NewProduct {
                name: name.to_string(),
                price,
                category,
            })
            .await
            .expect("seed product")
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

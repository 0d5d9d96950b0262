//! Fast Food API Library
//!
//! Order checkout, kitchen status flow, payment reconciliation and the
//! product catalog behind a small axum HTTP surface.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod services;
pub mod tracing;
pub mod webhooks;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::repositories::{
    InMemoryOrderStore, InMemoryPaymentStore, InMemoryProductStore, OrderRepository,
    OrderStore, PaymentRepository, PaymentStore, ProductLookup, ProductRepository, ProductStore,
};
use crate::services::{gateway_for, OrderService, PaymentGateway, PaymentService, ProductService};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub products: ProductService,
    /// Present when the stores are database backed; used by the health check.
    pub db: Option<Arc<DatabaseConnection>>,
}

impl AppState {
    /// Wires the workflows over the given stores, with policies taken from `config`.
    pub fn with_stores<P>(
        config: AppConfig,
        orders: Arc<dyn OrderStore>,
        products: Arc<P>,
        payments: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        db: Option<Arc<DatabaseConnection>>,
    ) -> Self
    where
        P: ProductStore + 'static,
    {
        let lookup: Arc<dyn ProductLookup> = products.clone();
        let catalog: Arc<dyn ProductStore> = products;

        let order_service = OrderService::new(
            orders.clone(),
            lookup,
            payments.clone(),
            config.order_status_transitions,
        );
        let payment_service =
            PaymentService::new(orders, payments, gateway, config.payment_status_transitions);

        Self {
            config: Arc::new(config),
            orders: order_service,
            payments: payment_service,
            products: ProductService::new(catalog),
            db,
        }
    }

    /// State backed by sea-orm repositories over `db`.
    pub fn with_database(config: AppConfig, db: Arc<DatabaseConnection>) -> Self {
        let gateway = gateway_for(config.payment_gateway);
        Self::with_stores(
            config,
            Arc::new(OrderRepository::new(db.clone())),
            Arc::new(ProductRepository::new(db.clone())),
            Arc::new(PaymentRepository::new(db.clone())),
            gateway,
            Some(db),
        )
    }

    /// State backed by process-local stores; nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Self {
        let gateway = gateway_for(config.payment_gateway);
        Self::with_stores(
            config,
            Arc::new(InMemoryOrderStore::new()),
            Arc::new(InMemoryProductStore::new()),
            Arc::new(InMemoryPaymentStore::new()),
            gateway,
            None,
        )
    }
}

/// All `/api/v1` routes.
pub fn api_v1_routes(admin_api_key: Option<Arc<str>>) -> Router<AppState> {
    Router::new()
        .merge(handlers::orders::orders_routes())
        .merge(handlers::payments::payments_routes())
        .merge(handlers::products::products_routes(admin_api_key))
}

/// Full application router: health, versioned API, Swagger UI, request ids and HTTP tracing.
///
/// CORS and compression are left to the binary so tests can drive this router directly.
pub fn app_router(state: AppState) -> Router {
    let admin_api_key = state.config.admin_api_key().map(Arc::from);

    Router::new()
        .merge(handlers::health::health_routes())
        .nest("/api/v1", api_v1_routes(admin_api_key))
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

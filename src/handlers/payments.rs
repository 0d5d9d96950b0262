use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::ServiceError,
    models::{OrderId, PaymentStatusView},
    webhooks::verify_signature,
    AppState,
};

/// Build the payments Router scoped under `/api/v1`.
pub fn payments_routes() -> Router<AppState> {
    Router::new()
        .route("/payments", post(create_payment))
        .route("/payments/webhook", post(payment_webhook))
        .route("/payments/:order_id", get(get_payment_status))
        .route("/payments/:order_id/sync", post(sync_payment))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"order_id": 1}))]
pub struct CreatePaymentRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WebhookQuery {
    pub order_id: OrderId,
    /// Provider-reported status token (PENDING, APPROVED, REJECTED)
    #[param(example = "APPROVED")]
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created in PENDING", body = PaymentStatusView),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Payment already exists", body = crate::errors::ErrorResponse),
        (status = 502, description = "Payment gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let payment = state.payments.create_payment(payload.order_id).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{order_id}",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Current payment status", body = PaymentStatusView),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<PaymentStatusView>, ServiceError> {
    Ok(Json(state.payments.get_payment_status(order_id).await?))
}

// POST /api/v1/payments/webhook
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    params(
        WebhookQuery,
        ("x-timestamp" = Option<String>, Header, description = "Unix seconds, required when a webhook secret is configured"),
        ("x-signature" = Option<String>, Header, description = "hex HMAC-SHA256 of \"{timestamp}.{order_id}.{status}\"")
    ),
    responses(
        (status = 200, description = "Status reconciled", body = PaymentStatusView),
        (status = 400, description = "Unknown status token", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid signature", body = crate::errors::ErrorResponse),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<WebhookQuery>,
) -> Result<Json<PaymentStatusView>, ServiceError> {
    if let Some(secret) = state.config.webhook_secret() {
        verify_signature(
            &headers,
            secret,
            query.order_id,
            &query.status,
            state.config.payment_webhook_tolerance_secs,
            chrono::Utc::now().timestamp(),
        )
        .map_err(|e| {
            warn!(order_id = query.order_id, error = %e, "Payment webhook signature verification failed");
            ServiceError::Unauthorized("invalid webhook signature".to_string())
        })?;
    }

    let payment = state
        .payments
        .reconcile_webhook(query.order_id, &query.status)
        .await?;
    Ok(Json(payment))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{order_id}/sync",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Status after polling the gateway", body = PaymentStatusView),
        (status = 404, description = "Payment not found", body = crate::errors::ErrorResponse),
        (status = 502, description = "Payment gateway failure", body = crate::errors::ErrorResponse)
    ),
    tag = "Payments"
)]
pub async fn sync_payment(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<PaymentStatusView>, ServiceError> {
    Ok(Json(state.payments.sync_with_gateway(order_id).await?))
}

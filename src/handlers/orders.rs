use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    errors::ServiceError,
    models::{MessageResponse, OrderId, OrderView, ProductId},
    AppState,
};

/// Build the orders Router scoped under `/api/v1`.
pub fn orders_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/checkout", post(checkout))
        .route(
            "/orders/:order_id",
            get(get_order).put(update_order_status).delete(delete_order),
        )
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"product_ids": [1, 2, 1]}))]
pub struct CheckoutRequest {
    /// One entry per unit; repeat an id to order it more than once
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Maximum number of orders to return (default 10, capped by configuration)
    #[param(minimum = 0)]
    pub limit: Option<u64>,
    /// Number of orders to skip
    pub skip: Option<u64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UpdateStatusQuery {
    /// One of RECEIVED, PREPARING, READY, FINISHED
    #[param(example = "READY")]
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = OrderView),
        (status = 400, description = "Empty product list", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.orders.create_order(payload.product_ids).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Orders in insertion order", body = [OrderView])
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderView>>, ServiceError> {
    let limit = state.config.page_limit(query.limit);
    let orders = state
        .orders
        .list_orders(limit, query.skip.unwrap_or(0))
        .await?;
    Ok(Json(orders))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order details", body = OrderView),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<OrderView>, ServiceError> {
    Ok(Json(state.orders.get_order(order_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{order_id}",
    params(
        ("order_id" = i32, Path, description = "Order ID"),
        UpdateStatusQuery
    ),
    responses(
        (status = 200, description = "Status updated", body = OrderView),
        (status = 400, description = "Unknown status or illegal transition", body = crate::errors::ErrorResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Order changed concurrently", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Query(query): Query<UpdateStatusQuery>,
) -> Result<Json<OrderView>, ServiceError> {
    let order = state
        .orders
        .update_order_status(order_id, &query.status)
        .await?;
    Ok(Json(order))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{order_id}",
    params(("order_id" = i32, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order deleted", body = MessageResponse),
        (status = 404, description = "Order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
) -> Result<Json<MessageResponse>, ServiceError> {
    Ok(Json(state.orders.delete_order(order_id).await?))
}

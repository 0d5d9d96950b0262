use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    errors::ServiceError,
    middleware_helpers::require_admin_api_key,
    models::{MessageResponse, NewProduct, Product, ProductId},
    AppState,
};

/// Build the catalog Router scoped under `/api/v1`. Mutations require the admin key when one is set.
pub fn products_routes(admin_api_key: Option<Arc<str>>) -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/category/:category", get(list_products_by_category))
        .route(
            "/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            admin_api_key,
            require_admin_api_key,
        ))
}

#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses((status = 200, description = "Full catalog", body = [Product])),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ServiceError> {
    Ok(Json(state.products.list_products().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = NewProduct,
    params(("x-api-key" = Option<String>, Header, description = "Admin key")),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product", body = crate::errors::ErrorResponse),
        (status = 401, description = "Missing or invalid API key", body = crate::errors::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/category/{category}",
    params(("category" = String, Path, description = "Lanche, Acompanhamento, Bebida or Sobremesa")),
    responses(
        (status = 200, description = "Products in the category", body = [Product]),
        (status = 400, description = "Unknown category", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Product>>, ServiceError> {
    Ok(Json(state.products.list_by_category(&category).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{product_id}",
    params(("product_id" = i32, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = Product),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>, ServiceError> {
    Ok(Json(state.products.get_product(product_id).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{product_id}",
    request_body = NewProduct,
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("x-api-key" = Option<String>, Header, description = "Admin key")
    ),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<NewProduct>,
) -> Result<Json<Product>, ServiceError> {
    Ok(Json(state.products.update_product(product_id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{product_id}",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
        ("x-api-key" = Option<String>, Header, description = "Admin key")
    ),
    responses(
        (status = 200, description = "Product deleted", body = MessageResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<MessageResponse>, ServiceError> {
    Ok(Json(state.products.delete_product(product_id).await?))
}

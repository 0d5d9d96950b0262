use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fast Food API",
        version = "1.0.0",
        description = r#"
# Fast Food Ordering API

Self-service ordering backend for a fast-food counter.

## Features

- **Checkout**: Create orders from a list of product ids; the total is a price snapshot
- **Kitchen flow**: Move orders through RECEIVED, PREPARING, READY and FINISHED
- **Payments**: One payment per order, reconciled from provider webhooks
- **Catalog**: Products grouped into Lanche, Acompanhamento, Bebida and Sobremesa

## Webhook signatures

When a webhook secret is configured, providers must send `x-timestamp` (unix seconds) and
`x-signature`, the hex HMAC-SHA256 of `{timestamp}.{order_id}.{status}`.

## Error Handling

Failures return a JSON body with `error`, `detail`, `request_id` and `timestamp`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Orders", description = "Order checkout and status"),
        (name = "Payments", description = "Payment creation and reconciliation"),
        (name = "Products", description = "Product catalog"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Orders
        crate::handlers::orders::checkout,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::delete_order,

        // Payments
        crate::handlers::payments::create_payment,
        crate::handlers::payments::get_payment_status,
        crate::handlers::payments::payment_webhook,
        crate::handlers::payments::sync_payment,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::create_product,
        crate::handlers::products::list_products_by_category,
        crate::handlers::products::get_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,

        // Health
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            // Order types
            crate::handlers::orders::CheckoutRequest,
            crate::models::OrderView,
            crate::models::OrderStatus,
            crate::models::ProductDetail,
            crate::models::MessageResponse,

            // Payment types
            crate::handlers::payments::CreatePaymentRequest,
            crate::models::PaymentStatusView,
            crate::models::PaymentStatus,

            // Catalog types
            crate::models::Product,
            crate::models::NewProduct,
            crate::models::ProductCategory,

            // Health
            crate::handlers::health::HealthResponse,
            crate::handlers::health::ComponentStatus,

            // Error types
            crate::errors::ErrorResponse,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_core_routes() {
        let json = serde_json::to_string_pretty(&ApiDocV1::openapi()).unwrap();
        assert!(json.contains("Fast Food API"));
        assert!(json.contains("/api/v1/orders/checkout"));
        assert!(json.contains("/api/v1/payments/webhook"));
        assert!(json.contains("/api/v1/products/{product_id}"));
    }
}

//! Domain values shared by the workflows, the stores and the HTTP layer.

pub mod order;
pub mod payment;
pub mod product;
pub mod status;

/// Store-assigned order identifier.
pub type OrderId = i32;
/// Catalog product identifier.
pub type ProductId = i32;

pub use order::{decode_product_ids, encode_product_ids, NewOrder, Order, OrderStatus, OrderView};
pub use payment::{NewPayment, Payment, PaymentStatus, PaymentStatusView};
pub use product::{NewProduct, Product, ProductCategory, ProductDetail};
pub use status::{is_valid_transition, StatusMachine, TransitionPolicy};

/// Plain confirmation body for delete operations.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
#[schema(example = json!({"message": "Order deleted successfully"}))]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

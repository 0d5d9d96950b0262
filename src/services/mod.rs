// Workflows
pub mod orders;
pub mod payments;

// Catalog
pub mod products;

// External collaborators
pub mod payment_gateway;

pub use orders::OrderService;
pub use payment_gateway::{
    gateway_for, GatewayKind, MockPaymentGateway, NoopPaymentGateway, PaymentGateway,
};
pub use payments::PaymentService;
pub use products::ProductService;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::models::{
    NewOrder, NewPayment, NewProduct, Order, OrderId, OrderStatus, Payment, PaymentStatus,
    Product, ProductCategory, ProductId,
};

pub mod in_memory;
pub mod order_repository;
pub mod payment_repository;
pub mod product_repository;

pub use in_memory::{InMemoryOrderStore, InMemoryPaymentStore, InMemoryProductStore};
pub use order_repository::OrderRepository;
pub use payment_repository::PaymentRepository;
pub use product_repository::ProductRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Read-by-id access to the product catalog.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError>;
}

/// Full catalog maintenance.
#[async_trait]
pub trait ProductStore: ProductLookup {
    async fn add(&self, product: NewProduct) -> Result<Product, ServiceError>;
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError>;
    async fn list(&self) -> Result<Vec<Product>, ServiceError>;
    async fn list_by_category(
        &self,
        category: ProductCategory,
    ) -> Result<Vec<Product>, ServiceError>;
    async fn update(&self, id: ProductId, product: NewProduct) -> Result<Product, ServiceError>;
    async fn delete(&self, id: ProductId) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn add(&self, order: NewOrder) -> Result<Order, ServiceError>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError>;
    /// Ascending by id.
    async fn list(&self, limit: u64, skip: u64) -> Result<Vec<Order>, ServiceError>;
    /// Writes `status` only while the stored version still equals `expected_version`.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        expected_version: i32,
    ) -> Result<Order, ServiceError>;
    async fn delete(&self, id: OrderId) -> Result<(), ServiceError>;

    /// Deletes the order and flags its payment as orphaned. Returns whether a
    /// payment was flagged.
    ///
    /// The flag is written first, so a failure leaves the order in place. Stores
    /// that share a connection with `payments` override this with a transaction.
    async fn delete_and_orphan_payment(
        &self,
        id: OrderId,
        payments: &dyn PaymentStore,
    ) -> Result<bool, ServiceError> {
        if self.get(id).await?.is_none() {
            return Err(ServiceError::OrderNotFound(id));
        }
        let flagged = payments.mark_orphaned(id).await?;
        self.delete(id).await?;
        Ok(flagged)
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Fails with `PaymentAlreadyExists` when the order already has a payment.
    async fn add(&self, payment: NewPayment) -> Result<Payment, ServiceError>;
    async fn get_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, ServiceError>;
    async fn update_status(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<Payment, ServiceError>;
    /// Returns whether a payment was flagged.
    async fn mark_orphaned(&self, order_id: OrderId) -> Result<bool, ServiceError>;
}

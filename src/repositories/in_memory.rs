use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{OrderStore, PaymentStore, ProductLookup, ProductStore};
use crate::errors::ServiceError;
use crate::models::{
    NewOrder, NewPayment, NewProduct, Order, OrderId, OrderStatus, Payment, PaymentStatus,
    Product, ProductCategory, ProductId,
};

#[derive(Debug)]
struct Table<K, V> {
    rows: BTreeMap<K, V>,
    next_id: i32,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// A thread-safe in-memory product catalog.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductStore {
    table: Arc<RwLock<Table<ProductId, Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductStore {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn add(&self, product: NewProduct) -> Result<Product, ServiceError> {
        let mut table = self.table.write().await;
        if table.rows.values().any(|p| p.name == product.name) {
            return Err(ServiceError::Conflict(format!(
                "Product '{}' already exists",
                product.name
            )));
        }
        let now = Utc::now();
        let id = table.allocate_id();
        let stored = Product {
            id,
            name: product.name,
            price: product.price,
            category: product.category,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        let table = self.table.read().await;
        Ok(table.rows.values().find(|p| p.name == name).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn list_by_category(
        &self,
        category: ProductCategory,
    ) -> Result<Vec<Product>, ServiceError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|p| p.category == category)
            .cloned()
            .collect())
    }

    async fn update(&self, id: ProductId, product: NewProduct) -> Result<Product, ServiceError> {
        let mut table = self.table.write().await;
        if table
            .rows
            .values()
            .any(|p| p.id != id && p.name == product.name)
        {
            return Err(ServiceError::Conflict(format!(
                "Product '{}' already exists",
                product.name
            )));
        }
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or(ServiceError::ProductNotFound(id))?;
        stored.name = product.name;
        stored.price = product.price;
        stored.category = product.category;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ServiceError::ProductNotFound(id))
    }
}

/// A thread-safe in-memory order store with the same versioning rules as the database adapter.
#[derive(Debug, Default, Clone)]
pub struct InMemoryOrderStore {
    table: Arc<RwLock<Table<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored orders.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn add(&self, order: NewOrder) -> Result<Order, ServiceError> {
        let mut table = self.table.write().await;
        let now = Utc::now();
        let id = table.allocate_id();
        let stored = Order {
            id,
            total_price: order.total_price,
            product_ids: order.product_ids,
            status: order.status,
            created_at: now,
            updated_at: now,
            version: 1,
        };
        table.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, limit: u64, skip: u64) -> Result<Vec<Order>, ServiceError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        expected_version: i32,
    ) -> Result<Order, ServiceError> {
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&id)
            .ok_or(ServiceError::OrderNotFound(id))?;
        if stored.version != expected_version {
            return Err(ServiceError::ConcurrentModification(id));
        }
        stored.status = status;
        stored.version += 1;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn delete(&self, id: OrderId) -> Result<(), ServiceError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ServiceError::OrderNotFound(id))
    }
}

/// A thread-safe in-memory payment store, one entry per order.
#[derive(Debug, Default, Clone)]
pub struct InMemoryPaymentStore {
    table: Arc<RwLock<Table<OrderId, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn add(&self, payment: NewPayment) -> Result<Payment, ServiceError> {
        let mut table = self.table.write().await;
        if table.rows.contains_key(&payment.order_id) {
            return Err(ServiceError::PaymentAlreadyExists(payment.order_id));
        }
        let now = Utc::now();
        let id = table.allocate_id();
        let stored = Payment {
            id,
            order_id: payment.order_id,
            amount: payment.amount,
            status: payment.status,
            orphaned: false,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(payment.order_id, stored.clone());
        Ok(stored)
    }

    async fn get_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, ServiceError> {
        Ok(self.table.read().await.rows.get(&order_id).cloned())
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<Payment, ServiceError> {
        let mut table = self.table.write().await;
        let stored = table
            .rows
            .get_mut(&order_id)
            .ok_or(ServiceError::PaymentNotFound(order_id))?;
        stored.status = status;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn mark_orphaned(&self, order_id: OrderId) -> Result<bool, ServiceError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&order_id) {
            Some(stored) => {
                stored.orphaned = true;
                stored.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

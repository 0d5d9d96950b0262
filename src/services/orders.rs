use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    errors::ServiceError,
    models::{
        is_valid_transition, MessageResponse, NewOrder, Order, OrderId, OrderStatus, OrderView,
        Product, ProductDetail, ProductId, TransitionPolicy,
    },
    repositories::{OrderStore, PaymentStore, ProductLookup},
};

/// Order workflow: checkout, listing, status progression and deletion.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductLookup>,
    payments: Arc<dyn PaymentStore>,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductLookup>,
        payments: Arc<dyn PaymentStore>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            orders,
            products,
            payments,
            policy,
        }
    }

    /// Creates an order in `RECEIVED` from an ordered list of product ids.
    ///
    /// Every id must resolve before anything is written; the first one that
    /// does not aborts the checkout with `ProductNotFound`.
    #[instrument(skip(self), fields(items = product_ids.len()))]
    pub async fn create_order(&self, product_ids: Vec<ProductId>) -> Result<OrderView, ServiceError> {
        if product_ids.is_empty() {
            return Err(ServiceError::ValidationError(
                "Order must reference at least one product".to_string(),
            ));
        }

        let mut resolved = Vec::with_capacity(product_ids.len());
        for id in &product_ids {
            let product = self.products.get_by_id(*id).await?.ok_or_else(|| {
                warn!(product_id = id, "checkout references unknown product");
                ServiceError::ProductNotFound(*id)
            })?;
            resolved.push(product);
        }

        let total_price = total_price(&resolved);
        let order = self
            .orders
            .add(NewOrder {
                total_price,
                product_ids,
                status: OrderStatus::Received,
            })
            .await?;

        info!(order_id = order.id, %total_price, "order created");
        let details = resolved.iter().map(ProductDetail::from).collect();
        Ok(OrderView::new(&order, details))
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, limit: u64, skip: u64) -> Result<Vec<OrderView>, ServiceError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let orders = self.orders.list(limit, skip).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in &orders {
            views.push(self.present(order).await?);
        }
        Ok(views)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<OrderView, ServiceError> {
        let order = self.find(order_id).await?;
        self.present(&order).await
    }

    /// Moves an order to `status` (an external token) under the configured policy.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: &str,
    ) -> Result<OrderView, ServiceError> {
        let new_status = OrderStatus::parse(status)?;
        let order = self.find(order_id).await?;

        if !is_valid_transition(self.policy, order.status, new_status) {
            warn!(
                order_id,
                from = %order.status,
                to = %new_status,
                "rejected order status transition"
            );
            return Err(ServiceError::InvalidTransition {
                from: order.status.to_string(),
                to: new_status.to_string(),
            });
        }

        if order.status == new_status {
            debug!(order_id, status = %new_status, "order already in requested status");
            return self.present(&order).await;
        }

        let updated = self
            .orders
            .update_status(order_id, new_status, order.version)
            .await?;

        info!(
            order_id,
            from = %order.status,
            to = %updated.status,
            version = updated.version,
            "order status updated"
        );
        self.present(&updated).await
    }

    /// Deletes an order. Its payment, if any, is kept and flagged as orphaned.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<MessageResponse, ServiceError> {
        let flagged = self
            .orders
            .delete_and_orphan_payment(order_id, self.payments.as_ref())
            .await?;

        if flagged {
            info!(order_id, "payment kept as orphaned after order deletion");
        }

        info!(order_id, "order deleted");
        Ok(MessageResponse::new("Order deleted successfully"))
    }

    async fn find(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        self.orders
            .get(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))
    }

    /// Resolves product details at read time; ids that no longer resolve are dropped.
    async fn present(&self, order: &Order) -> Result<OrderView, ServiceError> {
        let mut details = Vec::with_capacity(order.product_ids.len());
        for id in &order.product_ids {
            match self.products.get_by_id(*id).await? {
                Some(product) => details.push(ProductDetail::from(&product)),
                None => debug!(order_id = order.id, product_id = id, "product no longer in catalog"),
            }
        }
        Ok(OrderView::new(order, details))
    }
}

/// Sum of unit prices, one term per ordered unit.
pub fn total_price(products: &[Product]) -> Decimal {
    products.iter().map(|p| p.price).sum()
}

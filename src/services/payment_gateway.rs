use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::models::{OrderId, PaymentStatus};

/// Which gateway implementation backs the payment service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GatewayKind {
    #[default]
    Mock,
    None,
}

/// An attempt registered with an external provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayAttempt {
    pub reference: String,
    pub order_id: OrderId,
    pub amount: Decimal,
}

/// Out-of-band payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Registers a payment attempt. Errors abort payment creation.
    async fn initiate(
        &self,
        order_id: OrderId,
        amount: Decimal,
    ) -> Result<Option<GatewayAttempt>, ServiceError>;

    /// Status the provider currently reports, if it tracks this order.
    async fn poll(&self, order_id: OrderId) -> Result<Option<PaymentStatus>, ServiceError>;
}

/// Records attempts in memory and reports each one as approved.
#[derive(Debug, Default, Clone)]
pub struct MockPaymentGateway {
    attempts: Arc<RwLock<HashMap<OrderId, GatewayAttempt>>>,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attempts(&self) -> Vec<GatewayAttempt> {
        let mut attempts: Vec<_> = self.attempts.read().await.values().cloned().collect();
        attempts.sort_by_key(|a| a.order_id);
        attempts
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn initiate(
        &self,
        order_id: OrderId,
        amount: Decimal,
    ) -> Result<Option<GatewayAttempt>, ServiceError> {
        let attempt = GatewayAttempt {
            reference: format!("mock_{}", Uuid::new_v4().simple()),
            order_id,
            amount,
        };
        info!(order_id, reference = %attempt.reference, %amount, "mock gateway attempt created");
        self.attempts.write().await.insert(order_id, attempt.clone());
        Ok(Some(attempt))
    }

    async fn poll(&self, order_id: OrderId) -> Result<Option<PaymentStatus>, ServiceError> {
        let known = self.attempts.read().await.contains_key(&order_id);
        Ok(known.then_some(PaymentStatus::Approved))
    }
}

/// Gateway used when no provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPaymentGateway;

#[async_trait]
impl PaymentGateway for NoopPaymentGateway {
    async fn initiate(
        &self,
        order_id: OrderId,
        _amount: Decimal,
    ) -> Result<Option<GatewayAttempt>, ServiceError> {
        debug!(order_id, "no payment gateway configured");
        Ok(None)
    }

    async fn poll(&self, _order_id: OrderId) -> Result<Option<PaymentStatus>, ServiceError> {
        Ok(None)
    }
}

pub fn gateway_for(kind: GatewayKind) -> Arc<dyn PaymentGateway> {
    match kind {
        GatewayKind::Mock => Arc::new(MockPaymentGateway::new()),
        GatewayKind::None => Arc::new(NoopPaymentGateway),
    }
}

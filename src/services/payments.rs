use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::{
    errors::ServiceError,
    models::{
        is_valid_transition, NewPayment, OrderId, Payment, PaymentStatus, PaymentStatusView,
        StatusMachine, TransitionPolicy,
    },
    repositories::{OrderStore, PaymentStore},
    services::payment_gateway::PaymentGateway,
};

/// Payment workflow: creation, status queries and provider reconciliation.
#[derive(Clone)]
pub struct PaymentService {
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentStore>,
    gateway: Arc<dyn PaymentGateway>,
    policy: TransitionPolicy,
}

impl PaymentService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        payments: Arc<dyn PaymentStore>,
        gateway: Arc<dyn PaymentGateway>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            orders,
            payments,
            gateway,
            policy,
        }
    }

    /// Opens the single `PENDING` payment for an order, copying its total.
    #[instrument(skip(self))]
    pub async fn create_payment(&self, order_id: OrderId) -> Result<PaymentStatusView, ServiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or(ServiceError::OrderNotFound(order_id))?;

        if self.payments.get_by_order_id(order_id).await?.is_some() {
            return Err(ServiceError::PaymentAlreadyExists(order_id));
        }

        let amount = order.total_price;
        let attempt = self
            .gateway
            .initiate(order_id, amount)
            .await
            .map_err(|e| {
                error!(order_id, error = %e, "payment gateway rejected the attempt");
                match e {
                    ServiceError::ExternalServiceError(_) => e,
                    other => ServiceError::ExternalServiceError(other.to_string()),
                }
            })?;

        let payment = self
            .payments
            .add(NewPayment {
                order_id,
                amount,
                status: PaymentStatus::Pending,
            })
            .await?;

        info!(
            order_id,
            %amount,
            gateway_reference = attempt.as_ref().map(|a| a.reference.as_str()),
            "payment created"
        );
        Ok(PaymentStatusView::from(&payment))
    }

    /// Last reconciled status; never consults the gateway.
    #[instrument(skip(self))]
    pub async fn get_payment_status(
        &self,
        order_id: OrderId,
    ) -> Result<PaymentStatusView, ServiceError> {
        let payment = self.get_payment(order_id).await?;
        Ok(PaymentStatusView::from(&payment))
    }

    pub async fn get_payment(&self, order_id: OrderId) -> Result<Payment, ServiceError> {
        self.payments
            .get_by_order_id(order_id)
            .await?
            .ok_or(ServiceError::PaymentNotFound(order_id))
    }

    /// Applies a provider-reported status token. Unknown tokens never touch state.
    #[instrument(skip(self))]
    pub async fn reconcile_webhook(
        &self,
        order_id: OrderId,
        reported_status: &str,
    ) -> Result<PaymentStatusView, ServiceError> {
        let status = PaymentStatus::parse(reported_status)?;
        let payment = self.get_payment(order_id).await?;
        self.apply(payment, status).await
    }

    /// Pulls the gateway's view of the payment and reconciles it like a webhook.
    #[instrument(skip(self))]
    pub async fn sync_with_gateway(
        &self,
        order_id: OrderId,
    ) -> Result<PaymentStatusView, ServiceError> {
        let payment = self.get_payment(order_id).await?;
        match self.gateway.poll(order_id).await? {
            Some(status) => self.apply(payment, status).await,
            None => Ok(PaymentStatusView::from(&payment)),
        }
    }

    async fn apply(
        &self,
        payment: Payment,
        status: PaymentStatus,
    ) -> Result<PaymentStatusView, ServiceError> {
        let order_id = payment.order_id;
        if !is_valid_transition(self.policy, payment.status, status) {
            warn!(order_id, from = %payment.status, to = %status, "rejected payment status transition");
            return Err(ServiceError::InvalidTransition {
                from: payment.status.to_string(),
                to: status.to_string(),
            });
        }

        if payment.status.is_terminal() && payment.status != status {
            warn!(
                order_id,
                from = %payment.status,
                to = %status,
                "overwriting terminal payment status"
            );
        }

        let updated = self.payments.update_status(order_id, status).await?;
        info!(order_id, status = %updated.status, "payment status reconciled");
        Ok(PaymentStatusView::from(&updated))
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use super::status::StatusMachine;
use super::OrderId;
use crate::errors::ServiceError;

/// Settlement status of a payment.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    /// Parses a token reported by a payment provider.
    pub fn parse(token: &str) -> Result<Self, ServiceError> {
        PaymentStatus::from_str(token.trim())
            .map_err(|_| ServiceError::InvalidPaymentStatus(token.to_string()))
    }
}

impl StatusMachine for PaymentStatus {
    fn allows(self, to: Self) -> bool {
        matches!(
            (self, to),
            (PaymentStatus::Pending, PaymentStatus::Approved)
                | (PaymentStatus::Pending, PaymentStatus::Rejected)
        )
    }

    fn is_terminal(self) -> bool {
        self != PaymentStatus::Pending
    }
}

/// A persisted payment, at most one per order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payment {
    pub id: i32,
    pub order_id: OrderId,
    /// Copied from the order total when the payment was created.
    pub amount: Decimal,
    pub status: PaymentStatus,
    /// Set when the referenced order has been deleted.
    pub orphaned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub amount: Decimal,
    pub status: PaymentStatus,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"order_id": 1, "status": "PENDING"}))]
pub struct PaymentStatusView {
    pub order_id: OrderId,
    pub status: PaymentStatus,
}

impl From<&Payment> for PaymentStatusView {
    fn from(payment: &Payment) -> Self {
        Self {
            order_id: payment.order_id,
            status: payment.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_known_tokens_only() {
        assert_eq!(
            PaymentStatus::parse("APPROVED").unwrap(),
            PaymentStatus::Approved
        );
        assert_matches!(
            PaymentStatus::parse("bogus"),
            Err(ServiceError::InvalidPaymentStatus(v)) if v == "bogus"
        );
        assert!(PaymentStatus::parse("approved").is_err());
    }

    #[test]
    fn pending_is_the_only_non_terminal_status() {
        assert!(!PaymentStatus::Pending.is_terminal());
        assert!(PaymentStatus::Approved.is_terminal());
        assert!(PaymentStatus::Rejected.is_terminal());
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use super::product::ProductDetail;
use super::status::StatusMachine;
use super::{OrderId, ProductId};
use crate::errors::ServiceError;

/// Fulfillment status of an order.
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
pub enum OrderStatus {
    Received,
    Preparing,
    Ready,
    Finished,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready => 2,
            OrderStatus::Finished => 3,
        }
    }

    /// Parses an external token, rejecting anything outside the four defined values.
    pub fn parse(token: &str) -> Result<Self, ServiceError> {
        OrderStatus::from_str(token.trim())
            .map_err(|_| ServiceError::InvalidStatus(token.to_string()))
    }
}

impl StatusMachine for OrderStatus {
    fn allows(self, to: Self) -> bool {
        to.rank() > self.rank()
    }

    fn is_terminal(self) -> bool {
        self == OrderStatus::Finished
    }
}

/// A persisted order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// Snapshot of the summed unit prices at creation time.
    pub total_price: Decimal,
    /// One entry per ordered unit; order and duplicates are significant.
    pub product_ids: Vec<ProductId>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

/// An order that has not been persisted yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewOrder {
    pub total_price: Decimal,
    pub product_ids: Vec<ProductId>,
    pub status: OrderStatus,
}

/// Order as presented to callers, with product details resolved at read time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "total_price": "45.50",
    "status": "RECEIVED",
    "products": [
        {"id": 1, "name": "X-Burger", "price": "10.00"},
        {"id": 2, "name": "Milkshake", "price": "25.50"},
        {"id": 1, "name": "X-Burger", "price": "10.00"}
    ],
    "created_at": "2024-12-09T10:30:00Z",
    "updated_at": "2024-12-09T10:30:00Z"
}))]
pub struct OrderView {
    pub id: OrderId,
    #[schema(value_type = String)]
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub products: Vec<ProductDetail>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderView {
    pub fn new(order: &Order, products: Vec<ProductDetail>) -> Self {
        Self {
            id: order.id,
            total_price: order.total_price,
            status: order.status,
            products,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// Serializes product references as comma-joined integers (`"1,2,1"`).
pub fn encode_product_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Inverse of [`encode_product_ids`].
pub fn decode_product_ids(raw: &str) -> Result<Vec<ProductId>, ServiceError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|token| {
            token.trim().parse::<ProductId>().map_err(|_| {
                ServiceError::InternalError(format!("malformed product reference '{token}'"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn status_tokens_are_exact_upper_case_names() {
        assert_eq!(OrderStatus::parse("READY").unwrap(), OrderStatus::Ready);
        assert_eq!(OrderStatus::Finished.to_string(), "FINISHED");
        assert_matches!(
            OrderStatus::parse("DELIVERED"),
            Err(ServiceError::InvalidStatus(v)) if v == "DELIVERED"
        );
    }

    #[test]
    fn product_references_keep_order_and_duplicates() {
        let encoded = encode_product_ids(&[1, 2, 1]);
        assert_eq!(encoded, "1,2,1");
        assert_eq!(decode_product_ids(&encoded).unwrap(), vec![1, 2, 1]);
    }

    #[test]
    fn malformed_reference_is_rejected() {
        assert!(decode_product_ids("1,x,3").is_err());
        assert!(decode_product_ids("").unwrap().is_empty());
    }

    #[test]
    fn status_serializes_as_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");
    }
}

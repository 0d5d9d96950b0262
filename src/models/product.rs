use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::ProductId;
use crate::errors::ServiceError;

/// Menu section a product belongs to.
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
pub enum ProductCategory {
    Lanche,
    Acompanhamento,
    Bebida,
    Sobremesa,
}

impl ProductCategory {
    pub fn parse(token: &str) -> Result<Self, ServiceError> {
        ProductCategory::from_str(token.trim())
            .map_err(|_| ServiceError::ValidationError(format!("Unknown product category: {token}")))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category: ProductCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog entry payload for create and update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[schema(example = json!({"name": "X-Burger", "price": "10.00", "category": "Lanche"}))]
pub struct NewProduct {
    #[validate(length(min = 1, max = 120, message = "Product name must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(custom = "validate_price")]
    #[schema(value_type = String)]
    pub price: Decimal,
    pub category: ProductCategory,
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() {
        let mut err = ValidationError::new("price");
        err.message = Some("price must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Display projection of a product attached to orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub id: ProductId,
    pub name: String,
    #[schema(value_type = String)]
    pub price: Decimal,
}

impl From<&Product> for ProductDetail {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_price_fails_validation() {
        let product = NewProduct {
            name: "Refrigerante".into(),
            price: dec!(-1.00),
            category: ProductCategory::Bebida,
        };
        assert!(product.validate().is_err());
    }

    #[test]
    fn categories_round_trip_through_tokens() {
        assert_eq!(
            ProductCategory::parse("Sobremesa").unwrap(),
            ProductCategory::Sobremesa
        );
        assert!(ProductCategory::parse("Pizza").is_err());
    }
}

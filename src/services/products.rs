use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::{
    errors::ServiceError,
    models::{MessageResponse, NewProduct, Product, ProductCategory, ProductId},
    repositories::ProductStore,
};

/// Catalog maintenance.
#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, ServiceError> {
        product.validate()?;
        if self.products.get_by_name(&product.name).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Product '{}' already exists",
                product.name
            )));
        }
        let created = self.products.add(product).await?;
        info!(product_id = created.id, "product created");
        Ok(created)
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::ProductNotFound(id))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, ServiceError> {
        self.products.list().await
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Product>, ServiceError> {
        let category = ProductCategory::parse(category)?;
        self.products.list_by_category(category).await
    }

    #[instrument(skip(self, product))]
    pub async fn update_product(
        &self,
        id: ProductId,
        product: NewProduct,
    ) -> Result<Product, ServiceError> {
        product.validate()?;
        let updated = self.products.update(id, product).await?;
        info!(product_id = id, "product updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<MessageResponse, ServiceError> {
        self.products.delete(id).await?;
        info!(product_id = id, "product deleted");
        Ok(MessageResponse::new("Product deleted successfully"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryProductStore;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn service() -> ProductService {
        ProductService::new(Arc::new(InMemoryProductStore::new()))
    }

    fn fries() -> NewProduct {
        NewProduct {
            name: "Batata Frita".into(),
            price: dec!(8.90),
            category: ProductCategory::Acompanhamento,
        }
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let service = service();
        service.create_product(fries()).await.unwrap();
        assert_matches!(
            service.create_product(fries()).await,
            Err(ServiceError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let service = service();
        let mut product = fries();
        product.price = dec!(-0.01);
        assert_matches!(
            service.create_product(product).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn lists_by_category() {
        let service = service();
        service.create_product(fries()).await.unwrap();
        service
            .create_product(NewProduct {
                name: "Refrigerante".into(),
                price: dec!(6.00),
                category: ProductCategory::Bebida,
            })
            .await
            .unwrap();

        let drinks = service.list_by_category("Bebida").await.unwrap();
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].name, "Refrigerante");
        assert!(service.list_by_category("Pizza").await.is_err());
    }

    #[tokio::test]
    async fn missing_product_is_not_found() {
        let service = service();
        assert_matches!(
            service.get_product(5).await,
            Err(ServiceError::ProductNotFound(5))
        );
        assert_matches!(
            service.delete_product(5).await,
            Err(ServiceError::ProductNotFound(5))
        );
    }
}

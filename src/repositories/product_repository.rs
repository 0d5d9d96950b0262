use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use std::sync::Arc;

use crate::entities::product::{
    ActiveModel as ProductActiveModel, Column, Entity as ProductEntity, Model as ProductModel,
};
use crate::errors::ServiceError;
use crate::models::{NewProduct, Product, ProductCategory, ProductId};
use crate::repositories::Repository;

use super::{BaseRepository, ProductLookup, ProductStore};

/// Repository for the product catalog
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

impl Repository for ProductRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

impl TryFrom<ProductModel> for Product {
    type Error = ServiceError;

    fn try_from(model: ProductModel) -> Result<Self, Self::Error> {
        let category = model.category.parse::<ProductCategory>().map_err(|_| {
            ServiceError::InternalError(format!(
                "product {} has unknown stored category '{}'",
                model.id, model.category
            ))
        })?;
        Ok(Product {
            id: model.id,
            name: model.name,
            price: model.price,
            category,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn map_write_error(err: DbErr, name: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("Product '{name}' already exists"))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

fn collect(models: Vec<ProductModel>) -> Result<Vec<Product>, ServiceError> {
    models.into_iter().map(Product::try_from).collect()
}

#[async_trait]
impl ProductLookup for ProductRepository {
    async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, ServiceError> {
        ProductEntity::find_by_id(id)
            .one(self.get_db())
            .await?
            .map(Product::try_from)
            .transpose()
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn add(&self, product: NewProduct) -> Result<Product, ServiceError> {
        let now = Utc::now();
        let model = ProductActiveModel {
            id: ActiveValue::NotSet,
            name: Set(product.name.clone()),
            price: Set(product.price),
            category: Set(product.category.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.get_db())
        .await
        .map_err(|e| map_write_error(e, &product.name))?;
        Product::try_from(model)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>, ServiceError> {
        ProductEntity::find()
            .filter(Column::Name.eq(name))
            .one(self.get_db())
            .await?
            .map(Product::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, ServiceError> {
        collect(
            ProductEntity::find()
                .order_by_asc(Column::Id)
                .all(self.get_db())
                .await?,
        )
    }

    async fn list_by_category(
        &self,
        category: ProductCategory,
    ) -> Result<Vec<Product>, ServiceError> {
        collect(
            ProductEntity::find()
                .filter(Column::Category.eq(category.to_string()))
                .order_by_asc(Column::Id)
                .all(self.get_db())
                .await?,
        )
    }

    async fn update(&self, id: ProductId, product: NewProduct) -> Result<Product, ServiceError> {
        let existing = ProductEntity::find_by_id(id)
            .one(self.get_db())
            .await?
            .ok_or(ServiceError::ProductNotFound(id))?;

        let mut active: ProductActiveModel = existing.into();
        active.name = Set(product.name.clone());
        active.price = Set(product.price);
        active.category = Set(product.category.to_string());
        active.updated_at = Set(Utc::now());

        let model = active
            .update(self.get_db())
            .await
            .map_err(|e| map_write_error(e, &product.name))?;
        Product::try_from(model)
    }

    async fn delete(&self, id: ProductId) -> Result<(), ServiceError> {
        let result = ProductEntity::delete_by_id(id).exec(self.get_db()).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ProductNotFound(id));
        }
        Ok(())
    }
}

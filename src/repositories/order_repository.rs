use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::entities::order::{
    ActiveModel as OrderActiveModel, Column, Entity as OrderEntity, Model as OrderModel,
};
use crate::entities::payment::{self, Entity as PaymentEntity};
use crate::errors::ServiceError;
use crate::models::{
    decode_product_ids, encode_product_ids, NewOrder, Order, OrderId, OrderStatus,
};
use crate::repositories::Repository;

use super::{BaseRepository, OrderStore, PaymentStore};

/// Repository for order operations
#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    async fn find_model(&self, id: OrderId) -> Result<Option<OrderModel>, ServiceError> {
        Ok(OrderEntity::find_by_id(id).one(self.get_db()).await?)
    }
}

impl Repository for OrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

impl TryFrom<OrderModel> for Order {
    type Error = ServiceError;

    fn try_from(model: OrderModel) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&model.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "order {} has unknown stored status '{}'",
                model.id, model.status
            ))
        })?;
        Ok(Order {
            id: model.id,
            total_price: model.total_price,
            product_ids: decode_product_ids(&model.product_ids)?,
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
            version: model.version,
        })
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn add(&self, order: NewOrder) -> Result<Order, ServiceError> {
        let now = Utc::now();
        let model = OrderActiveModel {
            id: ActiveValue::NotSet,
            total_price: Set(order.total_price),
            product_ids: Set(encode_product_ids(&order.product_ids)),
            status: Set(order.status.to_string()),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.get_db())
        .await?;

        debug!(order_id = model.id, "order row inserted");
        Order::try_from(model)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, ServiceError> {
        self.find_model(id).await?.map(Order::try_from).transpose()
    }

    async fn list(&self, limit: u64, skip: u64) -> Result<Vec<Order>, ServiceError> {
        OrderEntity::find()
            .order_by_asc(Column::Id)
            .offset(skip)
            .limit(limit)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        expected_version: i32,
    ) -> Result<Order, ServiceError> {
        let result = OrderEntity::update_many()
            .col_expr(Column::Status, Expr::value(status.to_string()))
            .col_expr(Column::Version, Expr::col(Column::Version).add(1))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .filter(Column::Version.eq(expected_version))
            .exec(self.get_db())
            .await?;

        if result.rows_affected == 0 {
            return match self.find_model(id).await? {
                Some(_) => Err(ServiceError::ConcurrentModification(id)),
                None => Err(ServiceError::OrderNotFound(id)),
            };
        }

        let model = self
            .find_model(id)
            .await?
            .ok_or(ServiceError::OrderNotFound(id))?;
        Order::try_from(model)
    }

    async fn delete(&self, id: OrderId) -> Result<(), ServiceError> {
        let result = OrderEntity::delete_by_id(id).exec(self.get_db()).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::OrderNotFound(id));
        }
        Ok(())
    }

    /// Both tables live behind this repository's connection, so the delete and
    /// the orphan flag commit together.
    async fn delete_and_orphan_payment(
        &self,
        id: OrderId,
        _payments: &dyn PaymentStore,
    ) -> Result<bool, ServiceError> {
        let txn = self.get_db().begin().await?;

        let deleted = OrderEntity::delete_by_id(id).exec(&txn).await?;
        if deleted.rows_affected == 0 {
            txn.rollback().await?;
            return Err(ServiceError::OrderNotFound(id));
        }

        let flagged = PaymentEntity::update_many()
            .col_expr(payment::Column::Orphaned, Expr::value(true))
            .col_expr(payment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(payment::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        debug!(order_id = id, "order row deleted");
        Ok(flagged.rows_affected > 0)
    }
}

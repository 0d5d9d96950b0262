use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, SqlErr, TransactionTrait,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

use crate::entities::payment::{
    ActiveModel as PaymentActiveModel, Column, Entity as PaymentEntity, Model as PaymentModel,
};
use crate::errors::ServiceError;
use crate::models::{NewPayment, OrderId, Payment, PaymentStatus};
use crate::repositories::Repository;

use super::{BaseRepository, PaymentStore};

/// Repository for payment records, keyed by order id
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    base: BaseRepository,
}

impl PaymentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Single insert attempt: check for an existing row, then insert, in one transaction.
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment, ServiceError> {
        let order_id = payment.order_id;
        let txn = self.get_db().begin().await?;

        let existing = PaymentEntity::find()
            .filter(Column::OrderId.eq(order_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            txn.rollback().await?;
            return Err(ServiceError::PaymentAlreadyExists(order_id));
        }

        let now = Utc::now();
        let inserted = PaymentActiveModel {
            id: ActiveValue::NotSet,
            order_id: Set(order_id),
            amount: Set(payment.amount),
            status: Set(payment.status.to_string()),
            orphaned: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await;

        let model = match inserted {
            Ok(model) => model,
            Err(err) => {
                txn.rollback().await?;
                return Err(map_insert_error(err, order_id));
            }
        };

        txn.commit().await?;
        Payment::try_from(model)
    }
}

impl Repository for PaymentRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

impl TryFrom<PaymentModel> for Payment {
    type Error = ServiceError;

    fn try_from(model: PaymentModel) -> Result<Self, Self::Error> {
        let status = PaymentStatus::from_str(&model.status).map_err(|_| {
            ServiceError::InternalError(format!(
                "payment {} has unknown stored status '{}'",
                model.id, model.status
            ))
        })?;
        Ok(Payment {
            id: model.id,
            order_id: model.order_id,
            amount: model.amount,
            status,
            orphaned: model.orphaned,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn map_insert_error(err: DbErr, order_id: OrderId) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            warn!(order_id, "payment insert hit the unique order_id index");
            ServiceError::PaymentAlreadyExists(order_id)
        }
        _ => ServiceError::DatabaseError(err),
    }
}

/// A failed write whose order now has a payment lost a race with another
/// writer. SQLite reports that as a busy or locked database rather than a
/// unique violation.
fn resolve_add_failure(err: ServiceError, order_id: OrderId, payment_exists: bool) -> ServiceError {
    if payment_exists {
        warn!(order_id, error = %err, "payment insert lost to a concurrent writer");
        ServiceError::PaymentAlreadyExists(order_id)
    } else {
        err
    }
}

#[async_trait]
impl PaymentStore for PaymentRepository {
    async fn add(&self, payment: NewPayment) -> Result<Payment, ServiceError> {
        let order_id = payment.order_id;
        match self.insert_payment(payment).await {
            Err(err @ ServiceError::DatabaseError(_)) => {
                let payment_exists = self.get_by_order_id(order_id).await?.is_some();
                Err(resolve_add_failure(err, order_id, payment_exists))
            }
            result => result,
        }
    }

    async fn get_by_order_id(&self, order_id: OrderId) -> Result<Option<Payment>, ServiceError> {
        PaymentEntity::find()
            .filter(Column::OrderId.eq(order_id))
            .one(self.get_db())
            .await?
            .map(Payment::try_from)
            .transpose()
    }

    async fn update_status(
        &self,
        order_id: OrderId,
        status: PaymentStatus,
    ) -> Result<Payment, ServiceError> {
        let existing = PaymentEntity::find()
            .filter(Column::OrderId.eq(order_id))
            .one(self.get_db())
            .await?
            .ok_or(ServiceError::PaymentNotFound(order_id))?;

        let mut active: PaymentActiveModel = existing.into();
        active.status = Set(status.to_string());
        active.updated_at = Set(Utc::now());

        let model = active.update(self.get_db()).await?;
        Payment::try_from(model)
    }

    async fn mark_orphaned(&self, order_id: OrderId) -> Result<bool, ServiceError> {
        let result = PaymentEntity::update_many()
            .col_expr(Column::Orphaned, Expr::value(true))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::OrderId.eq(order_id))
            .exec(self.get_db())
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn locked() -> ServiceError {
        ServiceError::DatabaseError(DbErr::Custom("database is locked".into()))
    }

    #[test]
    fn locked_write_with_a_stored_payment_is_a_duplicate() {
        assert_matches!(
            resolve_add_failure(locked(), 7, true),
            ServiceError::PaymentAlreadyExists(7)
        );
    }

    #[test]
    fn locked_write_without_a_payment_keeps_the_database_error() {
        let err = resolve_add_failure(locked(), 7, false);
        assert_matches!(err, ServiceError::DatabaseError(_));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}

//! Sea-ORM repositories against a migrated SQLite file database.

use std::sync::Arc;

use assert_matches::assert_matches;
use fastfood_api::{
    config::AppConfig,
    db::{self, DbConfig},
    errors::ServiceError,
    models::{NewOrder, NewPayment, NewProduct, OrderStatus, PaymentStatus, ProductCategory},
    repositories::{
        OrderRepository, OrderStore, PaymentRepository, PaymentStore, ProductLookup,
        ProductRepository, ProductStore,
    },
    AppState,
};
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tempfile::TempDir;

async fn migrated_db() -> (TempDir, Arc<DatabaseConnection>) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("fastfood_test.db");
    let cfg = DbConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let pool = db::establish_connection_with_config(&cfg)
        .await
        .expect("connect to sqlite");
    db::run_migrations(&pool).await.expect("run migrations");
    (dir, Arc::new(pool))
}

fn burger() -> NewProduct {
    NewProduct {
        name: "X-Burger".into(),
        price: dec!(10.50),
        category: ProductCategory::Lanche,
    }
}

#[tokio::test]
async fn products_persist_and_enforce_unique_names() {
    let (_dir, db) = migrated_db().await;
    let repo = ProductRepository::new(db);

    let created = repo.add(burger()).await.expect("insert product");
    assert_eq!(created.price, dec!(10.50));

    let by_id = repo.get_by_id(created.id).await.expect("lookup");
    assert_eq!(by_id.map(|p| p.name), Some("X-Burger".to_string()));

    let dup = repo.add(burger()).await;
    assert_matches!(dup, Err(ServiceError::Conflict(_)));

    let drink = repo
        .add(NewProduct {
            name: "Suco".into(),
            price: dec!(8.00),
            category: ProductCategory::Bebida,
        })
        .await
        .expect("insert drink");
    let drinks = repo
        .list_by_category(ProductCategory::Bebida)
        .await
        .expect("list drinks");
    assert_eq!(drinks.len(), 1);
    assert_eq!(drinks[0].id, drink.id);

    repo.delete(drink.id).await.expect("delete");
    assert_matches!(
        repo.delete(drink.id).await,
        Err(ServiceError::ProductNotFound(id)) if id == drink.id
    );
}

#[tokio::test]
async fn orders_round_trip_product_references_in_order() {
    let (_dir, db) = migrated_db().await;
    let repo = OrderRepository::new(db);

    let order = repo
        .add(NewOrder {
            total_price: dec!(31.50),
            product_ids: vec![2, 1, 2],
            status: OrderStatus::Received,
        })
        .await
        .expect("insert order");
    assert_eq!(order.version, 1);

    let loaded = repo.get(order.id).await.expect("get").expect("order exists");
    assert_eq!(loaded.product_ids, vec![2, 1, 2]);
    assert_eq!(loaded.total_price, dec!(31.50));
    assert_eq!(loaded.status, OrderStatus::Received);
}

#[tokio::test]
async fn status_updates_check_the_version() {
    let (_dir, db) = migrated_db().await;
    let repo = OrderRepository::new(db);
    let order = repo
        .add(NewOrder {
            total_price: dec!(10.00),
            product_ids: vec![1],
            status: OrderStatus::Received,
        })
        .await
        .expect("insert order");

    let updated = repo
        .update_status(order.id, OrderStatus::Preparing, order.version)
        .await
        .expect("first update");
    assert_eq!(updated.status, OrderStatus::Preparing);
    assert_eq!(updated.version, order.version + 1);

    let stale = repo
        .update_status(order.id, OrderStatus::Ready, order.version)
        .await;
    assert_matches!(stale, Err(ServiceError::ConcurrentModification(id)) if id == order.id);

    let missing = repo.update_status(999, OrderStatus::Ready, 1).await;
    assert_matches!(missing, Err(ServiceError::OrderNotFound(999)));
}

#[tokio::test]
async fn listing_uses_insertion_order_with_offset() {
    let (_dir, db) = migrated_db().await;
    let repo = OrderRepository::new(db);
    let mut ids = Vec::new();
    for _ in 0..4 {
        let order = repo
            .add(NewOrder {
                total_price: dec!(5.00),
                product_ids: vec![1],
                status: OrderStatus::Received,
            })
            .await
            .expect("insert order");
        ids.push(order.id);
    }

    let page = repo.list(2, 1).await.expect("list");
    let page_ids: Vec<_> = page.iter().map(|o| o.id).collect();
    assert_eq!(page_ids, ids[1..3].to_vec());
}

#[tokio::test]
async fn one_payment_per_order_and_orphan_marking() {
    let (_dir, db) = migrated_db().await;
    let orders = OrderRepository::new(db.clone());
    let payments = PaymentRepository::new(db);

    let order = orders
        .add(NewOrder {
            total_price: dec!(18.90),
            product_ids: vec![1],
            status: OrderStatus::Received,
        })
        .await
        .expect("insert order");
    let new_payment = NewPayment {
        order_id: order.id,
        amount: order.total_price,
        status: PaymentStatus::Pending,
    };

    let payment = payments.add(new_payment.clone()).await.expect("insert payment");
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert!(!payment.orphaned);

    assert_matches!(
        payments.add(new_payment).await,
        Err(ServiceError::PaymentAlreadyExists(id)) if id == order.id
    );

    let approved = payments
        .update_status(order.id, PaymentStatus::Approved)
        .await
        .expect("update payment");
    assert_eq!(approved.status, PaymentStatus::Approved);

    orders.delete(order.id).await.expect("delete order");
    assert!(payments.mark_orphaned(order.id).await.expect("mark orphaned"));
    let kept = payments
        .get_by_order_id(order.id)
        .await
        .expect("lookup")
        .expect("payment kept");
    assert!(kept.orphaned);
    assert_eq!(kept.status, PaymentStatus::Approved);

    assert!(!payments.mark_orphaned(12_345).await.expect("no-op"));
    assert_matches!(
        payments.update_status(12_345, PaymentStatus::Approved).await,
        Err(ServiceError::PaymentNotFound(12_345))
    );
}

#[tokio::test]
async fn order_delete_and_orphan_flag_commit_together() {
    let (_dir, db) = migrated_db().await;
    let orders = OrderRepository::new(db.clone());
    let payments = PaymentRepository::new(db);

    let order = orders
        .add(NewOrder {
            total_price: dec!(7.00),
            product_ids: vec![1],
            status: OrderStatus::Received,
        })
        .await
        .expect("insert order");
    payments
        .add(NewPayment {
            order_id: order.id,
            amount: order.total_price,
            status: PaymentStatus::Approved,
        })
        .await
        .expect("insert payment");

    let flagged = orders
        .delete_and_orphan_payment(order.id, &payments)
        .await
        .expect("delete order");
    assert!(flagged);
    assert!(orders.get(order.id).await.expect("lookup").is_none());
    let kept = payments
        .get_by_order_id(order.id)
        .await
        .expect("lookup")
        .expect("payment kept");
    assert!(kept.orphaned);

    // A payment whose order id was never stored stays unflagged.
    payments
        .add(NewPayment {
            order_id: 4_242,
            amount: dec!(1.00),
            status: PaymentStatus::Pending,
        })
        .await
        .expect("insert stray payment");
    assert_matches!(
        orders.delete_and_orphan_payment(4_242, &payments).await,
        Err(ServiceError::OrderNotFound(4_242))
    );
    let stray = payments
        .get_by_order_id(4_242)
        .await
        .expect("lookup")
        .expect("stray payment");
    assert!(!stray.orphaned);
}

#[tokio::test]
async fn database_backed_state_runs_the_checkout_flow() {
    let (_dir, db) = migrated_db().await;
    let cfg = AppConfig::new(
        "sqlite::memory:".into(),
        "127.0.0.1".into(),
        8080,
        "development".into(),
    );
    let state = AppState::with_database(cfg, db);

    let product = state
        .products
        .create_product(burger())
        .await
        .expect("create product");
    let order = state
        .orders
        .create_order(vec![product.id, product.id])
        .await
        .expect("checkout");
    assert_eq!(order.total_price, dec!(21.00));
    assert_eq!(order.products.len(), 2);

    let payment = state
        .payments
        .create_payment(order.id)
        .await
        .expect("create payment");
    assert_eq!(payment.status, PaymentStatus::Pending);

    let synced = state
        .payments
        .sync_with_gateway(order.id)
        .await
        .expect("sync with mock gateway");
    assert_eq!(synced.status, PaymentStatus::Approved);

    let finished = state
        .orders
        .update_order_status(order.id, "FINISHED")
        .await
        .expect("finish order");
    assert_eq!(finished.status, OrderStatus::Finished);
}

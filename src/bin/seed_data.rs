//! Seed data script - populates the catalog with the fast-food menu
//!
//! Run with: cargo run --bin seed-data
//!
//! Products that already exist (by name) are left untouched, so the
//! script can be re-run safely.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{info, warn};

use fastfood_api::{
    config, db,
    errors::ServiceError,
    models::{NewProduct, ProductCategory},
    repositories::ProductRepository,
    services::ProductService,
};

fn menu() -> Vec<(&'static str, Decimal, ProductCategory)> {
    vec![
        // Lanches
        ("X-Burger", dec!(18.90), ProductCategory::Lanche),
        ("X-Salada", dec!(20.90), ProductCategory::Lanche),
        ("X-Bacon", dec!(23.50), ProductCategory::Lanche),
        ("Cheeseburger Duplo", dec!(27.00), ProductCategory::Lanche),
        // Acompanhamentos
        ("Batata Frita Média", dec!(9.90), ProductCategory::Acompanhamento),
        ("Onion Rings", dec!(11.50), ProductCategory::Acompanhamento),
        ("Nuggets 6 unidades", dec!(12.00), ProductCategory::Acompanhamento),
        // Bebidas
        ("Refrigerante Lata", dec!(6.00), ProductCategory::Bebida),
        ("Suco de Laranja", dec!(8.50), ProductCategory::Bebida),
        ("Milkshake de Chocolate", dec!(15.90), ProductCategory::Bebida),
        // Sobremesas
        ("Sundae de Morango", dec!(10.90), ProductCategory::Sobremesa),
        ("Torta de Maçã", dec!(7.50), ProductCategory::Sobremesa),
    ]
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config()?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Fast Food API Seed Data ===");

    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    let products = ProductService::new(Arc::new(ProductRepository::new(Arc::new(pool))));

    let mut created = 0usize;
    let mut skipped = 0usize;
    for (name, price, category) in menu() {
        let item = NewProduct {
            name: name.to_string(),
            price,
            category,
        };
        match products.create_product(item).await {
            Ok(product) => {
                info!(product_id = product.id, name, %price, %category, "product created");
                created += 1;
            }
            Err(ServiceError::Conflict(_)) => {
                info!(name, "product already present; skipping");
                skipped += 1;
            }
            Err(e) => {
                warn!(name, error = %e, "failed to seed product");
                return Err(e.into());
            }
        }
    }

    info!(created, skipped, "=== Seed Data Complete ===");
    info!("Try: curl http://{}:{}/api/v1/products", cfg.host, cfg.port);
    info!("Or explore interactively at: http://{}:{}/swagger-ui", cfg.host, cfg.port);

    Ok(())
}

//! Integration tests for Pineapple Cart.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests
//! cargo test -p pineapple-cart-integration-tests
//!
//! # Including PostgreSQL checkpoint tests
//! CART_DATABASE_URL=postgres://localhost/pineapple_cart_test \
//!     cargo test -p pineapple-cart-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_properties` - Cart behaviour against in-memory stores
//! - `cart_tower_sessions` - Cart backed by a `tower_sessions::Session`
//! - `cart_postgres` - Checkpoints in `PostgreSQL`

#![allow(clippy::expect_used)]

use std::sync::Arc;

use pineapple_cart::{Cart, CartConfig, EventLog, MemoryCheckpointStore, MemorySessionStore};
use pineapple_cart_core::{Buyable, CartOptions, ItemId, Model, Models};
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;

/// Cart over in-memory stores, recording its events.
pub type MemoryCart = Cart<MemorySessionStore, Arc<MemoryCheckpointStore>, EventLog>;

/// Parse a decimal literal.
#[must_use]
pub fn dec(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// A catalog product.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
}

impl Product {
    #[must_use]
    pub fn new(id: i64, name: &str, price: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            price: dec(price),
        }
    }
}

impl Model for Product {
    const NAME: &'static str = "product";
}

impl Buyable for Product {
    fn buyable_identifier(&self, _options: &CartOptions) -> ItemId {
        ItemId::from(self.id)
    }

    fn buyable_description(&self, _options: &CartOptions) -> String {
        self.name.clone()
    }

    fn buyable_price(&self, _options: &CartOptions) -> Decimal {
        self.price
    }
}

/// Model registry with a `product` record for id 1.
#[must_use]
pub fn models() -> Models {
    Models::new().with_record(Product::NAME, 1, json!({"handle": "pineapple"}))
}

/// A fresh in-memory cart and a handle on its event log.
#[must_use]
pub fn memory_cart() -> (MemoryCart, EventLog) {
    let events = EventLog::new();
    let cart = Cart::new(
        MemorySessionStore::new(),
        Arc::new(MemoryCheckpointStore::new()),
        CartConfig::default(),
    )
    .with_events(events.clone())
    .with_models(models());
    (cart, events)
}

/// Connect to the database configured by `CART_DATABASE_URL` and migrate it.
///
/// # Panics
///
/// Panics if the configuration is invalid, `CART_DATABASE_URL` is unset, or
/// the database is unreachable.
pub async fn pg_pool() -> PgPool {
    let config = CartConfig::from_env().expect("Invalid cart configuration");
    let url = config
        .database_url
        .expect("CART_DATABASE_URL must be set");
    let pool = pineapple_cart::db::create_pool(&url)
        .await
        .expect("Failed to connect to database");
    pineapple_cart::db::migrate(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

/// Identifier unique to this test process, so runs don't collide.
#[must_use]
pub fn unique_identifier(label: &str) -> String {
    format!("it-{}-{label}", std::process::id())
}

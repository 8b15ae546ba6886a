//! Cart backed by a `tower_sessions::Session`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use pineapple_cart::{Cart, CartConfig, MemoryCheckpointStore, NewLine, NoopEvents};
use pineapple_cart_core::CartContent;
use pineapple_cart_integration_tests::{Product, dec};
use tower_sessions::{MemoryStore, Session};

fn session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

#[tokio::test]
async fn test_cart_content_lives_in_session() {
    let session = session();
    let cart = Cart::new(
        session.clone(),
        MemoryCheckpointStore::new(),
        CartConfig::default(),
    )
    .with_events(NoopEvents);

    let line = cart
        .add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")).quantity(dec("2")))
        .await
        .unwrap();

    let stored: CartContent = session.get("cart.default").await.unwrap().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(
        stored.get(line.row_id().as_str()).unwrap().quantity(),
        dec("2")
    );
}

#[tokio::test]
async fn test_instances_use_separate_session_keys() {
    let session = session();
    let mut cart = Cart::new(
        session.clone(),
        MemoryCheckpointStore::new(),
        CartConfig::default(),
    )
    .with_events(NoopEvents);

    cart.add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")))
        .await
        .unwrap();
    cart.instance(Some("wishlist"));
    cart.add(NewLine::buyable(&Product::new(2, "Mango", "2.50")))
        .await
        .unwrap();
    cart.destroy().await.unwrap();

    assert!(session.get_value("cart.wishlist").await.unwrap().is_none());
    assert!(session.get_value("cart.default").await.unwrap().is_some());
}

#[tokio::test]
async fn test_reading_empty_cart_leaves_session_untouched() {
    let session = session();
    let cart = Cart::new(
        session.clone(),
        MemoryCheckpointStore::new(),
        CartConfig::default(),
    );

    assert_eq!(cart.count().await.unwrap(), dec("0"));
    assert!(session.is_empty().await);
}

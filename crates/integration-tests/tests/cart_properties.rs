//! Cart behaviour against in-memory stores.

#![allow(clippy::unwrap_used)]

use pineapple_cart::{Error, LineUpdate, NewLine};
use pineapple_cart_core::{
    CartError, CartOptions, Field, ItemId, LineAttributes, ModelRef, RowId,
};
use pineapple_cart_integration_tests::{Product, dec, memory_cart};
use rust_decimal::Decimal;

fn cart_error(err: Error) -> CartError {
    err.as_cart_error().cloned().unwrap()
}

// ============================================================================
// Row identity
// ============================================================================

#[test]
fn test_row_id_ignores_option_order() {
    let mut forward = CartOptions::new();
    forward.insert("size", "XL");
    forward.insert("color", "red");
    let mut backward = CartOptions::new();
    backward.insert("color", "red");
    backward.insert("size", "XL");

    let id = ItemId::from(1);
    assert_eq!(RowId::derive(&id, &forward), RowId::derive(&id, &backward));
    assert_ne!(
        RowId::derive(&id, &forward),
        RowId::derive(&id, &CartOptions::from([("size", "XL"), ("color", "blue")]))
    );
    assert_ne!(
        RowId::derive(&id, &forward),
        RowId::derive(&ItemId::from(2), &forward)
    );
}

// ============================================================================
// Add / update / remove
// ============================================================================

#[tokio::test]
async fn test_adding_twice_merges_into_one_line() {
    let (cart, _) = memory_cart();
    let product = Product::new(1, "Pineapple", "4.95");

    cart.add(NewLine::buyable(&product).quantity(dec("2")))
        .await
        .unwrap();
    let line = cart
        .add(NewLine::buyable(&product).quantity(dec("3")))
        .await
        .unwrap();

    assert_eq!(line.quantity(), dec("5"));
    assert_eq!(cart.content().await.unwrap().len(), 1);
    assert_eq!(cart.count().await.unwrap(), dec("5"));
}

#[tokio::test]
async fn test_update_to_zero_or_negative_removes_line() {
    for qty in [Decimal::ZERO, dec("-1")] {
        let (cart, events) = memory_cart();
        let line = cart
            .add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")))
            .await
            .unwrap();

        let updated = cart.update(line.row_id().as_str(), qty).await.unwrap();

        assert!(updated.is_none());
        assert!(cart.content().await.unwrap().is_empty());
        assert!(events.was_triggered("cart.removed"));
        assert!(!events.was_triggered("cart.updated"));
    }
}

#[tokio::test]
async fn test_update_attributes_with_zero_quantity_removes_line() {
    let (cart, events) = memory_cart();
    let line = cart
        .add(NewLine::item(1, "Pineapple", dec("2"), dec("4.95")))
        .await
        .unwrap();

    let change = LineUpdate::from(LineAttributes::new().qty(Decimal::ZERO));
    assert!(cart.update(line.row_id().as_str(), change).await.unwrap().is_none());
    assert_eq!(events.names(), vec!["cart.added", "cart.removed"]);
}

#[tokio::test]
async fn test_option_change_merges_on_collision() {
    let (cart, events) = memory_cart();
    let product = Product::new(1, "Shirt", "19.95");

    let red = cart
        .add(
            NewLine::buyable(&product)
                .options([("color", "red")])
                .quantity(dec("1")),
        )
        .await
        .unwrap();
    let blue = cart
        .add(
            NewLine::buyable(&product)
                .options([("color", "blue")])
                .quantity(dec("4")),
        )
        .await
        .unwrap();

    let merged = cart
        .update(
            blue.row_id().as_str(),
            LineAttributes::new().options([("color", "red")]),
        )
        .await
        .unwrap()
        .unwrap();

    let content = cart.content().await.unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(merged.row_id(), red.row_id());
    assert_eq!(
        content.get(red.row_id().as_str()).unwrap().quantity(),
        dec("5")
    );
    assert!(!content.has(blue.row_id().as_str()));
    assert_eq!(events.names().last(), Some(&"cart.updated"));
}

#[tokio::test]
async fn test_line_lifecycle_events() {
    let (cart, events) = memory_cart();
    let line = cart
        .add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")))
        .await
        .unwrap();
    cart.update(line.row_id().as_str(), dec("3")).await.unwrap();
    cart.remove(line.row_id().as_str()).await.unwrap();

    assert_eq!(
        events.names(),
        vec!["cart.added", "cart.updated", "cart.removed"]
    );
    let recorded = events.events();
    assert!(recorded.iter().all(|e| e.row_id.as_ref() == Some(line.row_id())));
}

// ============================================================================
// Amounts
// ============================================================================

#[tokio::test]
async fn test_default_tax_rate_arithmetic() {
    let (cart, _) = memory_cart();
    let line = cart
        .add(NewLine::buyable(&Product::new(1, "Pineapple", "10.00")))
        .await
        .unwrap();
    let row_id = line.row_id().as_str();

    assert_eq!(line.tax_rate(), dec("21"));
    assert_eq!(line.tax(), dec("2.10"));

    let line = cart.update(row_id, dec("2")).await.unwrap().unwrap();
    assert_eq!(line.total(), dec("24.20"));

    cart.set_tax(row_id, dec("19")).await.unwrap();
    assert_eq!(cart.get(row_id).await.unwrap().tax(), dec("1.90"));
}

#[tokio::test]
async fn test_aggregate_totals() {
    let (cart, _) = memory_cart();
    cart.add_all([
        NewLine::item(1, "First", dec("1"), dec("10.00")).tax_rate(dec("19")),
        NewLine::item(2, "Second", dec("2"), dec("20.00")).tax_rate(dec("19")),
    ])
    .await
    .unwrap();

    assert_eq!(cart.subtotal(None).await.unwrap(), "50.00");
    assert_eq!(cart.tax(None).await.unwrap(), "9.50");
    assert_eq!(cart.total(None).await.unwrap(), "59.50");
}

// ============================================================================
// Instances
// ============================================================================

#[tokio::test]
async fn test_instances_are_isolated() {
    let (mut cart, _) = memory_cart();
    cart.add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")))
        .await
        .unwrap();

    cart.instance(Some("wishlist"));
    assert_eq!(cart.count().await.unwrap(), Decimal::ZERO);
    cart.add(NewLine::buyable(&Product::new(2, "Mango", "2.50")).quantity(dec("3")))
        .await
        .unwrap();

    cart.instance(None);
    assert_eq!(cart.count().await.unwrap(), Decimal::ONE);
    cart.destroy().await.unwrap();
    assert_eq!(cart.count().await.unwrap(), Decimal::ZERO);

    cart.instance(Some("wishlist"));
    assert_eq!(cart.count().await.unwrap(), dec("3"));
}

// ============================================================================
// Checkpoints
// ============================================================================

#[tokio::test]
async fn test_store_then_restore_round_trips() {
    let (cart, _) = memory_cart();
    cart.add(
        NewLine::buyable(&Product::new(1, "Shirt", "19.95"))
            .options([("size", "XL")])
            .quantity(dec("2")),
    )
    .await
    .unwrap();
    cart.add(NewLine::item("sku-7", "Socks", dec("0.5"), dec("3.00")).tax_rate(dec("9")))
        .await
        .unwrap();
    let before = serde_json::to_value(cart.content().await.unwrap()).unwrap();

    cart.store("user-42").await.unwrap();
    cart.destroy().await.unwrap();
    cart.restore("user-42").await.unwrap();

    let after = serde_json::to_value(cart.content().await.unwrap()).unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_restore_overwrites_live_lines() {
    let (cart, _) = memory_cart();
    let product = Product::new(1, "Pineapple", "4.95");
    let line = cart.add(NewLine::buyable(&product)).await.unwrap();
    cart.store("user-42").await.unwrap();

    cart.add(NewLine::buyable(&product).quantity(dec("4")))
        .await
        .unwrap();
    cart.restore("user-42").await.unwrap();

    assert_eq!(
        cart.get(line.row_id().as_str()).await.unwrap().quantity(),
        Decimal::ONE
    );
}

#[tokio::test]
async fn test_fractional_option_survives_store_and_restore() {
    let (cart, _) = memory_cart();
    let attributes = LineAttributes::from_json(&serde_json::json!({
        "id": 1,
        "name": "Rope",
        "qty": 1,
        "price": 2,
        "options": {"length": 1.5},
    }))
    .unwrap();

    let line = cart.add(NewLine::attributes(attributes)).await.unwrap();
    cart.store("user-42").await.unwrap();
    cart.destroy().await.unwrap();
    cart.restore("user-42").await.unwrap();

    let restored = cart.get(line.row_id().as_str()).await.unwrap();
    assert_eq!(restored.row_id(), line.row_id());
    assert_eq!(restored.options(), line.options());
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_invalid_lines_are_rejected() {
    let (cart, _) = memory_cart();

    let cases = [
        (NewLine::item("", "Pineapple", dec("1"), dec("4.95")), Field::Identifier),
        (NewLine::item(1, "", dec("1"), dec("4.95")), Field::Name),
        (NewLine::item(1, "Pineapple", dec("1"), dec("-4.95")), Field::Price),
        (NewLine::item(1, "Pineapple", dec("0"), dec("4.95")), Field::Quantity),
    ];
    for (line, field) in cases {
        let err = cart.add(line).await.unwrap_err();
        assert_eq!(cart_error(err), CartError::InvalidArgument(field));
    }
    assert!(cart.content().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_huge_tax_rate_is_rejected_without_panicking() {
    let (cart, _) = memory_cart();
    let huge = dec("1000000000000000");
    let line = cart
        .add(NewLine::item(1, "Pineapple", Decimal::ONE, huge))
        .await
        .unwrap();

    let err = cart.set_tax(line.row_id().as_str(), huge).await.unwrap_err();

    assert_eq!(cart_error(err), CartError::InvalidArgument(Field::TaxRate));
    assert!(cart.tax(None).await.is_ok());
    assert!(cart.totals().await.is_ok());
}

#[test]
fn test_non_numeric_price_is_rejected() {
    let attributes = serde_json::json!({
        "id": 1,
        "name": "Pineapple",
        "qty": 1,
        "price": "four ninety-five",
    });

    assert_eq!(
        LineAttributes::from_json(&attributes).unwrap_err(),
        CartError::InvalidArgument(Field::Price)
    );
}

#[tokio::test]
async fn test_unknown_row_id_is_rejected() {
    let (cart, _) = memory_cart();
    let missing = "does-not-exist";
    let expected = CartError::InvalidRowId(missing.to_string());

    assert_eq!(cart_error(cart.get(missing).await.unwrap_err()), expected);
    assert_eq!(
        cart_error(cart.update(missing, dec("2")).await.unwrap_err()),
        expected
    );
    assert_eq!(cart_error(cart.remove(missing).await.unwrap_err()), expected);
    assert_eq!(
        cart_error(
            cart.associate(missing, ModelRef::of::<Product>())
                .await
                .unwrap_err()
        ),
        expected
    );
    assert_eq!(
        cart_error(cart.set_tax(missing, dec("19")).await.unwrap_err()),
        expected
    );
}

#[tokio::test]
async fn test_unknown_model_fails_before_lookup() {
    let (cart, _) = memory_cart();

    let err = cart.associate("does-not-exist", "Order").await.unwrap_err();
    assert_eq!(
        cart_error(err),
        CartError::UnknownModel("Order".to_string())
    );
}

#[tokio::test]
async fn test_associated_model_in_json() {
    let (cart, _) = memory_cart();
    let line = cart
        .add(NewLine::buyable(&Product::new(1, "Pineapple", "4.95")))
        .await
        .unwrap();

    cart.associate(line.row_id().as_str(), "product").await.unwrap();

    let line = cart.get(line.row_id().as_str()).await.unwrap();
    let json = line.to_json(Some(cart.models()));
    assert_eq!(json["model"]["handle"], "pineapple");
    assert_eq!(json["id"], 1);
}

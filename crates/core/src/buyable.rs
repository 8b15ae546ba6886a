//! The item-description capability consumed by the cart.

use rust_decimal::Decimal;

use crate::types::{CartOptions, ItemId};

/// Something that can be put in a cart.
///
/// The cart only reads from a buyable; it never mutates it. Each method
/// receives the options the line is (or will be) held under, so a catalog
/// can price or describe variants differently.
pub trait Buyable {
    /// Catalog identifier of the item.
    fn buyable_identifier(&self, options: &CartOptions) -> ItemId;

    /// Human-readable description (title) of the item.
    fn buyable_description(&self, options: &CartOptions) -> String;

    /// Net unit price of the item.
    fn buyable_price(&self, options: &CartOptions) -> Decimal;

    /// Model the item belongs to. When set, lines added from this item are
    /// associated with it automatically.
    fn buyable_model(&self) -> Option<&'static str> {
        None
    }
}

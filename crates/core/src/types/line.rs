//! Cart line items.
//!
//! A [`CartLine`] stores identity, quantity, net unit price, options and tax
//! rate. Everything else (tax, price with tax, subtotal, total, tax total)
//! is derived on read and never stored.
//!
//! The line's [`RowId`] is always the one derived from its current item id
//! and options: every mutation that can touch either recomputes it.
//!
//! Every mutation also checks that the derived amounts fit in a
//! [`Decimal`], so reading them never overflows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use super::{CartOptions, ItemId, LineAttributes, NumberFormat, RowId};
use crate::buyable::Buyable;
use crate::error::{CartError, Field};
use crate::model::{ModelRef, Models};

/// A derived or stored amount of a line, for formatted output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineAmount {
    /// Net unit price.
    Price,
    /// Unit price including tax.
    PriceWithTax,
    /// Quantity times net unit price.
    Subtotal,
    /// Quantity times unit price including tax.
    Total,
    /// Tax on one unit.
    Tax,
    /// Tax on the whole line.
    TaxTotal,
}

/// One line item of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LineRecord", into = "LineRecord")]
pub struct CartLine {
    row_id: RowId,
    id: ItemId,
    qty: Decimal,
    name: String,
    price: Decimal,
    options: CartOptions,
    tax_rate: Decimal,
    is_saved: bool,
    associated_model: Option<String>,
}

impl CartLine {
    /// Create a line with quantity 1 and no tax.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the identifier or name is
    /// empty, or the price is negative.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Decimal,
        options: CartOptions,
    ) -> Result<Self, CartError> {
        let id = id.into();
        let name = name.into();
        validate(&id, &name, price)?;

        Ok(Self {
            row_id: RowId::derive(&id, &options),
            id,
            qty: Decimal::ONE,
            name,
            price,
            options,
            tax_rate: Decimal::ZERO,
            is_saved: false,
            associated_model: None,
        })
    }

    /// Create a line from a buyable item held under `options`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the buyable describes an
    /// invalid line.
    pub fn from_buyable<B: Buyable + ?Sized>(
        item: &B,
        options: CartOptions,
    ) -> Result<Self, CartError> {
        Self::new(
            item.buyable_identifier(&options),
            item.buyable_description(&options),
            item.buyable_price(&options),
            options,
        )
    }

    /// Create a line from a complete attribute mapping.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` naming the first missing or
    /// invalid attribute. `id`, `name`, `price` and `qty` are required.
    pub fn from_attributes(attributes: LineAttributes) -> Result<Self, CartError> {
        let id = attributes
            .id
            .ok_or(CartError::InvalidArgument(Field::Identifier))?;
        let name = attributes
            .name
            .ok_or(CartError::InvalidArgument(Field::Name))?;
        let price = attributes
            .price
            .ok_or(CartError::InvalidArgument(Field::Price))?;
        let qty = attributes
            .qty
            .ok_or(CartError::InvalidArgument(Field::Quantity))?;

        let mut line = Self::new(id, name, price, attributes.options.unwrap_or_default())?;
        line.set_quantity(qty)?;
        Ok(line)
    }

    // ---------------------------------------------------------------------
    // Stored fields
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn row_id(&self) -> &RowId {
        &self.row_id
    }

    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub const fn quantity(&self) -> Decimal {
        self.qty
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Net unit price.
    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn options(&self) -> &CartOptions {
        &self.options
    }

    /// Tax rate in percent.
    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Whether the line is saved for later.
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.is_saved
    }

    /// Name of the associated model, if any.
    #[must_use]
    pub fn associated_model(&self) -> Option<&str> {
        self.associated_model.as_deref()
    }

    // ---------------------------------------------------------------------
    // Derived amounts
    // ---------------------------------------------------------------------

    // The mutators keep every amount below in range; saturating is a floor,
    // not a code path.

    /// Tax on one unit: `price * tax_rate / 100`.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.price.saturating_mul(self.tax_rate) / Decimal::ONE_HUNDRED
    }

    #[must_use]
    pub fn price_with_tax(&self) -> Decimal {
        self.price.saturating_add(self.tax())
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.qty.saturating_mul(self.price)
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.qty.saturating_mul(self.price_with_tax())
    }

    #[must_use]
    pub fn tax_total(&self) -> Decimal {
        self.tax().saturating_mul(self.qty)
    }

    #[must_use]
    pub fn amount(&self, amount: LineAmount) -> Decimal {
        match amount {
            LineAmount::Price => self.price,
            LineAmount::PriceWithTax => self.price_with_tax(),
            LineAmount::Subtotal => self.subtotal(),
            LineAmount::Total => self.total(),
            LineAmount::Tax => self.tax(),
            LineAmount::TaxTotal => self.tax_total(),
        }
    }

    /// Render an amount with the given number format.
    #[must_use]
    pub fn formatted(&self, amount: LineAmount, format: &NumberFormat) -> String {
        format.format(self.amount(amount))
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Set the quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` unless `qty` is positive and
    /// the line's amounts stay in range.
    pub fn set_quantity(&mut self, qty: Decimal) -> Result<(), CartError> {
        if qty <= Decimal::ZERO {
            return Err(CartError::InvalidArgument(Field::Quantity));
        }
        check_amounts(self.price, qty, self.tax_rate)?;
        self.qty = qty;
        Ok(())
    }

    /// Add `qty` to the current quantity. The sum may be zero or negative.
    ///
    /// Used when two lines collapse into one row. The caller is responsible
    /// for dropping the line if the sum is not positive.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the sum or the line's amounts
    /// would overflow; the line is left unchanged.
    pub fn add_quantity(&mut self, qty: Decimal) -> Result<(), CartError> {
        let sum = self
            .qty
            .checked_add(qty)
            .ok_or(CartError::InvalidArgument(Field::Quantity))?;
        check_amounts(self.price, sum, self.tax_rate)?;
        self.qty = sum;
        Ok(())
    }

    /// Refresh id, name and price from a buyable, using the current options.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the buyable describes an
    /// invalid line; the line is left unchanged.
    pub fn update_from_buyable<B: Buyable + ?Sized>(&mut self, item: &B) -> Result<(), CartError> {
        let id = item.buyable_identifier(&self.options);
        let name = item.buyable_description(&self.options);
        let price = item.buyable_price(&self.options);
        validate(&id, &name, price)?;
        check_amounts(price, self.qty, self.tax_rate)?;

        self.row_id = RowId::derive(&id, &self.options);
        self.id = id;
        self.name = name;
        self.price = price;
        Ok(())
    }

    /// Apply the attributes present in `attributes`.
    ///
    /// A present `qty` is taken as-is, including zero or negative values, so
    /// the caller can detect a line that should be dropped.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the patched identity, name or
    /// price would be invalid, or the amounts would overflow; the line is
    /// left unchanged.
    pub fn update_from_attributes(&mut self, attributes: LineAttributes) -> Result<(), CartError> {
        let id = attributes.id.unwrap_or_else(|| self.id.clone());
        let name = attributes.name.unwrap_or_else(|| self.name.clone());
        let price = attributes.price.unwrap_or(self.price);
        let qty = attributes.qty.unwrap_or(self.qty);
        validate(&id, &name, price)?;
        check_amounts(price, qty, self.tax_rate)?;

        if let Some(options) = attributes.options {
            self.options = options;
        }
        self.qty = qty;
        self.row_id = RowId::derive(&id, &self.options);
        self.id = id;
        self.name = name;
        self.price = price;
        Ok(())
    }

    /// Associate the line with a model.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownModel` if `model` names a model the
    /// registry does not know.
    pub fn associate(&mut self, model: &ModelRef, models: &Models) -> Result<(), CartError> {
        self.associated_model = Some(model.resolve(models)?);
        Ok(())
    }

    /// Set the tax rate, in percent. Any rate is accepted as long as the
    /// line's amounts stay in range.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the taxed amounts would
    /// overflow; the rate is left unchanged.
    pub fn set_tax_rate(&mut self, tax_rate: Decimal) -> Result<(), CartError> {
        check_amounts(self.price, self.qty, tax_rate)?;
        self.tax_rate = tax_rate;
        Ok(())
    }

    pub fn set_saved(&mut self, saved: bool) {
        self.is_saved = saved;
    }

    // ---------------------------------------------------------------------
    // Serialization
    // ---------------------------------------------------------------------

    /// Flat mapping of stored and derived fields.
    #[must_use]
    pub fn to_map(&self) -> Map<String, JsonValue> {
        let value = json!({
            "rowId": self.row_id,
            "id": self.id,
            "name": self.name,
            "qty": self.qty,
            "price": self.price,
            "options": self.options,
            "tax": self.tax(),
            "isSaved": self.is_saved,
            "subtotal": self.subtotal(),
        });
        match value {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// JSON form of [`to_map`](Self::to_map).
    ///
    /// When `models` is given and the line is associated, a `model` field is
    /// appended holding the associated record (or `null` if the registry has
    /// no record for this item).
    #[must_use]
    pub fn to_json(&self, models: Option<&Models>) -> JsonValue {
        let mut map = self.to_map();
        if let (Some(models), Some(model)) = (models, self.associated_model.as_deref()) {
            let record = models.find(model, &self.id).cloned().unwrap_or(JsonValue::Null);
            map.insert("model".to_string(), record);
        }
        JsonValue::Object(map)
    }
}

fn validate(id: &ItemId, name: &str, price: Decimal) -> Result<(), CartError> {
    if id.is_empty() {
        return Err(CartError::InvalidArgument(Field::Identifier));
    }
    if name.is_empty() {
        return Err(CartError::InvalidArgument(Field::Name));
    }
    if price < Decimal::ZERO {
        return Err(CartError::InvalidArgument(Field::Price));
    }
    Ok(())
}

/// Check that every derived amount of a line fits in a `Decimal`.
fn check_amounts(price: Decimal, qty: Decimal, tax_rate: Decimal) -> Result<(), CartError> {
    let tax = price
        .checked_mul(tax_rate)
        .and_then(|tax| tax.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(CartError::InvalidArgument(Field::TaxRate))?;
    let price_with_tax = price
        .checked_add(tax)
        .ok_or(CartError::InvalidArgument(Field::TaxRate))?;

    qty.checked_mul(price)
        .ok_or(CartError::InvalidArgument(Field::Quantity))?;
    qty.checked_mul(price_with_tax)
        .and_then(|_| tax.checked_mul(qty))
        .ok_or(CartError::InvalidArgument(Field::Quantity))?;
    Ok(())
}

/// Persisted shape of a line.
///
/// The row id is written for readability but re-derived on load, so a
/// stored line can never come back under a stale key.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineRecord {
    #[serde(default)]
    row_id: Option<RowId>,
    id: ItemId,
    name: String,
    qty: Decimal,
    price: Decimal,
    #[serde(default)]
    options: CartOptions,
    #[serde(default)]
    tax_rate: Decimal,
    #[serde(default)]
    is_saved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    associated_model: Option<String>,
}

impl From<CartLine> for LineRecord {
    fn from(line: CartLine) -> Self {
        Self {
            row_id: Some(line.row_id),
            id: line.id,
            name: line.name,
            qty: line.qty,
            price: line.price,
            options: line.options,
            tax_rate: line.tax_rate,
            is_saved: line.is_saved,
            associated_model: line.associated_model,
        }
    }
}

impl TryFrom<LineRecord> for CartLine {
    type Error = CartError;

    fn try_from(record: LineRecord) -> Result<Self, Self::Error> {
        let mut line = Self::new(record.id, record.name, record.price, record.options)?;
        line.set_quantity(record.qty)?;
        line.set_tax_rate(record.tax_rate)?;
        line.is_saved = record.is_saved;
        line.associated_model = record.associated_model;
        Ok(line)
    }
}

//! Raw attribute mappings for creating and patching cart lines.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use super::{CartOptions, ItemId};
use crate::error::{CartError, Field};

/// A partial set of line attributes.
///
/// Used both to create a line from a plain mapping (where `id`, `name`,
/// `price` and `qty` are required) and to patch an existing line (where
/// only the present fields are applied).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineAttributes {
    pub id: Option<ItemId>,
    pub name: Option<String>,
    pub qty: Option<Decimal>,
    pub price: Option<Decimal>,
    pub options: Option<CartOptions>,
}

impl LineAttributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn qty(mut self, qty: Decimal) -> Self {
        self.qty = Some(qty);
        self
    }

    #[must_use]
    pub const fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn options(mut self, options: impl Into<CartOptions>) -> Self {
        self.options = Some(options.into());
        self
    }

    /// Parse attributes from a JSON object such as a submitted form.
    ///
    /// Numbers may be given as JSON numbers or numeric strings. Unknown keys
    /// are ignored; `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` naming the first field whose
    /// value has the wrong shape, or `Field::Identifier` if `value` is not
    /// an object at all.
    pub fn from_json(value: &JsonValue) -> Result<Self, CartError> {
        let object = value
            .as_object()
            .ok_or(CartError::InvalidArgument(Field::Identifier))?;
        let present = |key: &str| object.get(key).filter(|v| !v.is_null());

        let id = present("id")
            .map(|v| match v {
                JsonValue::Number(n) => n.as_i64().map(ItemId::Number),
                JsonValue::String(s) => Some(ItemId::Text(s.clone())),
                _ => None,
            })
            .map(|id| id.ok_or(CartError::InvalidArgument(Field::Identifier)))
            .transpose()?;

        let name = present("name")
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or(CartError::InvalidArgument(Field::Name))
            })
            .transpose()?;

        let qty = present("qty")
            .map(|v| json_decimal(v).ok_or(CartError::InvalidArgument(Field::Quantity)))
            .transpose()?;

        let price = present("price")
            .map(|v| json_decimal(v).ok_or(CartError::InvalidArgument(Field::Price)))
            .transpose()?;

        let options = present("options")
            .map(|v| {
                serde_json::from_value::<CartOptions>(v.clone())
                    .map_err(|_| CartError::InvalidArgument(Field::Options))
            })
            .transpose()?;

        Ok(Self {
            id,
            name,
            qty,
            price,
            options,
        })
    }
}

/// Read a decimal from a JSON number or numeric string.
fn json_decimal(value: &JsonValue) -> Option<Decimal> {
    match value {
        JsonValue::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        JsonValue::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

//! Inputs accepted by [`Cart::add`](crate::Cart::add) and
//! [`Cart::update`](crate::Cart::update).

use std::fmt;

use pineapple_cart_core::{
    Buyable, CartError, CartLine, CartOptions, ItemId, LineAttributes, ModelRef,
};
use rust_decimal::Decimal;

/// A line to add to a cart.
///
/// ```ignore
/// cart.add(NewLine::buyable(&product).quantity(dec!(2)).options([("size", "XL")])).await?;
/// cart.add(NewLine::item(293, "Pineapple", dec!(1), dec!(4.95))).await?;
/// ```
pub enum NewLine<'a> {
    /// A catalog item. Quantity defaults to 1.
    Buyable {
        item: &'a (dyn Buyable + Sync),
        quantity: Option<Decimal>,
        options: CartOptions,
        tax_rate: Option<Decimal>,
    },
    /// A raw attribute mapping; `id`, `name`, `qty` and `price` are required.
    Attributes {
        attributes: LineAttributes,
        tax_rate: Option<Decimal>,
    },
    /// A prepared line, added as-is unless a tax rate is given.
    Line {
        line: CartLine,
        tax_rate: Option<Decimal>,
    },
}

impl<'a> NewLine<'a> {
    pub fn buyable<B: Buyable + Sync>(item: &'a B) -> Self {
        Self::Buyable {
            item,
            quantity: None,
            options: CartOptions::new(),
            tax_rate: None,
        }
    }

    #[must_use]
    pub const fn attributes(attributes: LineAttributes) -> Self {
        Self::Attributes {
            attributes,
            tax_rate: None,
        }
    }

    /// A line described field by field.
    pub fn item(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::attributes(
            LineAttributes::new()
                .id(id)
                .name(name)
                .qty(quantity)
                .price(price),
        )
    }

    #[must_use]
    pub fn quantity(mut self, qty: Decimal) -> Self {
        match &mut self {
            Self::Buyable { quantity, .. } => *quantity = Some(qty),
            Self::Attributes { attributes, .. } => attributes.qty = Some(qty),
            Self::Line { .. } => {}
        }
        self
    }

    #[must_use]
    pub fn options(mut self, options: impl Into<CartOptions>) -> Self {
        let new_options = options.into();
        match &mut self {
            Self::Buyable { options, .. } => *options = new_options,
            Self::Attributes { attributes, .. } => attributes.options = Some(new_options),
            Self::Line { .. } => {}
        }
        self
    }

    /// Tax rate in percent. Without one, the configured default applies.
    #[must_use]
    pub fn tax_rate(mut self, rate: Decimal) -> Self {
        match &mut self {
            Self::Buyable { tax_rate, .. }
            | Self::Attributes { tax_rate, .. }
            | Self::Line { tax_rate, .. } => *tax_rate = Some(rate),
        }
        self
    }

    /// Build the line, along with the model it should be associated with.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for an invalid line or a tax
    /// rate that puts its amounts out of range.
    pub(crate) fn build(
        self,
        default_tax_rate: Decimal,
    ) -> Result<(CartLine, Option<ModelRef>), CartError> {
        match self {
            Self::Buyable {
                item,
                quantity,
                options,
                tax_rate,
            } => {
                let mut line = CartLine::from_buyable(item, options)?;
                line.set_quantity(quantity.unwrap_or(Decimal::ONE))?;
                line.set_tax_rate(tax_rate.unwrap_or(default_tax_rate))?;
                Ok((line, item.buyable_model().map(ModelRef::Typed)))
            }
            Self::Attributes {
                attributes,
                tax_rate,
            } => {
                let mut line = CartLine::from_attributes(attributes)?;
                line.set_tax_rate(tax_rate.unwrap_or(default_tax_rate))?;
                Ok((line, None))
            }
            Self::Line { mut line, tax_rate } => {
                if let Some(rate) = tax_rate {
                    line.set_tax_rate(rate)?;
                }
                Ok((line, None))
            }
        }
    }
}

impl From<LineAttributes> for NewLine<'_> {
    fn from(attributes: LineAttributes) -> Self {
        Self::attributes(attributes)
    }
}

impl From<CartLine> for NewLine<'_> {
    fn from(line: CartLine) -> Self {
        Self::Line {
            line,
            tax_rate: None,
        }
    }
}

impl fmt::Debug for NewLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyable {
                quantity,
                options,
                tax_rate,
                ..
            } => f
                .debug_struct("Buyable")
                .field("quantity", quantity)
                .field("options", options)
                .field("tax_rate", tax_rate)
                .finish_non_exhaustive(),
            Self::Attributes {
                attributes,
                tax_rate,
            } => f
                .debug_struct("Attributes")
                .field("attributes", attributes)
                .field("tax_rate", tax_rate)
                .finish(),
            Self::Line { line, tax_rate } => f
                .debug_struct("Line")
                .field("line", line)
                .field("tax_rate", tax_rate)
                .finish(),
        }
    }
}

/// A change to an existing line.
pub enum LineUpdate<'a> {
    /// Refresh id, name and price from a catalog item.
    Buyable(&'a (dyn Buyable + Sync)),
    /// Apply the present attributes. A `qty` of zero or less removes the line.
    Attributes(LineAttributes),
    /// Replace the quantity. Zero or less removes the line.
    Quantity(Decimal),
}

impl fmt::Debug for LineUpdate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buyable(_) => f.write_str("Buyable(..)"),
            Self::Attributes(attributes) => f.debug_tuple("Attributes").field(attributes).finish(),
            Self::Quantity(qty) => f.debug_tuple("Quantity").field(qty).finish(),
        }
    }
}

impl<'a, B: Buyable + Sync> From<&'a B> for LineUpdate<'a> {
    fn from(item: &'a B) -> Self {
        Self::Buyable(item)
    }
}

impl From<LineAttributes> for LineUpdate<'_> {
    fn from(attributes: LineAttributes) -> Self {
        Self::Attributes(attributes)
    }
}

impl From<Decimal> for LineUpdate<'_> {
    fn from(qty: Decimal) -> Self {
        Self::Quantity(qty)
    }
}

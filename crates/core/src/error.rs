//! Cart error taxonomy.

use core::fmt;

use thiserror::Error;

/// The line attribute that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Identifier,
    Name,
    Price,
    Quantity,
    Options,
    TaxRate,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Name => write!(f, "name"),
            Self::Price => write!(f, "price"),
            Self::Quantity => write!(f, "quantity"),
            Self::Options => write!(f, "options"),
            Self::TaxRate => write!(f, "tax rate"),
        }
    }
}

/// Errors raised by cart lines and cart content.
///
/// All variants are terminal for the call that produced them: nothing is
/// written back when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Malformed input for a line attribute.
    #[error("Please supply a valid {0}.")]
    InvalidArgument(Field),

    /// The addressed row is not in the cart.
    #[error("The cart does not contain rowId {0}.")]
    InvalidRowId(String),

    /// An association target that the model registry does not know.
    #[error("The supplied model {0} does not exist.")]
    UnknownModel(String),
}

impl CartError {
    /// The offending field, for `InvalidArgument` errors.
    #[must_use]
    pub const fn field(&self) -> Option<Field> {
        match self {
            Self::InvalidArgument(field) => Some(*field),
            _ => None,
        }
    }
}

//! Catalog identifiers for cart lines.

use core::fmt;

use serde::{Deserialize, Serialize};

/// External catalog identifier of the item behind a cart line.
///
/// Catalogs key their items either by number or by string (SKU, handle,
/// GID), so both are accepted. The two never compare equal: `1` and `"1"`
/// are different items and derive different row ids.
///
/// ```
/// use pineapple_cart_core::ItemId;
///
/// assert_eq!(ItemId::from(42).to_string(), "42");
/// assert_eq!(ItemId::from("sku-42").to_string(), "sku-42");
/// assert_ne!(ItemId::from(1), ItemId::from("1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Whether this identifier is blank and so cannot name an item.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Number(_) => false,
            Self::Text(text) => text.trim().is_empty(),
        }
    }

    /// The numeric value, if this is a numeric identifier.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => write!(f, "{id}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self::Number(id)
    }
}

impl From<i32> for ItemId {
    fn from(id: i32) -> Self {
        Self::Number(i64::from(id))
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

//! Content-addressed row keys.
//!
//! A row id is the hex SHA-256 digest of the canonical JSON encoding of
//! `[item_id, options]`. Options are a [`CartOptions`], whose keys are
//! always sorted, so the encoding (and therefore the id) only depends on
//! the option set, not on the order it was built in.

use core::borrow::Borrow;
use core::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{CartOptions, ItemId};

/// Key of a line within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// Derive the row id for an item and its options.
    ///
    /// ```
    /// use pineapple_cart_core::{CartOptions, RowId};
    ///
    /// let a = RowId::derive(&1.into(), &CartOptions::from([("size", "L"), ("color", "red")]));
    /// let b = RowId::derive(&1.into(), &CartOptions::from([("color", "red"), ("size", "L")]));
    /// assert_eq!(a, b);
    ///
    /// let c = RowId::derive(&1.into(), &CartOptions::from([("color", "blue"), ("size", "L")]));
    /// assert_ne!(a, c);
    /// ```
    #[must_use]
    pub fn derive(item_id: &ItemId, options: &CartOptions) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_bytes(item_id, options));
        Self(hex::encode(hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Canonical byte encoding of an item identity.
///
/// Item ids and option sets are scalars and string-keyed maps, which
/// `serde_json` always encodes. The fallback still carries both parts so
/// distinct items can never share a row.
fn canonical_bytes(item_id: &ItemId, options: &CartOptions) -> Vec<u8> {
    match serde_json::to_vec(&(item_id, options)) {
        Ok(bytes) => bytes,
        Err(_) => format!("{item_id}:{options:?}").into_bytes(),
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RowId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RowId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RowId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RowId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

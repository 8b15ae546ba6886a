//! Variant options attached to a cart line (size, color, engraving, ...).

use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// A scalar option value.
///
/// Whole numbers that fit an `i64` are `Integer`; any other JSON number
/// (fractions, large unsigned values) is kept as written in `Number`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Number(Number),
    Text(String),
}

impl OptionValue {
    /// Returns the value as a string slice if it is textual.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric option value from a float. `None` for NaN or infinity.
    #[must_use]
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Number> for OptionValue {
    fn from(value: Number) -> Self {
        value.as_i64().map_or(Self::Number(value), Self::Integer)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Normalized option set of a cart line.
///
/// Keys are kept in ascending order, so two option sets built from the same
/// pairs in any insertion order are equal and serialize identically.
///
/// ```
/// use pineapple_cart_core::CartOptions;
///
/// let a = CartOptions::from([("size", "L"), ("color", "red")]);
/// let b = CartOptions::from([("color", "red"), ("size", "L")]);
/// assert_eq!(a, b);
/// assert_eq!(a.keys().collect::<Vec<_>>(), ["color", "size"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartOptions(BTreeMap<String, OptionValue>);

impl CartOptions {
    /// Create an empty option set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set an option, returning the previous value for the key.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OptionValue>,
    ) -> Option<OptionValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for CartOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for CartOptions
where
    K: Into<String>,
    V: Into<OptionValue>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_is_irrelevant() {
        let mut a = CartOptions::new();
        a.insert("size", "XL");
        a.insert("color", "red");

        let mut b = CartOptions::new();
        b.insert("color", "red");
        b.insert("size", "XL");

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_mixed_scalars_deserialize() {
        let options: CartOptions =
            serde_json::from_str(r#"{"engraved":true,"size":42,"color":"red"}"#).unwrap();

        assert_eq!(options.get("engraved"), Some(&OptionValue::Bool(true)));
        assert_eq!(options.get("size"), Some(&OptionValue::Integer(42)));
        assert_eq!(options.get("color").and_then(OptionValue::as_str), Some("red"));
    }

    #[test]
    fn test_fractional_value_round_trips() {
        let options: CartOptions = serde_json::from_str(r#"{"length":1.5,"size":42}"#).unwrap();

        assert_eq!(options.get("length"), OptionValue::from_f64(1.5).as_ref());
        assert_eq!(options.get("size"), Some(&OptionValue::Integer(42)));
        assert_eq!(options.get("length").unwrap().to_string(), "1.5");
        assert_eq!(
            serde_json::to_string(&options).unwrap(),
            r#"{"length":1.5,"size":42}"#
        );
    }

    #[test]
    fn test_insert_replaces() {
        let mut options = CartOptions::from([("color", "red")]);
        let previous = options.insert("color", "blue");

        assert_eq!(previous, Some(OptionValue::from("red")));
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("color").unwrap().to_string(), "blue");
    }
}

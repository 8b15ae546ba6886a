//! Associations between cart lines and catalog models.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::error::CartError;
use crate::types::ItemId;

/// A type that cart lines can be associated with.
pub trait Model {
    /// Name the model is registered and stored under.
    const NAME: &'static str;
}

/// Reference to an association target.
///
/// A `Named` reference is checked against the [`Models`] registry before
/// use. A `Typed` reference comes from a [`Model`] implementation and is
/// taken as valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Named(String),
    Typed(&'static str),
}

impl ModelRef {
    /// Reference to the model implemented by `M`.
    #[must_use]
    pub const fn of<M: Model>() -> Self {
        Self::Typed(M::NAME)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Typed(name) => name,
        }
    }

    /// Resolve the reference to a model name.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownModel` for a named reference the registry
    /// does not contain.
    pub fn resolve(&self, models: &Models) -> Result<String, CartError> {
        match self {
            Self::Named(name) if !models.contains(name) => {
                Err(CartError::UnknownModel(name.clone()))
            }
            _ => Ok(self.name().to_owned()),
        }
    }
}

impl From<&str> for ModelRef {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for ModelRef {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// Registry of known models and their records.
///
/// Records are looked up by the line's item id when a serialized line asks
/// for its associated model.
#[derive(Debug, Clone, Default)]
pub struct Models {
    models: HashMap<String, HashMap<ItemId, JsonValue>>,
}

impl Models {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model by name.
    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>) -> Self {
        self.models.entry(name.into()).or_default();
        self
    }

    /// Register the model implemented by `M`.
    #[must_use]
    pub fn with<M: Model>(self) -> Self {
        self.with_model(M::NAME)
    }

    /// Register a record of a model, registering the model if needed.
    #[must_use]
    pub fn with_record(
        mut self,
        name: impl Into<String>,
        id: impl Into<ItemId>,
        record: JsonValue,
    ) -> Self {
        self.models
            .entry(name.into())
            .or_default()
            .insert(id.into(), record);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Look up the record of `name` with the given id.
    #[must_use]
    pub fn find(&self, name: &str, id: &ItemId) -> Option<&JsonValue> {
        self.models.get(name).and_then(|records| records.get(id))
    }
}

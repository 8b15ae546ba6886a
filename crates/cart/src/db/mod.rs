//! Checkpoint storage for stored carts.
//!
//! A checkpoint is the serialized content of one cart instance, addressed by
//! `(identifier, instance)`. Storing under an existing address replaces the
//! previous checkpoint.
//!
//! # Table: `shopping_cart`
//!
//! - `identifier` - Caller-chosen checkpoint identifier (e.g. a user id)
//! - `instance` - Cart instance name the content was stored from
//! - `content` - Serialized cart content (opaque to the store)
//! - `created_at`, `updated_at`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/cart/migrations/` and can be applied
//! with [`migrate`] (requires the `postgres` feature).

#[cfg(feature = "postgres")]
pub mod checkpoints;

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::RwLock;

#[cfg(feature = "postgres")]
pub use checkpoints::{PgCheckpointRepository, create_pool, migrate};

/// Errors that can occur during checkpoint operations.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Database error from sqlx.
    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cart content could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// A stored cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub identifier: String,
    pub instance: String,
    /// Serialized cart content.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named-blob repository for stored carts.
pub trait CheckpointStore: Send + Sync {
    /// Replace any checkpoint at `(checkpoint.identifier, checkpoint.instance)`.
    fn upsert(
        &self,
        checkpoint: Checkpoint,
    ) -> impl Future<Output = Result<(), CheckpointError>> + Send;

    /// The checkpoint at `(identifier, instance)`, if any.
    fn find(
        &self,
        identifier: &str,
        instance: &str,
    ) -> impl Future<Output = Result<Option<Checkpoint>, CheckpointError>> + Send;

    /// Delete the checkpoint at `(identifier, instance)`, returning whether
    /// one existed.
    fn delete(
        &self,
        identifier: &str,
        instance: &str,
    ) -> impl Future<Output = Result<bool, CheckpointError>> + Send;

    /// Delete every checkpoint stored under `identifier`, returning how
    /// many were removed.
    fn delete_all(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<u64, CheckpointError>> + Send;
}

/// In-memory checkpoint store.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    checkpoints: RwLock<HashMap<(String, String), Checkpoint>>,
}

impl MemoryCheckpointStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored checkpoints.
    pub async fn len(&self) -> usize {
        self.checkpoints.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.checkpoints.read().await.is_empty()
    }
}

fn address(identifier: &str, instance: &str) -> (String, String) {
    (identifier.to_owned(), instance.to_owned())
}

impl CheckpointStore for MemoryCheckpointStore {
    async fn upsert(&self, checkpoint: Checkpoint) -> Result<(), CheckpointError> {
        let key = address(&checkpoint.identifier, &checkpoint.instance);
        self.checkpoints.write().await.insert(key, checkpoint);
        Ok(())
    }

    async fn find(
        &self,
        identifier: &str,
        instance: &str,
    ) -> Result<Option<Checkpoint>, CheckpointError> {
        Ok(self
            .checkpoints
            .read()
            .await
            .get(&address(identifier, instance))
            .cloned())
    }

    async fn delete(&self, identifier: &str, instance: &str) -> Result<bool, CheckpointError> {
        Ok(self
            .checkpoints
            .write()
            .await
            .remove(&address(identifier, instance))
            .is_some())
    }

    async fn delete_all(&self, identifier: &str) -> Result<u64, CheckpointError> {
        let mut checkpoints = self.checkpoints.write().await;
        let before = checkpoints.len();
        checkpoints.retain(|(id, _), _| id != identifier);
        Ok((before - checkpoints.len()) as u64)
    }
}

impl<T: CheckpointStore> CheckpointStore for std::sync::Arc<T> {
    fn upsert(
        &self,
        checkpoint: Checkpoint,
    ) -> impl Future<Output = Result<(), CheckpointError>> + Send {
        (**self).upsert(checkpoint)
    }

    fn find(
        &self,
        identifier: &str,
        instance: &str,
    ) -> impl Future<Output = Result<Option<Checkpoint>, CheckpointError>> + Send {
        (**self).find(identifier, instance)
    }

    fn delete(
        &self,
        identifier: &str,
        instance: &str,
    ) -> impl Future<Output = Result<bool, CheckpointError>> + Send {
        (**self).delete(identifier, instance)
    }

    fn delete_all(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<u64, CheckpointError>> + Send {
        (**self).delete_all(identifier)
    }
}

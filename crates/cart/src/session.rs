//! Session storage for live cart content.
//!
//! The live content of each cart instance is held under a session key of
//! the form `cart.<instance>`. Two stores are provided:
//!
//! - [`MemorySessionStore`] - in-process `moka` cache, for tests and
//!   single-process deployments
//! - `tower_sessions::Session` (with the `tower-sessions` feature) - the
//!   request session managed by a `SessionManagerLayer`

use std::future::Future;

use moka::future::Cache;
use pineapple_cart_core::CartContent;
use thiserror::Error;

/// Session keys for cart data.
pub mod keys {
    /// Namespace prefix of every cart session key.
    pub const NAMESPACE: &str = "cart";

    /// Name of the instance used when none is selected.
    pub const DEFAULT_INSTANCE: &str = "default";

    /// Session key holding the content of `instance`.
    #[must_use]
    pub fn cart(instance: &str) -> String {
        format!("{NAMESPACE}.{instance}")
    }
}

/// Errors from a session backend.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend failed to load or save the session.
    #[error("session backend: {0}")]
    Backend(String),
}

/// Keyed container holding live cart content for the current session.
pub trait SessionStore: Send + Sync {
    /// Whether content is stored under `key`.
    fn has(&self, key: &str) -> impl Future<Output = Result<bool, SessionError>> + Send;

    /// Content stored under `key`, if any.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<CartContent>, SessionError>> + Send;

    /// Store `content` under `key`, replacing what was there.
    fn set(
        &self,
        key: &str,
        content: &CartContent,
    ) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Delete whatever is stored under `key`.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), SessionError>> + Send;
}

/// In-memory session store.
///
/// Clones share the same underlying cache, so a clone can be handed to a
/// [`Cart`](crate::Cart) while the first handle is kept for inspection.
#[derive(Clone)]
pub struct MemorySessionStore {
    cache: Cache<String, CartContent>,
}

impl MemorySessionStore {
    /// Create an empty store with no capacity bound or expiry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: Cache::builder().build(),
        }
    }

    /// Create a store that evicts cart content idle for longer than `idle`.
    #[must_use]
    pub fn with_idle_timeout(idle: std::time::Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_idle(idle).build(),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

impl SessionStore for MemorySessionStore {
    async fn has(&self, key: &str) -> Result<bool, SessionError> {
        Ok(self.cache.contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<CartContent>, SessionError> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, content: &CartContent) -> Result<(), SessionError> {
        self.cache.insert(key.to_owned(), content.clone()).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[cfg(feature = "tower-sessions")]
mod tower {
    use pineapple_cart_core::CartContent;
    use tower_sessions::Session;

    use super::{SessionError, SessionStore};

    impl From<tower_sessions::session::Error> for SessionError {
        fn from(err: tower_sessions::session::Error) -> Self {
            Self::Backend(err.to_string())
        }
    }

    impl SessionStore for Session {
        async fn has(&self, key: &str) -> Result<bool, SessionError> {
            Ok(self.get_value(key).await?.is_some())
        }

        async fn get(&self, key: &str) -> Result<Option<CartContent>, SessionError> {
            Ok(Self::get::<CartContent>(self, key).await?)
        }

        async fn set(&self, key: &str, content: &CartContent) -> Result<(), SessionError> {
            self.insert(key, content).await?;
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), SessionError> {
            self.remove_value(key).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pineapple_cart_core::{CartLine, CartOptions};
    use rust_decimal::Decimal;

    use super::*;

    fn content() -> CartContent {
        let line = CartLine::new(1, "Item name", Decimal::TEN, CartOptions::new()).unwrap();
        [line].into_iter().collect()
    }

    #[test]
    fn test_cart_key() {
        assert_eq!(keys::cart("default"), "cart.default");
        assert_eq!(keys::cart("wishlist"), "cart.wishlist");
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        let key = keys::cart(keys::DEFAULT_INSTANCE);

        assert!(!store.has(&key).await.unwrap());
        assert!(store.get(&key).await.unwrap().is_none());

        store.set(&key, &content()).await.unwrap();
        assert!(store.has(&key).await.unwrap());
        assert_eq!(store.get(&key).await.unwrap(), Some(content()));

        store.remove(&key).await.unwrap();
        assert!(!store.has(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemorySessionStore::new();
        let clone = store.clone();

        clone.set("cart.default", &content()).await.unwrap();
        assert!(store.has("cart.default").await.unwrap());
        assert!(!store.has("cart.wishlist").await.unwrap());
    }

    #[cfg(feature = "tower-sessions")]
    #[tokio::test]
    async fn test_tower_session_store() {
        use std::sync::Arc;

        use tower_sessions::{MemoryStore, Session};

        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        let key = keys::cart(keys::DEFAULT_INSTANCE);

        assert!(!SessionStore::has(&session, &key).await.unwrap());
        SessionStore::set(&session, &key, &content()).await.unwrap();
        assert_eq!(
            SessionStore::get(&session, &key).await.unwrap(),
            Some(content())
        );
        SessionStore::remove(&session, &key).await.unwrap();
        assert!(SessionStore::get(&session, &key).await.unwrap().is_none());
    }
}

//! Unified error handling for cart operations.
//!
//! Cart errors (invalid input, unknown rows, unknown models) come from
//! `pineapple-cart-core`. Collaborator errors from the session store or the
//! checkpoint store are passed through unchanged.

use pineapple_cart_core::CartError;
use thiserror::Error;

use crate::db::CheckpointError;
use crate::session::SessionError;

/// Error type for [`Cart`](crate::Cart) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input, unknown row id, or unknown model.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Checkpoint store operation failed.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl Error {
    /// The cart error, if this is one.
    #[must_use]
    pub const fn as_cart_error(&self) -> Option<&CartError> {
        match self {
            Self::Cart(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for cart operations.
pub type Result<T> = std::result::Result<T, Error>;

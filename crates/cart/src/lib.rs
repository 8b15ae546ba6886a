//! Pineapple Cart - Session-scoped shopping cart service.
//!
//! This crate provides the cart service and the collaborators it talks to:
//! - [`Cart`] - add, update and remove lines; totals; store and restore
//! - [`SessionStore`] - where the live content of each instance is kept
//! - [`CheckpointStore`] - where stored carts are persisted
//! - [`EventSink`] - receiver of `cart.*` lifecycle events
//!
//! # Features
//!
//! - `postgres` - [`PgCheckpointRepository`](db::PgCheckpointRepository)
//!   backed by `sqlx`, with bundled migrations
//! - `tower-sessions` - [`SessionStore`] for `tower_sessions::Session`
//!
//! # Modules
//!
//! - [`cart`] - The cart service
//! - [`config`] - Environment-driven configuration
//! - [`db`] - Checkpoint storage
//! - [`events`] - Lifecycle events and sinks
//! - [`input`] - Line inputs for `add` and `update`
//! - [`session`] - Session storage
//! - [`error`] - Error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod input;
pub mod session;

pub use cart::Cart;
pub use config::{CartConfig, ConfigError};
pub use db::{Checkpoint, CheckpointError, CheckpointStore, MemoryCheckpointStore};
pub use error::{Error, Result};
pub use events::{CartEvent, EventLog, EventSink, NoopEvents, RecordedEvent, TracingEvents};
pub use input::{LineUpdate, NewLine};
pub use session::{MemorySessionStore, SessionError, SessionStore};

pub use pineapple_cart_core as core;

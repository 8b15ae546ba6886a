//! Pineapple Cart Core - Cart line items and pricing types.
//!
//! This crate provides the types shared by every cart component:
//! - [`RowId`] - content-addressed line keys derived from item id + options
//! - [`CartLine`] - a line item with derived tax, subtotal and total
//! - [`CartContent`] - the ordered line collection of one cart instance
//! - [`NumberFormat`] - presentation formatting for amounts
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no session or
//! database access. Orchestration and storage live in `pineapple-cart`.
//!
//! # Modules
//!
//! - [`types`] - Line, content and value types
//! - [`buyable`] - The item-description capability lines are built from
//! - [`model`] - Line associations and the model registry
//! - [`error`] - Error taxonomy

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod buyable;
pub mod error;
pub mod model;
pub mod types;

pub use buyable::Buyable;
pub use error::{CartError, Field};
pub use model::{Model, ModelRef, Models};
pub use types::*;

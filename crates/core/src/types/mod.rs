//! Core cart types.
//!
//! This module provides the line-item model and the value types it is built
//! from.

pub mod attributes;
pub mod content;
pub mod format;
pub mod item_id;
pub mod line;
pub mod options;
pub mod row_id;

pub use attributes::LineAttributes;
pub use content::{CartContent, CartTotals};
pub use format::NumberFormat;
pub use item_id::ItemId;
pub use line::{CartLine, LineAmount};
pub use options::{CartOptions, OptionValue};
pub use row_id::RowId;

//! Cart lifecycle notifications.
//!
//! The cart notifies an [`EventSink`] after each successful mutation:
//! `cart.added`, `cart.updated` and `cart.removed` carry the affected line;
//! `cart.stored` and `cart.restored` carry nothing. Sinks are
//! fire-and-forget.

use std::sync::{Arc, Mutex, PoisonError};

use pineapple_cart_core::{CartLine, RowId};

/// A cart lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartEvent<'a> {
    Added(&'a CartLine),
    Updated(&'a CartLine),
    Removed(&'a CartLine),
    Stored,
    Restored,
}

impl CartEvent<'_> {
    /// Event name, e.g. `cart.added`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Added(_) => "cart.added",
            Self::Updated(_) => "cart.updated",
            Self::Removed(_) => "cart.removed",
            Self::Stored => "cart.stored",
            Self::Restored => "cart.restored",
        }
    }

    /// The line the event is about, if any.
    #[must_use]
    pub const fn line(&self) -> Option<&CartLine> {
        match self {
            Self::Added(line) | Self::Updated(line) | Self::Removed(line) => Some(line),
            Self::Stored | Self::Restored => None,
        }
    }
}

/// Receiver of cart lifecycle events.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &CartEvent<'_>);
}

/// Emits every event as a `tracing` event at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn notify(&self, event: &CartEvent<'_>) {
        match event.line() {
            Some(line) => tracing::info!(
                event = event.name(),
                row_id = %line.row_id(),
                item_id = %line.id(),
                qty = %line.quantity(),
                "Cart event"
            ),
            None => tracing::info!(event = event.name(), "Cart event"),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl EventSink for NoopEvents {
    fn notify(&self, _event: &CartEvent<'_>) {}
}

/// A recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub name: &'static str,
    pub row_id: Option<RowId>,
}

/// Records events in memory.
///
/// Clones share the same log, so keep one clone to inspect what a cart
/// emitted.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Names of all recorded events, oldest first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events().into_iter().map(|e| e.name).collect()
    }

    /// Whether an event with `name` was recorded.
    #[must_use]
    pub fn was_triggered(&self, name: &str) -> bool {
        self.events().iter().any(|e| e.name == name)
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl EventSink for EventLog {
    fn notify(&self, event: &CartEvent<'_>) {
        let recorded = RecordedEvent {
            name: event.name(),
            row_id: event.line().map(|line| line.row_id().clone()),
        };
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(recorded);
    }
}

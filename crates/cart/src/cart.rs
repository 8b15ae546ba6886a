//! The cart service.
//!
//! A [`Cart`] operates on one named instance at a time. Every operation
//! reads the live content of that instance from the session store, applies
//! its change and writes the content back; the cart itself holds no line
//! state between calls.

use chrono::Utc;
use pineapple_cart_core::{
    CartContent, CartError, CartLine, CartTotals, LineAttributes, ModelRef, Models, NumberFormat,
    RowId,
};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::config::CartConfig;
use crate::db::{Checkpoint, CheckpointError, CheckpointStore};
use crate::error::Result;
use crate::events::{CartEvent, EventSink, TracingEvents};
use crate::input::{LineUpdate, NewLine};
use crate::session::{SessionStore, keys};

/// Session-scoped shopping cart.
///
/// # Example
///
/// ```ignore
/// let mut cart = Cart::new(session, checkpoints, CartConfig::from_env()?);
///
/// let line = cart.add(NewLine::buyable(&product).quantity(dec!(2))).await?;
/// cart.update(line.row_id().as_str(), dec!(3)).await?;
///
/// cart.instance(Some("wishlist"));
/// cart.add(NewLine::buyable(&other)).await?;
/// cart.store("user-42").await?;
/// ```
#[derive(Debug)]
pub struct Cart<S, C, E = TracingEvents> {
    session: S,
    checkpoints: C,
    events: E,
    models: Models,
    config: CartConfig,
    instance: String,
}

impl<S: SessionStore, C: CheckpointStore> Cart<S, C> {
    /// Create a cart on the default instance, reporting events to `tracing`.
    pub fn new(session: S, checkpoints: C, config: CartConfig) -> Self {
        Self {
            session,
            checkpoints,
            events: TracingEvents,
            models: Models::new(),
            config,
            instance: keys::DEFAULT_INSTANCE.to_string(),
        }
    }
}

impl<S: SessionStore, C: CheckpointStore, E: EventSink> Cart<S, C, E> {
    /// Replace the event sink.
    pub fn with_events<E2: EventSink>(self, events: E2) -> Cart<S, C, E2> {
        Cart {
            session: self.session,
            checkpoints: self.checkpoints,
            events,
            models: self.models,
            config: self.config,
            instance: self.instance,
        }
    }

    /// Set the registry named model references are resolved against.
    #[must_use]
    pub fn with_models(mut self, models: Models) -> Self {
        self.models = models;
        self
    }

    /// Switch to another instance. `None` selects the default instance.
    pub fn instance(&mut self, name: Option<&str>) -> &mut Self {
        self.instance = name.unwrap_or(keys::DEFAULT_INSTANCE).to_string();
        self
    }

    #[must_use]
    pub fn current_instance(&self) -> &str {
        &self.instance
    }

    #[must_use]
    pub const fn config(&self) -> &CartConfig {
        &self.config
    }

    #[must_use]
    pub const fn models(&self) -> &Models {
        &self.models
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Add a line.
    ///
    /// If the cart already holds a line with the same row id, the new
    /// quantity is added to it and its other fields are kept.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` if the line is invalid, or a
    /// collaborator error from the session store.
    #[instrument(skip(self, line), fields(instance = %self.instance))]
    pub async fn add<'a>(&self, line: impl Into<NewLine<'a>>) -> Result<CartLine> {
        let line = self.prepare(line.into())?;
        let mut content = self.load().await?;

        let line = merge(&mut content, line)?;
        self.persist(&content).await?;

        debug!(row_id = %line.row_id(), qty = %line.quantity(), "Added line");
        self.events.notify(&CartEvent::Added(&line));
        Ok(line)
    }

    /// Add several lines at once, returning the resulting lines in input
    /// order.
    ///
    /// Every line is validated before anything is written, so an invalid
    /// line leaves the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidArgument` for the first invalid line, or a
    /// collaborator error from the session store.
    #[instrument(skip(self, lines), fields(instance = %self.instance))]
    pub async fn add_all<'a, I>(&self, lines: I) -> Result<Vec<CartLine>>
    where
        I: IntoIterator,
        I::Item: Into<NewLine<'a>>,
    {
        let prepared = lines
            .into_iter()
            .map(|line| self.prepare(line.into()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut content = self.load().await?;

        let added = prepared
            .into_iter()
            .map(|line| merge(&mut content, line))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.persist(&content).await?;

        debug!(count = added.len(), "Added lines");
        for line in &added {
            self.events.notify(&CartEvent::Added(line));
        }
        Ok(added)
    }

    /// Update a line.
    ///
    /// If the change gives the line a row id that another line already has,
    /// the two are merged by adding quantities. If the resulting quantity is
    /// zero or less the line is removed and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidRowId` if the cart has no line `row_id`,
    /// `CartError::InvalidArgument` if the change is invalid, or a
    /// collaborator error from the session store.
    #[instrument(skip(self, change), fields(instance = %self.instance))]
    pub async fn update<'a>(
        &self,
        row_id: &str,
        change: impl Into<LineUpdate<'a>>,
    ) -> Result<Option<CartLine>> {
        let mut content = self.load().await?;
        let mut line = content.get(row_id).cloned().ok_or_else(|| invalid_row(row_id))?;

        match change.into() {
            LineUpdate::Buyable(item) => line.update_from_buyable(item)?,
            LineUpdate::Attributes(attributes) => line.update_from_attributes(attributes)?,
            LineUpdate::Quantity(qty) => {
                line.update_from_attributes(LineAttributes::new().qty(qty))?;
            }
        }

        if line.row_id().as_str() != row_id {
            content.pull(row_id);
            if let Some(existing) = content.get(line.row_id().as_str()) {
                line.add_quantity(existing.quantity())?;
            }
        }

        if line.quantity() <= Decimal::ZERO {
            content.pull(row_id);
            content.pull(line.row_id().as_str());
            self.persist(&content).await?;

            debug!(row_id = %line.row_id(), "Removed line on update");
            self.events.notify(&CartEvent::Removed(&line));
            return Ok(None);
        }

        content.put(line.clone());
        self.persist(&content).await?;

        debug!(row_id = %line.row_id(), qty = %line.quantity(), "Updated line");
        self.events.notify(&CartEvent::Updated(&line));
        Ok(Some(line))
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidRowId` if the cart has no line `row_id`,
    /// or a collaborator error from the session store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn remove(&self, row_id: &str) -> Result<()> {
        let mut content = self.load().await?;
        let line = content.pull(row_id).ok_or_else(|| invalid_row(row_id))?;
        self.persist(&content).await?;

        debug!("Removed line");
        self.events.notify(&CartEvent::Removed(&line));
        Ok(())
    }

    /// Look up a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidRowId` if the cart has no line `row_id`,
    /// or a collaborator error from the session store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn get(&self, row_id: &str) -> Result<CartLine> {
        self.load()
            .await?
            .get(row_id)
            .cloned()
            .ok_or_else(|| invalid_row(row_id).into())
    }

    /// Associate a line with a model.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownModel` if `model` names a model the
    /// registry does not know (checked before anything else),
    /// `CartError::InvalidRowId` if the cart has no line `row_id`, or a
    /// collaborator error from the session store.
    #[instrument(skip(self, model), fields(instance = %self.instance))]
    pub async fn associate(&self, row_id: &str, model: impl Into<ModelRef>) -> Result<()> {
        let model = model.into();
        model.resolve(&self.models)?;

        let mut content = self.load().await?;
        let line = content.get_mut(row_id).ok_or_else(|| invalid_row(row_id))?;
        line.associate(&model, &self.models)?;
        self.persist(&content).await?;

        debug!(model = model.name(), "Associated line");
        Ok(())
    }

    /// Set the tax rate of a line, in percent.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidRowId` if the cart has no line `row_id`,
    /// `CartError::InvalidArgument` if the rate puts the line's amounts out
    /// of range, or a collaborator error from the session store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn set_tax(&self, row_id: &str, tax_rate: Decimal) -> Result<()> {
        let mut content = self.load().await?;
        content
            .get_mut(row_id)
            .ok_or_else(|| invalid_row(row_id))?
            .set_tax_rate(tax_rate)?;
        self.persist(&content).await?;

        debug!("Set tax rate");
        Ok(())
    }

    // =========================================================================
    // Content
    // =========================================================================

    /// Delete the content of the current instance.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn destroy(&self) -> Result<()> {
        self.session.remove(&self.key()).await?;
        debug!("Destroyed cart instance");
        Ok(())
    }

    /// The lines of the current instance. Reading never creates session
    /// state.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn content(&self) -> Result<CartContent> {
        self.load().await
    }

    /// Sum of line quantities.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn count(&self) -> Result<Decimal> {
        Ok(self.load().await?.count())
    }

    /// Gross total, formatted with `format` or the configured format.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn total(&self, format: Option<&NumberFormat>) -> Result<String> {
        let total = self.load().await?.total();
        Ok(self.number_format(format).format(total))
    }

    /// Total tax, formatted with `format` or the configured format.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn tax(&self, format: Option<&NumberFormat>) -> Result<String> {
        let tax = self.load().await?.tax();
        Ok(self.number_format(format).format(tax))
    }

    /// Net subtotal, formatted with `format` or the configured format.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn subtotal(&self, format: Option<&NumberFormat>) -> Result<String> {
        let subtotal = self.load().await?.subtotal();
        Ok(self.number_format(format).format(subtotal))
    }

    /// Unformatted subtotal, tax and total.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn totals(&self) -> Result<CartTotals> {
        Ok(self.load().await?.totals())
    }

    /// Lines matching `predicate`, in cart order.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session store.
    pub async fn search<F>(&self, predicate: F) -> Result<CartContent>
    where
        F: FnMut(&CartLine, &RowId) -> bool,
    {
        Ok(self.load().await?.filter(predicate))
    }

    // =========================================================================
    // Checkpoints
    // =========================================================================

    /// Store the content of the current instance under `identifier`,
    /// replacing any earlier checkpoint for the same identifier and instance.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the session or checkpoint store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn store(&self, identifier: &str) -> Result<()> {
        let content = self.load().await?;
        let serialized = serde_json::to_string(&content).map_err(CheckpointError::from)?;
        let now = Utc::now();

        self.checkpoints
            .upsert(Checkpoint {
                identifier: identifier.to_string(),
                instance: self.instance.clone(),
                content: serialized,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(lines = content.len(), "Stored cart");
        self.events.notify(&CartEvent::Stored);
        Ok(())
    }

    /// Restore the checkpoint stored under `identifier` for the current
    /// instance.
    ///
    /// Restored lines overwrite live lines with the same row id; other live
    /// lines are kept. Does nothing if there is no such checkpoint.
    ///
    /// # Errors
    ///
    /// Returns `CheckpointError::Serialization` if the checkpoint cannot be
    /// decoded, or a collaborator error from the session or checkpoint store.
    #[instrument(skip(self), fields(instance = %self.instance))]
    pub async fn restore(&self, identifier: &str) -> Result<()> {
        let Some(checkpoint) = self.checkpoints.find(identifier, &self.instance).await? else {
            debug!("No stored cart to restore");
            return Ok(());
        };

        let stored: CartContent =
            serde_json::from_str(&checkpoint.content).map_err(CheckpointError::from)?;
        let key = keys::cart(&checkpoint.instance);
        let mut content = self.session.get(&key).await?.unwrap_or_default();

        let restored = stored.len();
        for line in stored {
            content.put(line);
        }
        self.session.set(&key, &content).await?;

        info!(lines = restored, "Restored cart");
        self.events.notify(&CartEvent::Restored);
        Ok(())
    }

    /// Whether a checkpoint exists under `identifier` for the current
    /// instance.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the checkpoint store.
    pub async fn has_stored(&self, identifier: &str) -> Result<bool> {
        Ok(self
            .checkpoints
            .find(identifier, &self.instance)
            .await?
            .is_some())
    }

    /// Delete every checkpoint under `identifier`, whatever its instance.
    /// Returns whether anything was deleted.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error from the checkpoint store.
    #[instrument(skip(self))]
    pub async fn delete_stored(&self, identifier: &str) -> Result<bool> {
        let deleted = self.checkpoints.delete_all(identifier).await?;
        info!(deleted, "Deleted stored carts");
        Ok(deleted > 0)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn key(&self) -> String {
        keys::cart(&self.instance)
    }

    async fn load(&self) -> Result<CartContent> {
        Ok(self.session.get(&self.key()).await?.unwrap_or_default())
    }

    async fn persist(&self, content: &CartContent) -> Result<()> {
        self.session.set(&self.key(), content).await?;
        Ok(())
    }

    fn prepare(&self, line: NewLine<'_>) -> std::result::Result<CartLine, CartError> {
        let (mut line, model) = line.build(self.config.tax_rate)?;
        if let Some(model) = model {
            line.associate(&model, &self.models)?;
        }
        Ok(line)
    }

    fn number_format<'f>(&'f self, format: Option<&'f NumberFormat>) -> &'f NumberFormat {
        format.unwrap_or(&self.config.format)
    }
}

/// Fold `line` into `content`, returning the line as stored.
fn merge(content: &mut CartContent, line: CartLine) -> std::result::Result<CartLine, CartError> {
    if let Some(existing) = content.get_mut(line.row_id().as_str()) {
        existing.add_quantity(line.quantity())?;
        return Ok(existing.clone());
    }
    content.put(line.clone());
    Ok(line)
}

fn invalid_row(row_id: &str) -> CartError {
    CartError::InvalidRowId(row_id.to_string())
}

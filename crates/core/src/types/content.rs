//! The line collection of one cart instance.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{CartLine, RowId};

/// Aggregate amounts of a cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line subtotals (net).
    pub subtotal: Decimal,
    /// Sum of line tax totals.
    pub tax: Decimal,
    /// Sum of line totals (gross).
    pub total: Decimal,
}

/// Ordered mapping of row id to line.
///
/// Iteration follows insertion order; replacing a line under an existing
/// row id keeps its position. Row ids are unique and always equal to the
/// key their line derives, since the key is taken from the line itself.
///
/// Serializes as a plain sequence of lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContent {
    lines: IndexMap<RowId, CartLine>,
}

impl CartContent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn has(&self, row_id: &str) -> bool {
        self.lines.contains_key(row_id)
    }

    #[must_use]
    pub fn get(&self, row_id: &str) -> Option<&CartLine> {
        self.lines.get(row_id)
    }

    pub fn get_mut(&mut self, row_id: &str) -> Option<&mut CartLine> {
        self.lines.get_mut(row_id)
    }

    #[must_use]
    pub fn first(&self) -> Option<&CartLine> {
        self.lines.first().map(|(_, line)| line)
    }

    /// Store a line under its row id, returning the line it replaced.
    pub fn put(&mut self, line: CartLine) -> Option<CartLine> {
        self.lines.insert(line.row_id().clone(), line)
    }

    /// Remove a line, preserving the order of the rest.
    pub fn pull(&mut self, row_id: &str) -> Option<CartLine> {
        self.lines.shift_remove(row_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RowId, &CartLine)> {
        self.lines.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.values()
    }

    pub fn row_ids(&self) -> impl Iterator<Item = &RowId> {
        self.lines.keys()
    }

    /// Lines matching `predicate`, in cart order.
    #[must_use]
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&CartLine, &RowId) -> bool,
    {
        self.lines
            .iter()
            .filter(|(row_id, line)| predicate(line, row_id))
            .map(|(_, line)| line.clone())
            .collect()
    }

    // Aggregates saturate at the bounds of `Decimal` instead of overflowing.

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> Decimal {
        sum(self.lines().map(CartLine::quantity))
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        sum(self.lines().map(CartLine::subtotal))
    }

    #[must_use]
    pub fn tax(&self) -> Decimal {
        sum(self.lines().map(CartLine::tax_total))
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        sum(self.lines().map(CartLine::total))
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals {
            subtotal: self.subtotal(),
            tax: self.tax(),
            total: self.total(),
        }
    }
}

impl FromIterator<CartLine> for CartContent {
    fn from_iter<I: IntoIterator<Item = CartLine>>(iter: I) -> Self {
        let mut content = Self::new();
        for line in iter {
            content.put(line);
        }
        content
    }
}

impl IntoIterator for CartContent {
    type Item = CartLine;
    type IntoIter = indexmap::map::IntoValues<RowId, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_values()
    }
}

impl Serialize for CartContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.lines.values())
    }
}

impl<'de> Deserialize<'de> for CartContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<CartLine>::deserialize(deserializer)?
            .into_iter()
            .collect())
    }
}

fn sum(amounts: impl Iterator<Item = Decimal>) -> Decimal {
    amounts.fold(Decimal::ZERO, Decimal::saturating_add)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::CartOptions;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn line(id: i64, price: &str, qty: &str, tax_rate: &str) -> CartLine {
        let mut line = CartLine::new(id, "Some title", dec(price), CartOptions::new()).unwrap();
        line.set_quantity(dec(qty)).unwrap();
        line.set_tax_rate(dec(tax_rate)).unwrap();
        line
    }

    #[test]
    fn test_aggregates() {
        let content: CartContent = [line(1, "10.00", "1", "19"), line(2, "20.00", "2", "19")]
            .into_iter()
            .collect();

        assert_eq!(content.count(), dec("3"));
        assert_eq!(
            content.totals(),
            CartTotals {
                subtotal: dec("50.00"),
                tax: dec("9.50"),
                total: dec("59.50"),
            }
        );
    }

    #[test]
    fn test_aggregates_saturate() {
        let content: CartContent = [
            line(1, "50000000000000000000000000000", "1", "0"),
            line(2, "50000000000000000000000000000", "1", "0"),
        ]
        .into_iter()
        .collect();

        assert_eq!(content.subtotal(), Decimal::MAX);
        assert_eq!(content.total(), Decimal::MAX);
        assert_eq!(content.tax(), Decimal::ZERO);
    }

    #[test]
    fn test_empty_aggregates_are_zero() {
        let content = CartContent::new();
        assert_eq!(content.count(), Decimal::ZERO);
        assert_eq!(content.totals(), CartTotals::default());
    }

    #[test]
    fn test_fractional_count() {
        let content: CartContent = [line(1, "4.00", "0.5", "0"), line(2, "4.00", "1.25", "0")]
            .into_iter()
            .collect();
        assert_eq!(content.count(), dec("1.75"));
    }

    #[test]
    fn test_put_replaces_in_place() {
        let mut content: CartContent = [line(1, "1", "1", "0"), line(2, "2", "1", "0")]
            .into_iter()
            .collect();
        let replacement = line(1, "1", "5", "0");
        let row_id = replacement.row_id().clone();

        let previous = content.put(replacement);
        assert_eq!(previous.unwrap().quantity(), dec("1"));
        assert_eq!(content.len(), 2);
        assert_eq!(content.first().unwrap().row_id(), &row_id);
        assert_eq!(content.get(row_id.as_str()).unwrap().quantity(), dec("5"));
    }

    #[test]
    fn test_pull_keeps_order() {
        let lines = [line(1, "1", "1", "0"), line(2, "2", "1", "0"), line(3, "3", "1", "0")];
        let ids: Vec<RowId> = lines.iter().map(|l| l.row_id().clone()).collect();
        let mut content: CartContent = lines.into_iter().collect();

        content.pull(ids[1].as_str());
        let remaining: Vec<&RowId> = content.row_ids().collect();
        assert_eq!(remaining, vec![&ids[0], &ids[2]]);
        assert!(content.pull(ids[1].as_str()).is_none());
    }

    #[test]
    fn test_filter() {
        let content: CartContent = [line(1, "10", "1", "0"), line(2, "20", "1", "0")]
            .into_iter()
            .collect();

        let cheap = content.filter(|line, _| line.price() < dec("15"));
        assert_eq!(cheap.len(), 1);
        assert_eq!(cheap.first().unwrap().price(), dec("10"));

        let by_row = content.filter(|_, row_id| row_id == content.first().unwrap().row_id());
        assert_eq!(by_row.len(), 1);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let content: CartContent = [line(1, "10", "2", "21"), line(2, "20", "1", "21")]
            .into_iter()
            .collect();

        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);

        let restored: CartContent = serde_json::from_value(json).unwrap();
        assert_eq!(restored, content);
    }
}

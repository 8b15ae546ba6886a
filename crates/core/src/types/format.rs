//! Presentation formatting for monetary amounts.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number format used when rendering prices and totals.
///
/// Rounds half away from zero to `decimals` places, then groups the integer
/// part in threes. Formatting never feeds back into stored amounts.
///
/// ```
/// use pineapple_cart_core::NumberFormat;
/// use rust_decimal::Decimal;
///
/// let amount = Decimal::new(123_456_789, 2);
/// assert_eq!(NumberFormat::default().format(amount), "1,234,567.89");
///
/// let european = NumberFormat::default().with_decimal_point(",").with_thousands_separator(".");
/// assert_eq!(european.format(amount), "1.234.567,89");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    /// Digits after the decimal point.
    pub decimals: u32,
    /// Separator between the integer and fractional part.
    pub decimal_point: String,
    /// Separator between groups of three integer digits (may be empty).
    pub thousands_separator: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: 2,
            decimal_point: ".".to_string(),
            thousands_separator: ",".to_string(),
        }
    }
}

impl NumberFormat {
    #[must_use]
    pub const fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    #[must_use]
    pub fn with_decimal_point(mut self, decimal_point: impl Into<String>) -> Self {
        self.decimal_point = decimal_point.into();
        self
    }

    #[must_use]
    pub fn with_thousands_separator(mut self, separator: impl Into<String>) -> Self {
        self.thousands_separator = separator.into();
        self
    }

    /// Render an amount.
    #[must_use]
    pub fn format(&self, value: Decimal) -> String {
        let rounded = value.round_dp_with_strategy(self.decimals, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let plain = format!("{:.*}", self.decimals as usize, rounded.abs());

        let (integer, fraction) = match plain.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (plain.as_str(), None),
        };

        let mut out = String::with_capacity(plain.len() + integer.len() / 3 + 1);
        if negative {
            out.push('-');
        }
        let digits = integer.len();
        for (i, digit) in integer.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                out.push_str(&self.thousands_separator);
            }
            out.push(digit);
        }
        if let Some(fraction) = fraction.filter(|_| self.decimals > 0) {
            out.push_str(&self.decimal_point);
            out.push_str(fraction);
        }
        out
    }
}

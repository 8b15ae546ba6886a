//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `CART_TAX_RATE` - Default tax rate in percent (default: 21)
//! - `CART_DECIMALS` - Digits after the decimal point (default: 2)
//! - `CART_DECIMAL_POINT` - Decimal point (default: `.`)
//! - `CART_THOUSANDS_SEPARATOR` - Thousands separator, may be empty (default: `,`)
//! - `CART_CHECKPOINT_TABLE` - Table holding stored carts (default: `shopping_cart`)
//! - `CART_DATABASE_URL` - `PostgreSQL` connection string for stored carts

use std::str::FromStr;

use pineapple_cart_core::NumberFormat;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Default tax rate in percent.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(21, 0, 0, false, 0);

/// Default table for stored carts.
pub const DEFAULT_CHECKPOINT_TABLE: &str = "shopping_cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
///
/// Read-only to the cart; pass it in explicitly when building a
/// [`Cart`](crate::Cart).
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Tax rate applied to added lines that do not specify one.
    pub tax_rate: Decimal,
    /// Default number format for formatted amounts.
    pub format: NumberFormat,
    /// Table holding stored carts.
    pub checkpoint_table: String,
    /// `PostgreSQL` connection URL for stored carts (contains password)
    pub database_url: Option<SecretString>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            format: NumberFormat::default(),
            checkpoint_table: DEFAULT_CHECKPOINT_TABLE.to_string(),
            database_url: None,
        }
    }
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = Self::default();

        let tax_rate = get_parsed_env("CART_TAX_RATE")?.unwrap_or(defaults.tax_rate);
        let decimals = get_parsed_env::<u32>("CART_DECIMALS")?.unwrap_or(defaults.format.decimals);
        if decimals > 28 {
            return Err(ConfigError::InvalidEnvVar(
                "CART_DECIMALS".to_string(),
                format!("must be at most 28 (got {decimals})"),
            ));
        }

        let format = NumberFormat {
            decimals,
            decimal_point: get_optional_env("CART_DECIMAL_POINT")
                .unwrap_or(defaults.format.decimal_point),
            // An empty separator is meaningful here, so read the raw value.
            thousands_separator: std::env::var("CART_THOUSANDS_SEPARATOR")
                .unwrap_or(defaults.format.thousands_separator),
        };

        let checkpoint_table =
            get_optional_env("CART_CHECKPOINT_TABLE").unwrap_or(defaults.checkpoint_table);
        validate_table_name(&checkpoint_table).map_err(|reason| {
            ConfigError::InvalidEnvVar("CART_CHECKPOINT_TABLE".to_string(), reason)
        })?;

        let database_url = get_optional_env("CART_DATABASE_URL").map(SecretString::from);

        Ok(Self {
            tax_rate,
            format,
            checkpoint_table,
            database_url,
        })
    }
}

fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn get_parsed_env<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
        .transpose()
}

/// Check that a table name is a plain SQL identifier, optionally
/// schema-qualified. The name is interpolated into queries, so nothing
/// else is allowed.
pub(crate) fn validate_table_name(name: &str) -> Result<(), String> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(format!("'{name}' has more than one schema qualifier"));
    }
    for part in parts {
        let mut chars = part.chars();
        let valid_start = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!("'{name}' is not a valid table identifier"));
        }
    }
    Ok(())
}

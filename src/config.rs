use std::time::Duration;

use crate::domain::order::PricingPolicy;

// ============================================================================
// Configuration
// ============================================================================
//
// Read once at startup and treated as immutable for the process lifetime.
// The order settings are handed to the lifecycle manager by value; nothing
// in the domain reads the environment.
//
// ============================================================================

const DEFAULT_PILOTES_PRICE: f64 = 1.33;
const DEFAULT_UPDATE_LIFETIME_SECS: u64 = 300;
const DEFAULT_METRICS_PORT: u16 = 9090;
const MAX_UPDATE_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}")]
    Unparsable { key: &'static str, value: String },

    #[error("unit price must be positive, got {0} cents")]
    NonPositivePrice(i64),

    #[error("unit price must be a finite number, got {0}")]
    NonFinitePrice(f64),

    #[error("unit price exceeds the maximum of {max_cents} cents")]
    PriceOutOfRange { max_cents: i64 },

    #[error("order update lifetime must be greater than zero")]
    EmptyUpdateWindow,

    #[error("order update lifetime is too large: {0:?}")]
    UpdateWindowOutOfRange(Duration),
}

/// Settings consumed by the order core: the unit price and the edit window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderConfig {
    unit_price_in_cents: i64,
    update_window: chrono::Duration,
}

impl OrderConfig {
    pub fn new(unit_price_in_cents: i64, update_window: Duration) -> Result<Self, ConfigError> {
        if unit_price_in_cents <= 0 {
            return Err(ConfigError::NonPositivePrice(unit_price_in_cents));
        }
        if unit_price_in_cents > PricingPolicy::MAX_UNIT_PRICE_IN_CENTS {
            return Err(ConfigError::PriceOutOfRange {
                max_cents: PricingPolicy::MAX_UNIT_PRICE_IN_CENTS,
            });
        }
        if update_window.is_zero() {
            return Err(ConfigError::EmptyUpdateWindow);
        }
        if update_window > MAX_UPDATE_WINDOW {
            return Err(ConfigError::UpdateWindowOutOfRange(update_window));
        }
        let update_window = chrono::Duration::from_std(update_window)
            .map_err(|_| ConfigError::UpdateWindowOutOfRange(update_window))?;

        Ok(Self {
            unit_price_in_cents,
            update_window,
        })
    }

    /// Build from a decimal unit price, rounding to the nearest cent.
    pub fn from_decimal_price(price: f64, update_window: Duration) -> Result<Self, ConfigError> {
        if !price.is_finite() {
            return Err(ConfigError::NonFinitePrice(price));
        }
        // `as` saturates, so check the range before casting.
        let cents = (price * 100.0).round();
        if cents > PricingPolicy::MAX_UNIT_PRICE_IN_CENTS as f64 {
            return Err(ConfigError::PriceOutOfRange {
                max_cents: PricingPolicy::MAX_UNIT_PRICE_IN_CENTS,
            });
        }
        Self::new(cents as i64, update_window)
    }

    pub fn unit_price_in_cents(&self) -> i64 {
        self.unit_price_in_cents
    }

    pub fn update_window(&self) -> chrono::Duration {
        self.update_window
    }
}

/// Process configuration, read from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub order: OrderConfig,
    /// Postgres connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    pub metrics_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests don't touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let price = parse_or(&lookup, "PILOTES_PRICE", DEFAULT_PILOTES_PRICE)?;
        let lifetime_secs = parse_or(
            &lookup,
            "ORDER_UPDATE_LIFETIME_SECS",
            DEFAULT_UPDATE_LIFETIME_SECS,
        )?;
        let metrics_port = parse_or(&lookup, "METRICS_PORT", DEFAULT_METRICS_PORT)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            order: OrderConfig::from_decimal_price(price, Duration::from_secs(lifetime_secs))?,
            database_url,
            metrics_port,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    let parsed = value.trim().parse();
    match parsed {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Unparsable { key, value }),
    }
}

//! Configuration for the reserve pool.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn default_start_price() -> f64 {
    1.0
}

/// Immutable parameters of the reserve pool: opening balances, the monthly
/// price decay rate, the starting reference price, and the simulation length
/// its histories are sized for.
///
/// # Validation
///
/// - Both opening balances finite and non-negative
/// - `price_decay_rate` ∈ [0, 1) — a rate of 1 or more would drive the price
///   to zero or negative, violating the `price > 0` invariant
/// - `start_price` finite and strictly positive
/// - `max_months > 0`
///
/// # Examples
///
/// ```
/// use leaf_liquidity::config::ReserveConfig;
///
/// let config = ReserveConfig::new(1_000_000_000.0, 500_000.0, 0.005, 60)
///     .expect("valid config");
/// assert_eq!(config.max_months(), 60);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveConfig {
    initial_leaf_balance: f64,
    initial_paired_balance: f64,
    price_decay_rate: f64,
    #[serde(default = "default_start_price")]
    start_price: f64,
    max_months: u32,
}

impl ReserveConfig {
    /// Creates a new `ReserveConfig` with a start price of 1 USD.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any parameter is out of
    /// range; see the type-level validation list.
    pub fn new(
        initial_leaf_balance: f64,
        initial_paired_balance: f64,
        price_decay_rate: f64,
        max_months: u32,
    ) -> crate::error::Result<Self> {
        let config = Self {
            initial_leaf_balance,
            initial_paired_balance,
            price_decay_rate,
            start_price: default_start_price(),
            max_months,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the starting reference price.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the price is not finite
    /// and strictly positive.
    pub fn with_start_price(mut self, start_price: f64) -> crate::error::Result<Self> {
        if !start_price.is_finite() || start_price <= 0.0 {
            return Err(EngineError::invalid_parameter(
                "start price must be finite and strictly positive",
            ));
        }
        self.start_price = start_price;
        Ok(self)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] on the first violated
    /// invariant.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.initial_leaf_balance.is_finite() || self.initial_leaf_balance < 0.0 {
            return Err(EngineError::invalid_parameter(
                "initial LEAF balance must be finite and non-negative",
            ));
        }
        if !self.initial_paired_balance.is_finite() || self.initial_paired_balance < 0.0 {
            return Err(EngineError::invalid_parameter(
                "initial paired balance must be finite and non-negative",
            ));
        }
        if !self.price_decay_rate.is_finite() || !(0.0..1.0).contains(&self.price_decay_rate) {
            return Err(EngineError::invalid_parameter(
                "price decay rate must be in [0, 1)",
            ));
        }
        if !self.start_price.is_finite() || self.start_price <= 0.0 {
            return Err(EngineError::invalid_parameter(
                "start price must be finite and strictly positive",
            ));
        }
        if self.max_months == 0 {
            return Err(EngineError::invalid_parameter(
                "simulation must run for at least one month",
            ));
        }
        Ok(())
    }

    /// Returns the opening LEAF balance.
    #[must_use]
    pub const fn initial_leaf_balance(&self) -> f64 {
        self.initial_leaf_balance
    }

    /// Returns the opening paired-asset balance.
    #[must_use]
    pub const fn initial_paired_balance(&self) -> f64 {
        self.initial_paired_balance
    }

    /// Returns the monthly multiplicative price decay rate.
    #[must_use]
    pub const fn price_decay_rate(&self) -> f64 {
        self.price_decay_rate
    }

    /// Returns the starting reference price.
    #[must_use]
    pub const fn start_price(&self) -> f64 {
        self.start_price
    }

    /// Returns the number of months the histories are sized for.
    #[must_use]
    pub const fn max_months(&self) -> u32 {
        self.max_months
    }
}

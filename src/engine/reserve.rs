//! The reserve pool backstopping the allocation engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ReserveConfig;
use crate::domain::Price;
use crate::error::EngineError;
use crate::math::depth;
use crate::traits::{FromConfig, LiquiditySource};

/// Depth-query concentration of the reserve's native-token side: a vanilla
/// constant-product curve.
const LEAF_DEPTH_CONCENTRATION: f64 = 1.0;

/// Depth-query concentration of the reserve's paired-asset side: the paired
/// leg is intentionally concentrated near the current price.
const PAIRED_DEPTH_CONCENTRATION: f64 = 5.0;

/// The reserve's current balances and reference price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReserveState {
    /// Native-token balance, in LEAF tokens.
    pub leaf_balance: f64,
    /// Paired-asset balance, in USD.
    pub paired_balance: f64,
    /// Current reference price, in USD per LEAF.
    pub price: f64,
}

/// Backstop liquidity pool with proportional redemption and monthly price
/// decay.
///
/// The pool steps through months in order: `step(month)` applies one round of
/// multiplicative price decay and records the month's balances and price in
/// histories pre-sized for the whole run. Redemptions are proportional —
/// a rate of `r` percent removes `r`% of *both* balances — and each month
/// accepts at most one redemption.
///
/// Calling [`step`](Self::step) more than once for the same month compounds
/// the decay; processing each month exactly once is caller discipline, the
/// same as in the surrounding simulation driver.
///
/// # Examples
///
/// ```
/// use leaf_liquidity::config::ReserveConfig;
/// use leaf_liquidity::engine::ReservePool;
/// use leaf_liquidity::traits::FromConfig;
///
/// let config = ReserveConfig::new(1_000_000_000.0, 500_000.0, 0.005, 60)
///     .expect("valid config");
/// let mut reserve = ReservePool::from_config(&config).expect("valid pool");
///
/// let (leaf, paired) = reserve.handle_redemptions(3, 2.0).expect("first redemption");
/// assert_eq!(leaf, 20_000_000.0);
/// assert_eq!(paired, 10_000.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReservePool {
    leaf_balance: f64,
    paired_balance: f64,
    price: Price,
    price_decay_rate: f64,
    redemption_history: BTreeMap<u32, f64>,
    leaf_balance_history: Vec<f64>,
    paired_balance_history: Vec<f64>,
    price_history: Vec<f64>,
}

impl FromConfig<ReserveConfig> for ReservePool {
    fn from_config(config: &ReserveConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let months = config.max_months() as usize;
        Ok(Self {
            leaf_balance: config.initial_leaf_balance(),
            paired_balance: config.initial_paired_balance(),
            price: Price::new(config.start_price())?,
            price_decay_rate: config.price_decay_rate(),
            redemption_history: BTreeMap::new(),
            leaf_balance_history: vec![config.initial_leaf_balance(); months],
            paired_balance_history: vec![config.initial_paired_balance(); months],
            price_history: vec![config.start_price(); months],
        })
    }
}

impl ReservePool {
    /// Processes redemptions for the given month.
    ///
    /// `rate` is a percentage in `[0, 100]`; both balances are reduced by
    /// `rate`% and the redeemed amounts `(leaf, paired)` are returned.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] if `rate` is outside `[0, 100]`.
    /// - [`EngineError::DuplicateRedemption`] if `month` already has a
    ///   recorded redemption.
    pub fn handle_redemptions(&mut self, month: u32, rate: f64) -> crate::error::Result<(f64, f64)> {
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err(EngineError::invalid_parameter(
                "redemption rate must be between 0 and 100",
            ));
        }
        if self.redemption_history.contains_key(&month) {
            return Err(EngineError::DuplicateRedemption(month));
        }

        let leaf_redeemed = self.leaf_balance * rate / 100.0;
        let paired_redeemed = self.paired_balance * rate / 100.0;
        self.leaf_balance -= leaf_redeemed;
        self.paired_balance -= paired_redeemed;
        self.redemption_history.insert(month, rate);

        debug!(month, rate, leaf_redeemed, paired_redeemed, "reserve redemption");
        Ok((leaf_redeemed, paired_redeemed))
    }

    /// Applies one round of multiplicative price decay:
    /// `price *= 1 − decay_rate`.
    pub fn apply_market_decay(&mut self) {
        self.price = self.price.decayed(self.price_decay_rate);
    }

    /// Executes one month's worth of updates: price decay, then recording of
    /// the current balances and price at index `month`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if `month` is beyond the
    /// configured run length.
    pub fn step(&mut self, month: u32) -> crate::error::Result<()> {
        let index = month as usize;
        if index >= self.leaf_balance_history.len() {
            return Err(EngineError::invalid_parameter(format!(
                "month {month} is beyond the configured run length"
            )));
        }
        self.apply_market_decay();
        self.leaf_balance_history[index] = self.leaf_balance;
        self.paired_balance_history[index] = self.paired_balance;
        self.price_history[index] = self.price.get();
        debug!(month, price = self.price.get(), "reserve step");
        Ok(())
    }

    /// Applies signed balance adjustments, e.g. when the reserve sells LEAF
    /// to a position that is short of its target (LEAF out, paired in).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NegativeBalance`] if either balance would go
    /// below zero; neither balance is changed in that case.
    pub fn update_balances(
        &mut self,
        leaf_change: f64,
        paired_change: f64,
    ) -> crate::error::Result<()> {
        let leaf = self.leaf_balance + leaf_change;
        let paired = self.paired_balance + paired_change;
        if leaf < 0.0 {
            return Err(EngineError::negative_balance("reserve", "LEAF"));
        }
        if paired < 0.0 {
            return Err(EngineError::negative_balance("reserve", "paired"));
        }
        self.leaf_balance = leaf;
        self.paired_balance = paired;
        Ok(())
    }

    /// Returns `(leaf_amount, paired_amount)` tradable within `range_pct`
    /// percent of `current_price`.
    ///
    /// The native side uses 1x (vanilla) depth; the paired side is
    /// concentrated at 5x near the current price. Returns `(0.0, 0.0)` if
    /// either balance is zero.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if `range_pct` is outside
    /// `(0, 100)` exclusive.
    pub fn get_liquidity_within_percentage(
        &self,
        range_pct: f64,
        current_price: Price,
    ) -> crate::error::Result<(f64, f64)> {
        depth::liquidity_within_range(
            self.leaf_balance,
            self.paired_balance,
            current_price,
            range_pct,
            LEAF_DEPTH_CONCENTRATION,
            PAIRED_DEPTH_CONCENTRATION,
        )
    }

    /// Returns the current balances and price.
    #[must_use]
    pub fn get_state(&self) -> ReserveState {
        ReserveState {
            leaf_balance: self.leaf_balance,
            paired_balance: self.paired_balance,
            price: self.price.get(),
        }
    }

    /// Returns the current native-token balance.
    #[must_use]
    pub const fn leaf_balance(&self) -> f64 {
        self.leaf_balance
    }

    /// Returns the current paired-asset balance.
    #[must_use]
    pub const fn paired_balance(&self) -> f64 {
        self.paired_balance
    }

    /// Returns the current reference price.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Returns the recorded redemption rates by month.
    #[must_use]
    pub const fn redemption_history(&self) -> &BTreeMap<u32, f64> {
        &self.redemption_history
    }

    /// Returns the per-month LEAF balance history.
    #[must_use]
    pub fn leaf_balance_history(&self) -> &[f64] {
        &self.leaf_balance_history
    }

    /// Returns the per-month paired-asset balance history.
    #[must_use]
    pub fn paired_balance_history(&self) -> &[f64] {
        &self.paired_balance_history
    }

    /// Returns the per-month price history.
    #[must_use]
    pub fn price_history(&self) -> &[f64] {
        &self.price_history
    }
}

impl LiquiditySource for ReservePool {
    fn liquidity_within_percentage(
        &self,
        range_pct: f64,
        price: Price,
    ) -> Result<(f64, f64), EngineError> {
        self.get_liquidity_within_percentage(range_pct, price)
    }
}

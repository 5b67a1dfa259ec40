//! Configuration for a single liquidity position deal.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Concentration, DealId, ExitCondition, LiquidityPosition, Price, TargetRatio,
};
use crate::error::EngineError;

fn default_launch_price() -> f64 {
    1.0
}

/// Declarative blueprint for one counterparty deal.
///
/// The config is the only way a position comes into existence: the
/// [`build`](Self::build) factory derives the opening balance split from
/// `(amount_usd, target_ratio, launch_price)` and hands back an
/// immutable-after-creation [`LiquidityPosition`] — there is no
/// construct-then-patch path.
///
/// # Derived Values
///
/// - `leaf_balance = amount_usd · target_ratio / launch_price`
/// - `other_balance = amount_usd · (1 − target_ratio)`
///
/// so a freshly built position sits exactly at its target ratio when priced
/// at the launch price.
///
/// # Validation
///
/// - `amount_usd` finite and non-negative
/// - `target_ratio` ∈ [0, 0.5], `concentration` ∈ (0, 1]
/// - `duration_months > 0`
/// - `launch_price` finite and strictly positive
///
/// # Examples
///
/// ```
/// use leaf_liquidity::config::PositionConfig;
///
/// let config = PositionConfig::new("Move", 1_500_000.0, 0.35, 0.5, 1, 60)
///     .expect("valid config");
/// assert_eq!(config.counterparty(), "Move");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    counterparty: String,
    amount_usd: f64,
    target_ratio: f64,
    concentration: f64,
    start_month: u32,
    duration_months: u32,
    #[serde(default = "default_launch_price")]
    launch_price: f64,
    #[serde(default)]
    exit_condition: ExitCondition,
}

impl PositionConfig {
    /// Creates a new `PositionConfig` with a launch price of 1 USD and a
    /// fixed-term lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any parameter is out of
    /// range; see the type-level validation list.
    pub fn new(
        counterparty: impl Into<String>,
        amount_usd: f64,
        target_ratio: f64,
        concentration: f64,
        start_month: u32,
        duration_months: u32,
    ) -> crate::error::Result<Self> {
        let config = Self {
            counterparty: counterparty.into(),
            amount_usd,
            target_ratio,
            concentration,
            start_month,
            duration_months,
            launch_price: default_launch_price(),
            exit_condition: ExitCondition::FixedTerm,
        };
        config.validate()?;
        Ok(config)
    }

    /// Replaces the launch price used to derive the opening LEAF balance.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the price is not finite
    /// and strictly positive.
    pub fn with_launch_price(mut self, launch_price: f64) -> crate::error::Result<Self> {
        Price::new(launch_price)?;
        self.launch_price = launch_price;
        Ok(self)
    }

    /// Replaces the lifecycle rule.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the condition carries an
    /// invalid threshold.
    pub fn with_exit_condition(
        mut self,
        exit_condition: ExitCondition,
    ) -> crate::error::Result<Self> {
        exit_condition.validate()?;
        self.exit_condition = exit_condition;
        Ok(self)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] on the first violated
    /// invariant.
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.amount_usd.is_finite() || self.amount_usd < 0.0 {
            return Err(EngineError::invalid_parameter(
                "deal amount must be finite and non-negative",
            ));
        }
        TargetRatio::new(self.target_ratio)?;
        Concentration::new(self.concentration)?;
        if self.duration_months == 0 {
            return Err(EngineError::invalid_parameter(
                "duration must be at least one month",
            ));
        }
        Price::new(self.launch_price)?;
        self.exit_condition.validate()?;
        Ok(())
    }

    /// Builds the position this config describes, stamped with `deal_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the config does not
    /// validate (possible when the config was deserialized rather than built
    /// through [`new`](Self::new)).
    pub fn build(&self, deal_id: DealId) -> crate::error::Result<LiquidityPosition> {
        self.validate()?;
        let leaf_balance = self.amount_usd * self.target_ratio / self.launch_price;
        let other_balance = self.amount_usd * (1.0 - self.target_ratio);
        LiquidityPosition::new(
            deal_id,
            self.counterparty.clone(),
            leaf_balance,
            other_balance,
            TargetRatio::new(self.target_ratio)?,
            Concentration::new(self.concentration)?,
            self.start_month,
            self.duration_months,
            self.exit_condition,
        )
    }

    /// Returns the counterparty name.
    #[must_use]
    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    /// Returns the total deal size in USD.
    #[must_use]
    pub const fn amount_usd(&self) -> f64 {
        self.amount_usd
    }

    /// Returns the target LEAF share.
    #[must_use]
    pub const fn target_ratio(&self) -> f64 {
        self.target_ratio
    }

    /// Returns the concentration parameter.
    #[must_use]
    pub const fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Returns the first active month.
    #[must_use]
    pub const fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Returns the deal duration in months.
    #[must_use]
    pub const fn duration_months(&self) -> u32 {
        self.duration_months
    }

    /// Returns the launch price used for the opening balance split.
    #[must_use]
    pub const fn launch_price(&self) -> f64 {
        self.launch_price
    }

    /// Returns the lifecycle rule.
    #[must_use]
    pub const fn exit_condition(&self) -> ExitCondition {
        self.exit_condition
    }
}

//! One counterparty's liquidity allocation.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{Concentration, DealId, ExitCondition, ExitContext, Price, TargetRatio};
use crate::error::EngineError;
use crate::math::depth;

/// One counterparty's liquidity position: LEAF and paired-asset balances, a
/// target ratio, a concentration parameter, and an activity window.
///
/// # Invariants
///
/// - `leaf_balance ≥ 0` and `other_balance ≥ 0` at all times; any trade that
///   would break this is rejected before any mutation.
/// - `target_ratio` and `concentration` are immutable after creation.
/// - `duration_months > 0`, so `end_month > start_month`.
///
/// # Lifecycle
///
/// Created once (at simulation start or via
/// [`AllocationEngine::add_deal`](crate::engine::AllocationEngine::add_deal)),
/// mutated every month it is active by the engine, inactive once its
/// [`ExitCondition`] is met — but never deleted and never resurrected.
///
/// # Examples
///
/// ```
/// use leaf_liquidity::domain::{
///     Concentration, DealIdAllocator, ExitCondition, LiquidityPosition, Price, TargetRatio,
/// };
///
/// let mut ids = DealIdAllocator::new();
/// let pos = LiquidityPosition::new(
///     ids.next_id("Move"),
///     "Move",
///     200_000.0,
///     800_000.0,
///     TargetRatio::new(0.5).expect("valid ratio"),
///     Concentration::new(0.3).expect("valid concentration"),
///     1,
///     60,
///     ExitCondition::FixedTerm,
/// )
/// .expect("valid position");
///
/// let price = Price::new(5.0).expect("valid price");
/// // 200 000 LEAF @ $5 against $800 000 paired: ratio 5/9 ≈ 0.5556.
/// assert!((pos.current_ratio(price) - 0.5556).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LiquidityPosition {
    deal_id: DealId,
    counterparty: String,
    leaf_balance: f64,
    other_balance: f64,
    target_ratio: TargetRatio,
    concentration: Concentration,
    start_month: u32,
    duration_months: u32,
    exit_condition: ExitCondition,
}

/// A position's balances as returned by engine queries: LEAF tokens and
/// paired-asset USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionBalances {
    /// Native-token balance, in LEAF tokens.
    pub leaf: f64,
    /// Paired-asset balance, in USD.
    pub other: f64,
}

impl LiquidityPosition {
    /// Creates a new position with validated balances and window.
    ///
    /// Prefer building positions from a
    /// [`PositionConfig`](crate::config::PositionConfig) — the config factory
    /// derives the balance split from `(amount_usd, target_ratio,
    /// launch_price)` so a freshly created position starts exactly at target.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if either balance is
    /// negative or non-finite, if `duration_months` is zero, or if the exit
    /// condition carries an invalid threshold.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        deal_id: DealId,
        counterparty: impl Into<String>,
        leaf_balance: f64,
        other_balance: f64,
        target_ratio: TargetRatio,
        concentration: Concentration,
        start_month: u32,
        duration_months: u32,
        exit_condition: ExitCondition,
    ) -> crate::error::Result<Self> {
        if !leaf_balance.is_finite() || leaf_balance < 0.0 {
            return Err(EngineError::invalid_parameter(
                "leaf balance must be finite and non-negative",
            ));
        }
        if !other_balance.is_finite() || other_balance < 0.0 {
            return Err(EngineError::invalid_parameter(
                "other balance must be finite and non-negative",
            ));
        }
        if duration_months == 0 {
            return Err(EngineError::invalid_parameter(
                "duration must be at least one month",
            ));
        }
        exit_condition.validate()?;
        Ok(Self {
            deal_id,
            counterparty: counterparty.into(),
            leaf_balance,
            other_balance,
            target_ratio,
            concentration,
            start_month,
            duration_months,
            exit_condition,
        })
    }

    /// Returns the deal identifier.
    #[must_use]
    pub fn deal_id(&self) -> &DealId {
        &self.deal_id
    }

    /// Returns the counterparty name (the position's unique key).
    #[must_use]
    pub fn counterparty(&self) -> &str {
        &self.counterparty
    }

    /// Returns the native-token balance, in LEAF tokens.
    #[must_use]
    pub const fn leaf_balance(&self) -> f64 {
        self.leaf_balance
    }

    /// Returns the paired-asset balance, in USD.
    #[must_use]
    pub const fn other_balance(&self) -> f64 {
        self.other_balance
    }

    /// Returns both balances.
    #[must_use]
    pub const fn balances(&self) -> PositionBalances {
        PositionBalances {
            leaf: self.leaf_balance,
            other: self.other_balance,
        }
    }

    /// Returns the target LEAF share.
    #[must_use]
    pub const fn target_ratio(&self) -> TargetRatio {
        self.target_ratio
    }

    /// Returns the position's own concentration parameter.
    #[must_use]
    pub const fn concentration(&self) -> Concentration {
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

    /// Returns the first month the position is no longer active.
    #[must_use]
    pub const fn end_month(&self) -> u32 {
        self.start_month + self.duration_months
    }

    /// Returns the lifecycle rule.
    #[must_use]
    pub const fn exit_condition(&self) -> ExitCondition {
        self.exit_condition
    }

    /// Returns the total position value in USD at the given price.
    #[must_use]
    pub fn total_value(&self, price: Price) -> f64 {
        self.leaf_balance * price.get() + self.other_balance
    }

    /// Returns the native-token share of total value at the given price.
    ///
    /// Returns `0.0` for an empty position.
    #[must_use]
    pub fn current_ratio(&self, price: Price) -> f64 {
        let leaf_value = self.leaf_balance * price.get();
        let total = leaf_value + self.other_balance;
        if total == 0.0 {
            return 0.0;
        }
        leaf_value / total
    }

    /// Returns `true` if `month` falls inside the fixed activity window
    /// `[start_month, end_month)`.
    ///
    /// The window is what snapshots and history queries are keyed on;
    /// [`is_active`](Self::is_active) additionally consults the
    /// [`ExitCondition`] and is what trade distribution uses.
    #[must_use]
    pub const fn in_window(&self, month: u32) -> bool {
        self.start_month <= month && month < self.end_month()
    }

    /// Returns `true` if the position participates in month `month`.
    ///
    /// A position is active from `start_month` until its [`ExitCondition`]
    /// is met; for [`ExitCondition::FixedTerm`] this reduces to
    /// `start_month ≤ month < end_month`.
    #[must_use]
    pub fn is_active(&self, month: u32, price: Price) -> bool {
        if month < self.start_month {
            return false;
        }
        let ctx = ExitContext {
            month,
            end_month: self.end_month(),
            total_value_usd: self.total_value(price),
            ratio_deviation: self.current_ratio(price) - self.target_ratio.get(),
        };
        !self.exit_condition.is_met(&ctx)
    }

    /// Returns the concentration quoted for the given trade direction.
    ///
    /// A trade that pushes the position *toward* its target ratio meets the
    /// shallow [`Concentration::BASELINE`]; a trade that pushes it further
    /// *away* meets the position's own (deeper) concentration:
    ///
    /// | direction | ratio vs. target | quoted |
    /// |-----------|-----------------|--------|
    /// | buying LEAF | above | own |
    /// | buying LEAF | at or below | baseline |
    /// | selling LEAF | above | baseline |
    /// | selling LEAF | at or below | own |
    ///
    /// `is_buying_native` is from the position's perspective: `true` when the
    /// position absorbs LEAF (negative market trade).
    #[must_use]
    pub fn effective_concentration(&self, is_buying_native: bool, price: Price) -> f64 {
        let above_target = self.current_ratio(price) > self.target_ratio.get();
        if is_buying_native == above_target {
            self.concentration.get()
        } else {
            Concentration::BASELINE.get()
        }
    }

    /// Returns the position's weight in trade distribution: total value
    /// scaled by the effective concentration for the trade direction.
    #[must_use]
    pub fn weighted_liquidity(&self, is_buying_native: bool, price: Price) -> f64 {
        self.total_value(price) * self.effective_concentration(is_buying_native, price)
    }

    /// Computes the balances this position would hold after a signed trade,
    /// without mutating anything.
    ///
    /// `delta_native_value_usd > 0` means LEAF leaves the position and the
    /// paired asset enters; `< 0` mirrors the signs.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NegativeBalance`] if either resulting balance
    /// would be below zero.
    pub fn preview_trade(
        &self,
        delta_native_value_usd: f64,
        price: Price,
    ) -> crate::error::Result<PositionBalances> {
        let leaf = self.leaf_balance - delta_native_value_usd / price.get();
        let other = self.other_balance + delta_native_value_usd;
        if leaf < 0.0 {
            return Err(EngineError::negative_balance(&self.counterparty, "LEAF"));
        }
        if other < 0.0 {
            return Err(EngineError::negative_balance(&self.counterparty, "paired"));
        }
        Ok(PositionBalances { leaf, other })
    }

    /// Applies a signed USD-denominated trade against this position.
    ///
    /// See [`preview_trade`](Self::preview_trade) for the sign convention.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NegativeBalance`] if either balance would go
    /// below zero; the position is left untouched in that case.
    pub fn apply_trade(
        &mut self,
        delta_native_value_usd: f64,
        price: Price,
    ) -> crate::error::Result<()> {
        let next = self.preview_trade(delta_native_value_usd, price)?;
        self.leaf_balance = next.leaf;
        self.other_balance = next.other;
        Ok(())
    }

    /// Position-level depth reporting: how much of each asset is tradable
    /// within `range_pct` of `price`, using the position's own concentration
    /// on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if `range_pct` is outside
    /// `(0, 100)` exclusive.
    pub fn liquidity_within_percentage(
        &self,
        range_pct: f64,
        price: Price,
    ) -> crate::error::Result<(f64, f64)> {
        depth::liquidity_within_range(
            self.leaf_balance,
            self.other_balance,
            price,
            range_pct,
            self.concentration.get(),
            self.concentration.get(),
        )
    }

    /// Overwrites both balances. Used only by the engine's rollback and
    /// commit paths; the values were validated before they get here.
    pub(crate) fn set_balances(&mut self, balances: PositionBalances) {
        self.leaf_balance = balances.leaf;
        self.other_balance = balances.other;
    }
}

impl fmt::Display for LiquidityPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}]: {} LEAF / {} USD, target {}, concentration {}",
            self.counterparty,
            self.deal_id,
            self.leaf_balance,
            self.other_balance,
            self.target_ratio,
            self.concentration
        )
    }
}

//! Distribution of market-wide trades across liquidity positions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::{PositionSnapshot, SnapshotHistory};
use crate::config::{EngineConfig, PositionConfig};
use crate::domain::{DealIdAllocator, LiquidityPosition, PositionBalances, Price};
use crate::error::EngineError;
use crate::traits::{FromConfig, LiquiditySource};

/// Per-position liquidity metrics reported to the external revenue and price
/// models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    /// Native-token balance, in LEAF tokens.
    pub leaf_balance_tokens: f64,
    /// Native-token balance valued at the query price, in USD.
    pub leaf_balance_usd: f64,
    /// Paired-asset balance, in USD.
    pub other_balance_usd: f64,
    /// Native-token share of total value at the query price.
    pub current_ratio: f64,
}

/// Orchestrates a set of [`LiquidityPosition`]s month by month.
///
/// Each simulated month the external driver supplies a reference price and a
/// net signed trade value; the engine distributes the trade across the
/// positions active that month, weighted by concentration-adjusted liquidity,
/// and records a balance snapshot. Months are processed strictly in order —
/// the only permitted "time travel" is re-processing the current month, which
/// first rolls every position back to its prior-month state.
///
/// # Sign convention
///
/// Positive `net_trade_usd` drains LEAF from the positions and credits their
/// paired-asset balances; negative mirrors the signs. Equivalently,
/// `net_trade_usd < 0` means the positions are net *buying* LEAF.
///
/// # Atomicity
///
/// A distribution either applies to every active position or to none: all
/// per-position balance changes are computed and validated up front, and
/// committed only after the last one checks out. A [`NegativeBalance`]
/// anywhere aborts the whole call with no state change.
///
/// [`NegativeBalance`]: EngineError::NegativeBalance
///
/// # Examples
///
/// ```
/// use leaf_liquidity::config::{EngineConfig, PositionConfig};
/// use leaf_liquidity::domain::Price;
/// use leaf_liquidity::engine::AllocationEngine;
/// use leaf_liquidity::traits::FromConfig;
///
/// let book = EngineConfig::new(vec![
///     PositionConfig::new("Move", 1_500_000.0, 0.35, 0.5, 1, 60).expect("valid deal"),
/// ])
/// .expect("valid book");
/// let mut engine = AllocationEngine::from_config(&book).expect("valid engine");
///
/// let price = Price::ONE;
/// let balances = engine.process_market_change(1, price, 50_000.0).expect("distributed");
/// // The single active position absorbs the whole trade.
/// assert!((balances["Move"].other - 1_025_000.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct AllocationEngine {
    positions: Vec<LiquidityPosition>,
    current_month: u32,
    history: SnapshotHistory,
    ids: DealIdAllocator,
}

impl FromConfig<EngineConfig> for AllocationEngine {
    fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut ids = DealIdAllocator::new();
        let mut history = SnapshotHistory::new();
        let mut positions = Vec::with_capacity(config.positions().len());
        for deal in config.positions() {
            let position = deal.build(ids.next_id(deal.counterparty()))?;
            history.record_baseline(position.counterparty(), position.balances());
            positions.push(position);
        }
        let current_month = positions
            .iter()
            .map(LiquidityPosition::start_month)
            .min()
            .unwrap_or(0);
        Ok(Self {
            positions,
            current_month,
            history,
            ids,
        })
    }
}

impl AllocationEngine {
    /// Creates an engine from a list of deal configs.
    ///
    /// Convenience wrapper around [`FromConfig`] for callers that have not
    /// assembled an [`EngineConfig`] themselves.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any deal is invalid or
    /// two deals share a counterparty.
    pub fn new(deals: Vec<PositionConfig>) -> crate::error::Result<Self> {
        Self::from_config(&EngineConfig::new(deals)?)
    }

    /// Returns the month the engine will process next (or is re-processing).
    #[must_use]
    pub const fn current_month(&self) -> u32 {
        self.current_month
    }

    /// Returns all positions, active or not.
    #[must_use]
    pub fn positions(&self) -> &[LiquidityPosition] {
        &self.positions
    }

    /// Returns the recorded snapshot history.
    #[must_use]
    pub const fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    /// Returns the positions participating in trade distribution for
    /// `month`, at the given price.
    #[must_use]
    pub fn active_positions(&self, month: u32, price: Price) -> Vec<&LiquidityPosition> {
        self.positions
            .iter()
            .filter(|p| p.is_active(month, price))
            .collect()
    }

    /// Returns the total USD value held by positions whose window covers
    /// `month`, at the given price.
    #[must_use]
    pub fn total_liquidity(&self, month: u32, price: Price) -> f64 {
        self.positions
            .iter()
            .filter(|p| p.in_window(month))
            .map(|p| p.total_value(price))
            .sum()
    }

    /// Distributes a net signed market trade across the active positions.
    ///
    /// # Flow
    ///
    /// 1. Validate sequencing: `month` must be the current month (re-process)
    ///    or the next one. Re-processing first rolls every in-window position
    ///    back to its prior-month balances.
    /// 2. The trade direction is `net_trade_usd < 0` ⇒ positions buy LEAF.
    /// 3. With no active positions the month is recorded empty and `{}` is
    ///    returned.
    /// 4. Each active position gets `net_trade_usd · weight / total_weight`,
    ///    where the weight is its concentration-adjusted liquidity.
    /// 5. All per-position changes validate before any commits (see the
    ///    type-level atomicity note).
    /// 6. The month's snapshot is recorded and the new balances returned.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidSequencing`] if `month < current_month` or
    ///   `month > current_month + 1`.
    /// - [`EngineError::ZeroLiquidity`] if the active positions' total weight
    ///   is zero.
    /// - [`EngineError::NegativeBalance`] if any position's share would
    ///   overdraw it; no balances change in that case.
    pub fn process_market_change(
        &mut self,
        month: u32,
        price: Price,
        net_trade_usd: f64,
    ) -> crate::error::Result<BTreeMap<String, PositionBalances>> {
        if month < self.current_month || month > self.current_month + 1 {
            return Err(EngineError::InvalidSequencing {
                month,
                current: self.current_month,
            });
        }
        if month == self.current_month {
            self.rollback(month);
        }

        let is_buying_native = net_trade_usd < 0.0;
        let active: Vec<usize> = self
            .positions
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_active(month, price))
            .map(|(i, _)| i)
            .collect();

        if active.is_empty() {
            debug!(month, "no active positions; month recorded empty");
            self.history.record_month(month, Vec::new());
            self.current_month = month;
            return Ok(BTreeMap::new());
        }

        let total_weight: f64 = active
            .iter()
            .map(|&i| self.positions[i].weighted_liquidity(is_buying_native, price))
            .sum();
        if total_weight == 0.0 {
            return Err(EngineError::ZeroLiquidity);
        }

        // Compute and validate every change before committing any of them.
        let mut staged: Vec<(usize, PositionBalances)> = Vec::with_capacity(active.len());
        for &i in &active {
            let position = &self.positions[i];
            let share = position.weighted_liquidity(is_buying_native, price) / total_weight;
            let next = position.preview_trade(net_trade_usd * share, price)?;
            staged.push((i, next));
        }
        for (i, next) in staged {
            self.positions[i].set_balances(next);
        }

        debug!(
            month,
            net_trade_usd,
            total_weight,
            active = active.len(),
            "market change distributed"
        );

        let snapshots: Vec<PositionSnapshot> = self
            .positions
            .iter()
            .filter(|p| p.in_window(month))
            .map(|p| PositionSnapshot {
                counterparty: p.counterparty().to_owned(),
                leaf_balance: p.leaf_balance(),
                other_balance: p.other_balance(),
            })
            .collect();
        self.history.record_month(month, snapshots);
        self.current_month = month;

        Ok(active
            .iter()
            .map(|&i| {
                let p = &self.positions[i];
                (p.counterparty().to_owned(), p.balances())
            })
            .collect())
    }

    /// Rolls every in-window position back to its balances before `month`
    /// was (first) processed: the `month − 1` snapshot entry, or the
    /// position's as-constructed baseline when it starts in `month` itself.
    fn rollback(&mut self, month: u32) {
        debug!(month, "rolling back for re-processing");
        for position in &mut self.positions {
            if !position.in_window(month) {
                continue;
            }
            if let Some(balances) = self
                .history
                .restore_source(month, position.counterparty())
            {
                position.set_balances(balances);
            }
        }
    }

    /// Returns `current_ratio − target_ratio` per position whose window
    /// covers `month`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidSequencing`] if `month > current_month`.
    /// - [`EngineError::MissingSnapshot`] if a historical month has no
    ///   recorded snapshot.
    pub fn get_ratio_deviations(
        &self,
        month: u32,
        price: Price,
    ) -> crate::error::Result<BTreeMap<String, f64>> {
        let balances = self.balances_for_month(month)?;
        Ok(balances
            .into_iter()
            .filter_map(|(counterparty, b)| {
                self.position(&counterparty).map(|p| {
                    let leaf_value = b.leaf * price.get();
                    let total = leaf_value + b.other;
                    let ratio = if total == 0.0 { 0.0 } else { leaf_value / total };
                    (counterparty, ratio - p.target_ratio().get())
                })
            })
            .collect())
    }

    /// Returns per-position liquidity metrics for `month` at the given
    /// price.
    ///
    /// # Errors
    ///
    /// Same sequencing and history rules as
    /// [`get_ratio_deviations`](Self::get_ratio_deviations).
    pub fn get_liquidity_metrics(
        &self,
        month: u32,
        price: Price,
    ) -> crate::error::Result<BTreeMap<String, LiquidityMetrics>> {
        let balances = self.balances_for_month(month)?;
        Ok(balances
            .into_iter()
            .map(|(counterparty, b)| {
                let leaf_value = b.leaf * price.get();
                let total = leaf_value + b.other;
                let current_ratio = if total == 0.0 { 0.0 } else { leaf_value / total };
                (
                    counterparty,
                    LiquidityMetrics {
                        leaf_balance_tokens: b.leaf,
                        leaf_balance_usd: leaf_value,
                        other_balance_usd: b.other,
                        current_ratio,
                    },
                )
            })
            .collect())
    }

    /// Adds a new deal mid-run.
    ///
    /// The new position is stamped with the next [`DealId`] for its
    /// counterparty, its baseline is recorded, and the current month's
    /// snapshot is refreshed so the position is visible to rollback and
    /// history queries immediately.
    ///
    /// [`DealId`]: crate::domain::DealId
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if the config is invalid or
    /// the counterparty already has a deal.
    pub fn add_deal(&mut self, deal: &PositionConfig) -> crate::error::Result<()> {
        if self
            .positions
            .iter()
            .any(|p| p.counterparty() == deal.counterparty())
        {
            return Err(EngineError::invalid_parameter(format!(
                "deal with {} already exists",
                deal.counterparty()
            )));
        }
        let position = deal.build(self.ids.next_id(deal.counterparty()))?;
        info!(
            counterparty = position.counterparty(),
            deal_id = %position.deal_id(),
            start_month = position.start_month(),
            "deal added"
        );
        self.history
            .record_baseline(position.counterparty(), position.balances());
        self.positions.push(position);

        let snapshots: Vec<PositionSnapshot> = self
            .positions
            .iter()
            .filter(|p| p.in_window(self.current_month))
            .map(|p| PositionSnapshot {
                counterparty: p.counterparty().to_owned(),
                leaf_balance: p.leaf_balance(),
                other_balance: p.other_balance(),
            })
            .collect();
        self.history.record_month(self.current_month, snapshots);
        Ok(())
    }

    /// Returns `(leaf_balance, leaf_balance_usd)` for every position whose
    /// fixed term ends exactly in `month`, read from the `month − 1`
    /// snapshot — the last valid state before exit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingSnapshot`] if the `month − 1` snapshot
    /// was never recorded.
    pub fn get_deals_end_in_month(
        &self,
        month: u32,
        price: Price,
    ) -> crate::error::Result<BTreeMap<String, (f64, f64)>> {
        let ending: Vec<&LiquidityPosition> = self
            .positions
            .iter()
            .filter(|p| p.end_month() == month)
            .collect();
        if ending.is_empty() {
            return Ok(BTreeMap::new());
        }
        // duration_months > 0 guarantees end_month ≥ 1 here.
        let prior = month - 1;
        let mut out = BTreeMap::new();
        for position in ending {
            let balances = self
                .history
                .balances_in_month(prior, position.counterparty())
                .ok_or(EngineError::MissingSnapshot(prior))?;
            out.insert(
                position.counterparty().to_owned(),
                (balances.leaf, balances.leaf * price.get()),
            );
        }
        Ok(out)
    }

    fn position(&self, counterparty: &str) -> Option<&LiquidityPosition> {
        self.positions
            .iter()
            .find(|p| p.counterparty() == counterparty)
    }

    /// Balances per in-window position for `month`: the recorded snapshot
    /// for processed months, live balances for the current, not-yet-processed
    /// month.
    fn balances_for_month(
        &self,
        month: u32,
    ) -> crate::error::Result<Vec<(String, PositionBalances)>> {
        if month > self.current_month {
            return Err(EngineError::InvalidSequencing {
                month,
                current: self.current_month,
            });
        }
        if let Some(snapshots) = self.history.month(month) {
            return Ok(snapshots
                .iter()
                .map(|s| (s.counterparty.clone(), s.balances()))
                .collect());
        }
        if month == self.current_month {
            return Ok(self
                .positions
                .iter()
                .filter(|p| p.in_window(month))
                .map(|p| (p.counterparty().to_owned(), p.balances()))
                .collect());
        }
        Err(EngineError::MissingSnapshot(month))
    }
}

impl LiquiditySource for AllocationEngine {
    /// Sums position-level depth over the positions whose window covers the
    /// current month.
    fn liquidity_within_percentage(
        &self,
        range_pct: f64,
        price: Price,
    ) -> Result<(f64, f64), EngineError> {
        let mut leaf_total = 0.0;
        let mut other_total = 0.0;
        for position in self
            .positions
            .iter()
            .filter(|p| p.in_window(self.current_month))
        {
            let (leaf, other) = position.liquidity_within_percentage(range_pct, price)?;
            leaf_total += leaf;
            other_total += other;
        }
        Ok((leaf_total, other_total))
    }
}

//! Per-month balance snapshots with a construction-time baseline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::PositionBalances;

/// One position's recorded balances for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// The position's unique key.
    pub counterparty: String,
    /// Native-token balance, in LEAF tokens.
    pub leaf_balance: f64,
    /// Paired-asset balance, in USD.
    pub other_balance: f64,
}

impl PositionSnapshot {
    /// Returns the snapshot's balances as a [`PositionBalances`] pair.
    #[must_use]
    pub const fn balances(&self) -> PositionBalances {
        PositionBalances {
            leaf: self.leaf_balance,
            other: self.other_balance,
        }
    }
}

/// Month-keyed balance history for all positions, plus a baseline layer.
///
/// The monthly layer records, for every processed month, the balances of all
/// positions whose window covers that month. The baseline layer records each
/// position's as-constructed balances (written at engine construction and on
/// `add_deal`). Rolling back month `M` restores from the `M − 1` entry when
/// one exists and falls back to the baseline for positions that start in `M`
/// itself — the first-month case the monthly layer cannot cover.
#[derive(Debug, Clone, Default)]
pub struct SnapshotHistory {
    baseline: BTreeMap<String, PositionBalances>,
    months: BTreeMap<u32, Vec<PositionSnapshot>>,
}

impl SnapshotHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a position's as-constructed balances.
    pub fn record_baseline(&mut self, counterparty: impl Into<String>, balances: PositionBalances) {
        self.baseline.insert(counterparty.into(), balances);
    }

    /// Records (or overwrites, when a month is re-processed) the snapshot
    /// list for `month`.
    pub fn record_month(&mut self, month: u32, snapshots: Vec<PositionSnapshot>) {
        self.months.insert(month, snapshots);
    }

    /// Returns the snapshot list recorded for `month`, if any.
    #[must_use]
    pub fn month(&self, month: u32) -> Option<&[PositionSnapshot]> {
        self.months.get(&month).map(Vec::as_slice)
    }

    /// Returns one position's balances recorded for `month`, if any.
    #[must_use]
    pub fn balances_in_month(&self, month: u32, counterparty: &str) -> Option<PositionBalances> {
        self.months.get(&month).and_then(|snapshots| {
            snapshots
                .iter()
                .find(|s| s.counterparty == counterparty)
                .map(PositionSnapshot::balances)
        })
    }

    /// Returns the balances a position held *before* trading in `month`: the
    /// `month − 1` entry when recorded, otherwise the baseline (the position
    /// started in `month` or the engine has not processed an earlier month).
    #[must_use]
    pub fn restore_source(&self, month: u32, counterparty: &str) -> Option<PositionBalances> {
        let prior = month
            .checked_sub(1)
            .and_then(|m| self.balances_in_month(m, counterparty));
        prior.or_else(|| self.baseline.get(counterparty).copied())
    }

    /// Returns the latest month with a recorded snapshot.
    #[must_use]
    pub fn latest_month(&self) -> Option<u32> {
        self.months.keys().next_back().copied()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn snap(counterparty: &str, leaf: f64, other: f64) -> PositionSnapshot {
        PositionSnapshot {
            counterparty: counterparty.to_owned(),
            leaf_balance: leaf,
            other_balance: other,
        }
    }

    #[test]
    fn restore_prefers_prior_month_over_baseline() {
        let mut history = SnapshotHistory::new();
        history.record_baseline("Move", PositionBalances { leaf: 100.0, other: 900.0 });
        history.record_month(4, vec![snap("Move", 80.0, 920.0)]);

        let Some(balances) = history.restore_source(5, "Move") else {
            panic!("restore source expected");
        };
        assert!((balances.leaf - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_falls_back_to_baseline_for_fresh_positions() {
        let mut history = SnapshotHistory::new();
        history.record_baseline("Move", PositionBalances { leaf: 100.0, other: 900.0 });
        // Month 4 was processed, but "Move" starts in month 5 and is absent.
        history.record_month(4, vec![snap("Other", 1.0, 1.0)]);

        let Some(balances) = history.restore_source(5, "Move") else {
            panic!("baseline fallback expected");
        };
        assert!((balances.leaf - 100.0).abs() < f64::EPSILON);
        assert!((balances.other - 900.0).abs() < f64::EPSILON);
    }

    #[test]
    fn restore_at_month_zero_uses_baseline() {
        let mut history = SnapshotHistory::new();
        history.record_baseline("Move", PositionBalances { leaf: 1.0, other: 2.0 });
        assert!(history.restore_source(0, "Move").is_some());
    }

    #[test]
    fn reprocessing_overwrites_the_month_entry() {
        let mut history = SnapshotHistory::new();
        history.record_month(3, vec![snap("A", 1.0, 1.0)]);
        history.record_month(3, vec![snap("A", 2.0, 2.0)]);
        let Some(balances) = history.balances_in_month(3, "A") else {
            panic!("entry expected");
        };
        assert!((balances.leaf - 2.0).abs() < f64::EPSILON);
        assert_eq!(history.latest_month(), Some(3));
    }
}

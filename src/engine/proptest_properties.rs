//! Property-based tests using `proptest` for engine invariant validation.
//!
//! Covers the core testable properties:
//!
//! 1. **Conservation** — a successful distribution moves the paired leg by
//!    exactly the net trade and the native leg by its USD mirror image.
//! 2. **Non-negativity** — no balance goes below zero after any successful
//!    operation.
//! 3. **Depth bounds** — band amounts stay within `[0, reserve]` on both
//!    sides for any reserves, price, range, and concentration.
//! 4. **Redemption scaling** — a rate of `r`% scales both reserve balances
//!    by exactly `1 − r/100`.

use proptest::prelude::*;

use crate::config::{PositionConfig, ReserveConfig};
use crate::domain::Price;
use crate::engine::{AllocationEngine, ReservePool};
use crate::error::EngineError;
use crate::math::depth::liquidity_within_range;
use crate::traits::FromConfig;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn deal_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    // (amount_usd, target_ratio, concentration)
    (1.0e5..5.0e6, 0.0..=0.5, 0.01..=1.0)
}

fn book_strategy() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    proptest::collection::vec(deal_strategy(), 1..5)
}

fn engine_from(book: &[(f64, f64, f64)]) -> AllocationEngine {
    let deals: Vec<PositionConfig> = book
        .iter()
        .enumerate()
        .map(|(i, &(amount, ratio, concentration))| {
            PositionConfig::new(format!("CP{i}"), amount, ratio, concentration, 1, 12)
                .unwrap_or_else(|e| panic!("strategy produced invalid deal: {e}"))
        })
        .collect();
    AllocationEngine::new(deals).unwrap_or_else(|e| panic!("strategy produced invalid book: {e}"))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn distribution_conserves_both_legs(
        book in book_strategy(),
        net_trade in -50_000.0f64..50_000.0,
        price_value in 0.2f64..5.0,
    ) {
        let mut engine = engine_from(&book);
        let price = Price::new(price_value).expect("strategy keeps price valid");

        let before: Vec<f64> = engine
            .positions()
            .iter()
            .flat_map(|p| [p.leaf_balance(), p.other_balance()])
            .collect();

        match engine.process_market_change(1, price, net_trade) {
            Ok(_) => {
                let mut other_delta = 0.0;
                let mut leaf_delta_usd = 0.0;
                for (i, p) in engine.positions().iter().enumerate() {
                    leaf_delta_usd += (p.leaf_balance() - before[2 * i]) * price.get();
                    other_delta += p.other_balance() - before[2 * i + 1];
                    prop_assert!(p.leaf_balance() >= 0.0);
                    prop_assert!(p.other_balance() >= 0.0);
                }
                let tolerance = 1e-6 * net_trade.abs().max(1.0);
                prop_assert!((other_delta - net_trade).abs() <= tolerance);
                prop_assert!((leaf_delta_usd + net_trade).abs() <= tolerance);
            }
            // A trade can legitimately overdraw a thin position (e.g. a
            // zero-target deal holds no LEAF); the call must then leave
            // every balance untouched.
            Err(EngineError::NegativeBalance { .. }) | Err(EngineError::ZeroLiquidity) => {
                for (i, p) in engine.positions().iter().enumerate() {
                    prop_assert!((p.leaf_balance() - before[2 * i]).abs() < f64::EPSILON);
                    prop_assert!((p.other_balance() - before[2 * i + 1]).abs() < f64::EPSILON);
                }
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn depth_amounts_stay_within_reserves(
        x_reserve in 0.0f64..1.0e9,
        y_reserve in 0.0f64..1.0e9,
        price_value in 0.01f64..100.0,
        range_pct in 0.1f64..99.9,
        x_conc in 0.1f64..10.0,
        y_conc in 0.1f64..10.0,
    ) {
        let price = Price::new(price_value).expect("strategy keeps price valid");
        let (x, y) = liquidity_within_range(
            x_reserve, y_reserve, price, range_pct, x_conc, y_conc,
        ).expect("range_pct strategy stays in (0, 100)");

        prop_assert!(x >= 0.0);
        prop_assert!(y >= 0.0);
        prop_assert!(x <= x_reserve);
        prop_assert!(y <= y_reserve);
    }

    #[test]
    fn redemption_scales_both_balances(
        leaf in 0.0f64..1.0e9,
        paired in 0.0f64..1.0e6,
        rate in 0.0f64..=100.0,
    ) {
        let config = ReserveConfig::new(leaf, paired, 0.005, 60)
            .expect("strategy keeps config valid");
        let mut reserve = ReservePool::from_config(&config).expect("valid pool");

        let (leaf_redeemed, paired_redeemed) = reserve
            .handle_redemptions(1, rate)
            .expect("rate strategy stays in [0, 100]");

        let factor = 1.0 - rate / 100.0;
        let tolerance = 1e-6 * leaf.max(1.0);
        prop_assert!((reserve.leaf_balance() - leaf * factor).abs() <= tolerance);
        prop_assert!((reserve.paired_balance() - paired * factor).abs() <= 1e-6 * paired.max(1.0));
        prop_assert!((leaf_redeemed - leaf * rate / 100.0).abs() <= tolerance);
        prop_assert!((paired_redeemed - paired * rate / 100.0).abs() <= 1e-6 * paired.max(1.0));
        prop_assert!(reserve.leaf_balance() >= 0.0);
        prop_assert!(reserve.paired_balance() >= 0.0);
    }
}

//! Canonical monthly driver loop over the allocation engine and the reserve.
//!
//! Demonstrates the full external-driver contract: an opening deal book, a
//! reserve pool with price decay, a monthly net-trade schedule, proportional
//! redemptions, a deal arriving mid-run, and the liquidity metrics both
//! components publish.
//!
//! # Run
//!
//! ```bash
//! cargo run --example simulation
//! ```

use leaf_liquidity::config::{EngineConfig, PositionConfig, ReserveConfig};
use leaf_liquidity::domain::Price;
use leaf_liquidity::engine::{AllocationEngine, ReservePool};
use leaf_liquidity::traits::{FromConfig, LiquiditySource};

const MAX_MONTHS: u32 = 60;
const REDEMPTION_START_MONTH: u32 = 12;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== LEAF Liquidity Allocation & Reserve Simulation ===\n");

    // ── 1. Opening deal book ────────────────────────────────────────────
    let book = EngineConfig::new(vec![
        PositionConfig::new("Move", 1_500_000.0, 0.35, 0.5, 1, 60)?,
        PositionConfig::new("KappaFi Protocol", 4_300_000.0, 0.25, 0.4, 1, 12)?,
        PositionConfig::new("LambdaVest", 5_700_000.0, 0.2, 0.6, 1, 12)?,
    ])?;
    let mut engine = AllocationEngine::from_config(&book)?;

    // ── 2. Reserve: 1B LEAF / 500k USDC, 0.5% monthly price decay ──────
    let reserve_config = ReserveConfig::new(1_000_000_000.0, 500_000.0, 0.005, MAX_MONTHS)?;
    let mut reserve = ReservePool::from_config(&reserve_config)?;

    // Stand-in for the external price model's monthly net trade signal.
    let trade_schedule = [10_000.0, -5_000.0, 15_000.0, -12_000.0, 8_000.0];

    println!("Month   Net trade      Active   LEAF in range    USDC in range   Price");
    println!("{}", "-".repeat(78));

    let mut current_price = Price::ONE;
    for month in 1..MAX_MONTHS {
        // A new counterparty joins at month 6.
        if month == 6 {
            engine.add_deal(&PositionConfig::new(
                "MuTrading Co",
                4_400_000.0,
                0.4,
                0.8,
                6,
                12,
            )?)?;
        }

        let net_trade = trade_schedule[(month as usize) % trade_schedule.len()];
        let balances = engine.process_market_change(month, current_price, net_trade)?;

        // Redemption schedule kicks in at month 12 with a flat 1% rate.
        if month >= REDEMPTION_START_MONTH {
            reserve.handle_redemptions(month, 1.0)?;
        }
        reserve.step(month)?;
        current_price = Price::new(reserve.price_history()[month as usize])?;

        // Depth within 10% of the current price, summed over both sources.
        let (pairs_leaf, pairs_usd) = engine.liquidity_within_percentage(10.0, current_price)?;
        let (reserve_leaf, reserve_usd) =
            reserve.get_liquidity_within_percentage(10.0, current_price)?;

        println!(
            "{month:5}  {net_trade:10.0}  {:9}  {:14.0}  {:15.0}  {:6.4}",
            balances.len(),
            pairs_leaf + reserve_leaf,
            pairs_usd + reserve_usd,
            current_price.get(),
        );

        // Report deals retiring this month with their final balances.
        let ending = engine.get_deals_end_in_month(month, current_price)?;
        for (counterparty, (leaf, leaf_usd)) in &ending {
            println!("       └─ {counterparty} exited with {leaf:.0} LEAF (${leaf_usd:.0})");
        }
    }

    // ── 3. End-of-run summary ───────────────────────────────────────────
    println!("\n=== Final positions ===");
    let metrics = engine.get_liquidity_metrics(MAX_MONTHS - 1, current_price)?;
    for (counterparty, m) in &metrics {
        println!(
            "{counterparty:<20} {:>14.0} LEAF  ${:>12.0} paired  ratio {:.3}",
            m.leaf_balance_tokens, m.other_balance_usd, m.current_ratio,
        );
    }

    let state = reserve.get_state();
    println!(
        "\nReserve: {:.0} LEAF / ${:.0} at ${:.4} ({} redemptions processed)",
        state.leaf_balance,
        state.paired_balance,
        state.price,
        reserve.redemption_history().len(),
    );

    Ok(())
}

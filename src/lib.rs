//! # LEAF Liquidity
//!
//! Liquidity allocation and reserve engine for the LEAF token economy.
//!
//! This crate simulates how a pool of a native token ("LEAF") and a paired
//! asset are allocated across many independently-configured liquidity
//! positions, and how a reserve pool backstops those positions while
//! processing periodic proportional redemptions. It is an in-process library:
//! an external driver supplies a price and a net trade value each simulated
//! month, and reads back balances and liquidity metrics.
//!
//! # Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! leaf-liquidity = "0.1"
//! ```
//!
//! ## Distribute a monthly trade and step the reserve
//!
//! ```rust
//! use leaf_liquidity::config::{EngineConfig, PositionConfig, ReserveConfig};
//! use leaf_liquidity::domain::Price;
//! use leaf_liquidity::engine::{AllocationEngine, ReservePool};
//! use leaf_liquidity::traits::{FromConfig, LiquiditySource};
//!
//! // 1. Describe the opening deal book.
//! let book = EngineConfig::new(vec![
//!     PositionConfig::new("Move", 1_500_000.0, 0.35, 0.5, 1, 60).expect("valid deal"),
//! ])
//! .expect("valid book");
//!
//! // 2. Build the engine and the reserve.
//! let mut engine = AllocationEngine::from_config(&book).expect("engine built");
//! let reserve_config = ReserveConfig::new(1_000_000_000.0, 500_000.0, 0.005, 60)
//!     .expect("valid config");
//! let mut reserve = ReservePool::from_config(&reserve_config).expect("reserve built");
//!
//! // 3. One simulated month: distribute a net sell of 50 000 USD of LEAF.
//! let price = Price::ONE;
//! let balances = engine.process_market_change(1, price, 50_000.0).expect("distributed");
//! assert!((balances["Move"].other - 1_025_000.0).abs() < 1e-6);
//!
//! // 4. Reserve housekeeping: redemption, decay, history.
//! let (leaf_redeemed, _) = reserve.handle_redemptions(1, 2.0).expect("first redemption");
//! assert_eq!(leaf_redeemed, 20_000_000.0);
//! reserve.step(1).expect("within run length");
//!
//! // 5. Depth both models report to the external price model.
//! let (reserve_leaf, _) = reserve.liquidity_within_percentage(10.0, price).expect("depth");
//! let (pairs_leaf, _) = engine.liquidity_within_percentage(10.0, price).expect("depth");
//! assert!(reserve_leaf > pairs_leaf);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │  Driver (extern)  │  price model, redemption schedule, deal loading
//! └───────┬──────────┘
//!         │ monthly: price + net trade / redemption rate
//!         ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │ AllocationEngine  │      │   ReservePool     │
//! │  distribute trade │      │  redeem + decay   │
//! │  snapshot months  │      │  record history   │
//! └───────┬──────────┘      └───────┬──────────┘
//!         │ weighted_liquidity       │ 1x / 5x concentration
//!         ▼                          ▼
//! ┌──────────────────┐      ┌──────────────────┐
//! │ LiquidityPosition │      │   math::depth     │
//! └──────────────────┘      └──────────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Validated value types: [`Price`](domain::Price), [`TargetRatio`](domain::TargetRatio), [`Concentration`](domain::Concentration), [`LiquidityPosition`](domain::LiquidityPosition), … |
//! | [`config`] | Declarative blueprints: [`PositionConfig`](config::PositionConfig), [`EngineConfig`](config::EngineConfig), [`ReserveConfig`](config::ReserveConfig) |
//! | [`traits`] | Core seams: [`FromConfig`](traits::FromConfig), [`LiquiditySource`](traits::LiquiditySource) |
//! | [`engine`] | [`AllocationEngine`](engine::AllocationEngine), [`ReservePool`](engine::ReservePool), snapshot history |
//! | [`math`]   | Shared liquidity-depth math |
//! | [`error`]  | [`EngineError`](error::EngineError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |
//!
//! # Execution model
//!
//! Single-threaded, synchronous, batch: one simulated month is fully
//! processed before the next begins. Months move in non-decreasing order and
//! at most one month at a time; re-processing the *current* month is the only
//! permitted time travel, implemented as a full rollback to the prior month's
//! snapshot before reapplying. Within one distribution the engine guarantees
//! atomicity across positions: every per-position change is computed and
//! validated before any is committed.

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod math;
pub mod prelude;
pub mod traits;

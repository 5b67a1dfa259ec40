//! Fundamental domain value types used throughout the engine.
//!
//! This module contains the core value types that model the allocation
//! domain: prices, target ratios, concentrations, deal identities, lifecycle
//! rules, and the liquidity position itself. Scalar parameters use newtypes
//! with validated constructors to enforce invariants at the door.

mod concentration;
mod deal_id;
mod exit_condition;
mod position;
mod price;
mod target_ratio;

pub use concentration::Concentration;
pub use deal_id::{DealId, DealIdAllocator};
pub use exit_condition::{ExitCondition, ExitContext};
pub use position::{LiquidityPosition, PositionBalances};
pub use price::Price;
pub use target_ratio::TargetRatio;

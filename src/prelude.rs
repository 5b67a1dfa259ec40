//! Convenience re-exports for common types and traits.
//!
//! The prelude provides a single import to bring all commonly used items
//! into scope:
//!
//! ```rust
//! use leaf_liquidity::prelude::*;
//! ```
//!
//! This re-exports the most frequently used domain types, core traits,
//! configuration types, engine components, and error types so that consumers
//! don't need to import from individual submodules.

// Re-export domain types
pub use crate::domain::{
    Concentration, DealId, DealIdAllocator, ExitCondition, LiquidityPosition, PositionBalances,
    Price, TargetRatio,
};

// Re-export core traits
pub use crate::traits::{FromConfig, LiquiditySource};

// Re-export configuration
pub use crate::config::{EngineConfig, PositionConfig, ReserveConfig};

// Re-export engine components
pub use crate::engine::{
    AllocationEngine, LiquidityMetrics, PositionSnapshot, ReservePool, ReserveState,
    SnapshotHistory,
};

// Re-export error types
pub use crate::error::{EngineError, Result};

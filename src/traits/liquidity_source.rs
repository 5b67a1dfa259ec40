//! Shared depth-reporting seam.
//!
//! Both the reserve pool and the allocation engine answer the same question
//! for the external price model: *how much of each asset is tradable within a
//! percentage band of the current price?* [`LiquiditySource`] is that seam —
//! the driver sums the answers across sources to estimate total market depth
//! before applying a trade.

use crate::domain::Price;
use crate::error::EngineError;

/// A source of two-sided liquidity that can report its depth near a price.
///
/// # Implementors
///
/// - `ReservePool` — reserve balances with asymmetric 1x/5x concentration
/// - `AllocationEngine` — the sum over currently active positions
///
/// # Errors
///
/// Implementations return [`EngineError::InvalidParameter`] for a
/// `range_pct` outside `(0, 100)` exclusive, and `(0.0, 0.0)` — not an
/// error — when they currently hold no liquidity.
pub trait LiquiditySource {
    /// Returns `(leaf_amount, paired_amount)` tradable within `range_pct`
    /// percent of `price`.
    fn liquidity_within_percentage(
        &self,
        range_pct: f64,
        price: Price,
    ) -> Result<(f64, f64), EngineError>;
}

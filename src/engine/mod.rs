//! The allocation engine and the reserve pool.
//!
//! Both components are stepped month by month by the external simulation
//! driver and publish liquidity metrics through the
//! [`LiquiditySource`](crate::traits::LiquiditySource) seam:
//!
//! | Component | Role |
//! |-----------|------|
//! | [`AllocationEngine`] | distributes the monthly net trade across positions, keeps rollback-capable snapshots |
//! | [`ReservePool`] | backstop balances with proportional redemption and price decay |
//! | [`SnapshotHistory`] | month-keyed balance records shared by rollback and history queries |

mod allocation;
mod reserve;
mod snapshot;

#[cfg(test)]
mod proptest_properties;

pub use allocation::{AllocationEngine, LiquidityMetrics};
pub use reserve::{ReservePool, ReserveState};
pub use snapshot::{PositionSnapshot, SnapshotHistory};

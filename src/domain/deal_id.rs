//! Deal identifiers and their allocator.
//!
//! Every position carries a [`DealId`] stamped at construction time by a
//! [`DealIdAllocator`]. The allocator is a single explicit object owned by the
//! component that constructs positions (the engine) and is never duplicated —
//! sequence state lives in exactly one place.

use core::fmt;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier of a deal, e.g. `Move_001`.
///
/// Built from the first ten alphanumeric characters of the counterparty name
/// plus a per-counterparty zero-padded sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DealId(String);

impl DealId {
    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allocates [`DealId`]s with a per-counterparty sequence.
///
/// ```
/// use leaf_liquidity::domain::DealIdAllocator;
///
/// let mut ids = DealIdAllocator::new();
/// assert_eq!(ids.next_id("Move").as_str(), "Move_001");
/// assert_eq!(ids.next_id("Move").as_str(), "Move_002");
/// assert_eq!(ids.next_id("Alpha Trading LLC").as_str(), "AlphaTradi_001");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DealIdAllocator {
    sequences: BTreeMap<String, u32>,
}

impl DealIdAllocator {
    /// Creates an allocator with no issued identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next identifier for `counterparty`.
    pub fn next_id(&mut self, counterparty: &str) -> DealId {
        let base: String = counterparty
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(10)
            .collect();
        let seq = self
            .sequences
            .entry(counterparty.to_owned())
            .and_modify(|s| *s += 1)
            .or_insert(1);
        DealId(format!("{base}_{seq:03}"))
    }
}

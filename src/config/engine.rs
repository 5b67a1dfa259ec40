//! Configuration for the allocation engine: the opening deal book.

use serde::{Deserialize, Serialize};

use super::PositionConfig;
use crate::error::EngineError;

/// The set of deals the engine opens with.
///
/// Counterparty names are the positions' unique keys, so the deal book
/// rejects duplicates at validation time — the same check
/// [`AllocationEngine::add_deal`](crate::engine::AllocationEngine::add_deal)
/// performs for deals added mid-run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    positions: Vec<PositionConfig>,
}

impl EngineConfig {
    /// Creates a validated deal book.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any deal fails its own
    /// validation or two deals share a counterparty.
    pub fn new(positions: Vec<PositionConfig>) -> crate::error::Result<Self> {
        let config = Self { positions };
        config.validate()?;
        Ok(config)
    }

    /// Validates every deal and the uniqueness of counterparty names.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] on the first violation.
    pub fn validate(&self) -> crate::error::Result<()> {
        for (i, position) in self.positions.iter().enumerate() {
            position.validate()?;
            if self.positions[..i]
                .iter()
                .any(|other| other.counterparty() == position.counterparty())
            {
                return Err(EngineError::invalid_parameter(format!(
                    "deal with {} already exists",
                    position.counterparty()
                )));
            }
        }
        Ok(())
    }

    /// Returns the configured deals.
    #[must_use]
    pub fn positions(&self) -> &[PositionConfig] {
        &self.positions
    }
}

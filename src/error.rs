//! Unified error types for the liquidity engine.
//!
//! All fallible operations across the crate return [`EngineError`] as their
//! error type, ensuring a consistent error handling experience for consumers.
//!
//! Every variant signals a fail-fast configuration or sequencing bug: none is
//! retried and none is recoverable mid-call. An error aborts the triggering
//! call with no partial state mutation — the engine buffers candidate balance
//! changes and commits only after every position validates.

use thiserror::Error;

/// Convenience alias used by every fallible signature in the crate.
pub type Result<T> = core::result::Result<T, EngineError>;

/// Unified error enum for the liquidity allocation and reserve engine.
///
/// # Variants by failure class
///
/// | Variant | Raised by |
/// |---------|-----------|
/// | [`InvalidSequencing`](Self::InvalidSequencing) | month processed out of order, or queried beyond the current month |
/// | [`DuplicateRedemption`](Self::DuplicateRedemption) | second redemption for an already-processed month |
/// | [`NegativeBalance`](Self::NegativeBalance) | a trade or adjustment would drive a balance below zero |
/// | [`ZeroLiquidity`](Self::ZeroLiquidity) | distributing a trade over zero total weighted liquidity |
/// | [`InvalidParameter`](Self::InvalidParameter) | out-of-range ratio, concentration, percentage, or duplicate counterparty |
/// | [`MissingSnapshot`](Self::MissingSnapshot) | history lookup for a month with no recorded snapshot |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Month cannot be processed from the engine's current month: it is
    /// either in the past or more than one month ahead.
    #[error("invalid sequencing: month {month} cannot be processed from current month {current}")]
    InvalidSequencing {
        /// The month passed by the caller.
        month: u32,
        /// The engine's current month at call time.
        current: u32,
    },

    /// Redemptions were already processed for this month.
    #[error("redemptions already processed for month {0}")]
    DuplicateRedemption(u32),

    /// The computed trade or adjustment would drive a balance below zero.
    #[error("{side} balance of {owner} would go below zero")]
    NegativeBalance {
        /// The counterparty (or `"reserve"`) whose balance would underflow.
        owner: String,
        /// Which side of the pair: `"LEAF"` or `"paired"`.
        side: &'static str,
    },

    /// Total weighted liquidity across active positions is zero while a trade
    /// must be distributed.
    #[error("total weighted liquidity across active positions is zero")]
    ZeroLiquidity,

    /// A configuration or query parameter is out of range, or a counterparty
    /// is already present.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No snapshot has been recorded for the requested month.
    #[error("no snapshot recorded for month {0}")]
    MissingSnapshot(u32),
}

impl EngineError {
    /// Shorthand constructor for [`InvalidParameter`](Self::InvalidParameter).
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Shorthand constructor for [`NegativeBalance`](Self::NegativeBalance).
    pub fn negative_balance(owner: impl Into<String>, side: &'static str) -> Self {
        Self::NegativeBalance {
            owner: owner.into(),
            side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_months() {
        let err = EngineError::InvalidSequencing {
            month: 7,
            current: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn negative_balance_names_owner_and_side() {
        let err = EngineError::negative_balance("Move", "LEAF");
        assert_eq!(err.to_string(), "LEAF balance of Move would go below zero");
    }
}

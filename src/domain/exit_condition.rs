//! Data-driven position lifecycle rules.
//!
//! A position's activity window always starts at `start_month` and never
//! extends past `end_month`. The [`ExitCondition`] decides whether the
//! position additionally exits *early*. The set of kinds is closed and each
//! kind is evaluated by a pure function over an [`ExitContext`], so lifecycle
//! rules stay testable in isolation — no callbacks, no captured state.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Inputs to an exit-condition evaluation, assembled by the engine for the
/// month being processed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitContext {
    /// The month under evaluation.
    pub month: u32,
    /// The position's fixed-term end month (`start_month + duration_months`).
    pub end_month: u32,
    /// The position's total value in USD at the evaluation price.
    pub total_value_usd: f64,
    /// `current_ratio − target_ratio` at the evaluation price.
    pub ratio_deviation: f64,
}

/// When a position stops participating in trade distribution.
///
/// Every variant exits at `end_month` at the latest; the non-fixed kinds add
/// an early exit on top of the fixed window. A position that has exited is
/// never resurrected — the engine only ever moves forward in time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExitCondition {
    /// Active for the whole `[start_month, end_month)` window. The canonical
    /// kind; all standard deals use it.
    #[default]
    FixedTerm,

    /// Exits early once the position's total value decays below a USD floor.
    DecayUntilFloor {
        /// Total-value floor in USD.
        floor_usd: f64,
    },

    /// Exits early once the native-token share drifts further from target
    /// than the configured bound.
    RateThreshold {
        /// Maximum tolerated `|current_ratio − target_ratio|`.
        max_deviation: f64,
    },
}

impl ExitCondition {
    /// Returns `true` if the position should no longer participate.
    #[must_use]
    pub fn is_met(&self, ctx: &ExitContext) -> bool {
        if ctx.month >= ctx.end_month {
            return true;
        }
        match self {
            Self::FixedTerm => false,
            Self::DecayUntilFloor { floor_usd } => ctx.total_value_usd < *floor_usd,
            Self::RateThreshold { max_deviation } => ctx.ratio_deviation.abs() > *max_deviation,
        }
    }

    /// Validates the variant's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if a threshold is negative
    /// or non-finite.
    pub fn validate(&self) -> crate::error::Result<()> {
        match self {
            Self::FixedTerm => Ok(()),
            Self::DecayUntilFloor { floor_usd } => {
                if !floor_usd.is_finite() || *floor_usd < 0.0 {
                    return Err(EngineError::invalid_parameter(
                        "exit floor must be finite and non-negative",
                    ));
                }
                Ok(())
            }
            Self::RateThreshold { max_deviation } => {
                if !max_deviation.is_finite() || *max_deviation < 0.0 {
                    return Err(EngineError::invalid_parameter(
                        "deviation threshold must be finite and non-negative",
                    ));
                }
                Ok(())
            }
        }
    }
}

//! Generic construction trait for building engine components from
//! configuration.
//!
//! [`FromConfig`] provides a uniform interface for creating component
//! instances from their respective configuration structs.
//!
//! # Validation Contract
//!
//! Implementations **must** validate all configuration invariants during
//! construction. A successfully constructed component is guaranteed to be in
//! a valid initial state.
//!
//! # No Generic Blanket Implementation
//!
//! There is no `impl<T> FromConfig<T>` blanket — each component explicitly
//! implements the trait for its specific config type, so every
//! component-config pairing is intentional and validation stays
//! component-specific.

use crate::error::EngineError;

/// Generic construction trait for building a component from a configuration.
///
/// # Type Parameters
///
/// - `C` — the configuration type that fully describes the component's
///   immutable parameters.
///
/// # Implementors
///
/// - `impl FromConfig<ReserveConfig> for ReservePool`
/// - `impl FromConfig<EngineConfig> for AllocationEngine`
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] if the configuration is invalid.
pub trait FromConfig<C> {
    /// Creates a new instance from the given configuration.
    ///
    /// The configuration is taken by reference because it may be reused
    /// (e.g., for logging or to build a second, independent run).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidParameter`] if any parameter is out of
    /// range or inconsistent.
    fn from_config(config: &C) -> Result<Self, EngineError>
    where
        Self: Sized;
}

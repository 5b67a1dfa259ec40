//! Declarative configuration structs.
//!
//! Every long-lived object in the crate is created from a validated config:
//! [`PositionConfig`] describes one counterparty deal, [`EngineConfig`] the
//! opening deal book, and [`ReserveConfig`] the reserve pool. Construction
//! goes through `new() -> validate()`, so a config in hand is always a valid
//! one; deserialized configs are re-validated at build time.

mod engine;
mod position;
mod reserve;

pub use engine::EngineConfig;
pub use position::PositionConfig;
pub use reserve::ReserveConfig;

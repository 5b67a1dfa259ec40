//! Core abstractions: construction and depth-reporting seams.

mod from_config;
mod liquidity_source;

pub use from_config::FromConfig;
pub use liquidity_source::LiquiditySource;

//! Liquidity depth within a price band.
//!
//! Computes, for a constant-product-style pool with independent per-side
//! concentration multipliers, how much of each asset can be traded before the
//! price moves outside `[price·(1 − pct/100), price·(1 + pct/100)]`.
//!
//! # Algorithm
//!
//! 1. Re-center the pool on the current price via virtual reserves:
//!    `virtual_x = √(x·y / price)`, `virtual_y = virtual_x · price`.
//! 2. Depth constant `L = √(virtual_x · virtual_y)`.
//! 3. Band amounts from the constant-product price bounds:
//!    `x = L·(1/√p_lower − 1/√p_upper)`, `y = L·(√p_upper − √p_lower)`.
//! 4. Scale each side by its concentration multiplier and by the ratio of
//!    actual to virtual reserves, apply the `√price` impact adjustment, clamp
//!    to the actual reserves, and round to 8 decimal places.
//!
//! A multiplier above 1 models liquidity concentrated near the current price
//! (the paired-asset side of the reserve pool uses 5); exactly 1 models a
//! vanilla constant-product curve.
//!
//! Pure functions only — no state, safe to call concurrently.

use crate::domain::Price;
use crate::error::EngineError;

/// Decimal places kept in depth results.
const RESULT_DECIMALS: i32 = 8;

fn round_result(value: f64) -> f64 {
    let scale = 10f64.powi(RESULT_DECIMALS);
    (value * scale).round() / scale
}

/// Returns `(x_amount, y_amount)` tradable within `range_pct` percent of
/// `current_price`.
///
/// `x_reserve` is the native-token side (LEAF tokens), `y_reserve` the
/// paired-asset side (USD). Returns `(0.0, 0.0)` if either reserve is zero —
/// the non-error convention for zero-liquidity reads.
///
/// # Errors
///
/// Returns [`EngineError::InvalidParameter`] if `range_pct` is outside
/// `(0, 100)` exclusive.
///
/// # Examples
///
/// ```
/// use leaf_liquidity::math::depth::liquidity_within_range;
/// use leaf_liquidity::domain::Price;
///
/// let price = Price::ONE;
/// let (leaf, usd) = liquidity_within_range(1_000_000.0, 1_000_000.0, price, 5.0, 1.0, 1.0)
///     .expect("valid range");
/// assert!(leaf > 0.0 && leaf <= 1_000_000.0);
/// assert!(usd > 0.0 && usd <= 1_000_000.0);
/// ```
pub fn liquidity_within_range(
    x_reserve: f64,
    y_reserve: f64,
    current_price: Price,
    range_pct: f64,
    x_concentration: f64,
    y_concentration: f64,
) -> crate::error::Result<(f64, f64)> {
    if !range_pct.is_finite() || range_pct <= 0.0 || range_pct >= 100.0 {
        return Err(EngineError::invalid_parameter(
            "price range percentage must be between 0 and 100",
        ));
    }
    if x_reserve == 0.0 || y_reserve == 0.0 {
        return Ok((0.0, 0.0));
    }

    let price = current_price.get();
    let band = range_pct / 100.0;
    let price_upper = price * (1.0 + band);
    let price_lower = price * (1.0 - band);

    // Virtual reserves that would put a balanced pool at the current price.
    let virtual_x = (x_reserve * y_reserve / price).sqrt();
    let virtual_y = virtual_x * price;
    let depth = (virtual_x * virtual_y).sqrt();

    let mut x_within = depth * (1.0 / price_lower.sqrt() - 1.0 / price_upper.sqrt());
    let mut y_within = depth * (price_upper.sqrt() - price_lower.sqrt());

    x_within *= x_concentration;
    y_within *= y_concentration;

    // Scale from the balanced virtual pool back to the actual reserves.
    x_within *= x_reserve / virtual_x;
    y_within *= y_reserve / virtual_y;

    let price_factor = price.sqrt();
    x_within /= price_factor;
    y_within *= price_factor;

    let x_within = round_result(x_within.min(x_reserve));
    let y_within = round_result(y_within.min(y_reserve));

    Ok((x_within, y_within))
}

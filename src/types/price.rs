//! Price keys.
//!
//! ## Overview
//!
//! The public API speaks `f64` prices, but the book keys its hash caches and
//! ordered indexes by [`Price`]. Floats are neither `Eq`, `Hash` nor `Ord`,
//! so every finite `f64` is mapped onto a `u64` whose unsigned order is the
//! numeric order of the floats:
//!
//! ```text
//! positive:  bits | SIGN_BIT      (above every negative)
//! negative:  !bits                (larger magnitude sorts lower)
//! ```
//!
//! The mapping is exact and reversible. Two prices share a level only when
//! they are the same `f64`; `-0.0` and `0.0` are the same price.
//!
//! Callers that quote in decimals go through [`from_decimal`] and
//! [`to_decimal`].
//!
//! ## Examples
//!
//! ```
//! use hft_orderbook::types::price::{from_f64, to_f64};
//!
//! let price = from_f64(50000.12345678).unwrap();
//! assert_eq!(to_f64(price), 50000.12345678);
//! assert!(from_f64(-1.0).unwrap() < from_f64(0.5).unwrap());
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// Order-preserving price key
pub type Price = u64;

const SIGN_BIT: u64 = 1 << 63;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert an `f64` price to its key
///
/// # Returns
///
/// * `Some(Price)` - For every finite value, with no rounding
/// * `None` - If the value is NaN or infinite
///
/// # Example
///
/// ```
/// use hft_orderbook::types::price::from_f64;
///
/// assert!(from_f64(1e-9) < from_f64(2e-9));
/// assert_eq!(from_f64(-0.0), from_f64(0.0));
/// assert_eq!(from_f64(f64::NAN), None);
/// ```
pub fn from_f64(value: f64) -> Option<Price> {
    if !value.is_finite() {
        return None;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    Some(if bits & SIGN_BIT == 0 { bits | SIGN_BIT } else { !bits })
}

/// Convert a key back to the exact `f64` it was built from
#[inline]
pub fn to_f64(price: Price) -> f64 {
    let bits = if price & SIGN_BIT != 0 { price & !SIGN_BIT } else { !price };
    f64::from_bits(bits)
}

/// Key for a decimal quote, through its nearest `f64`
///
/// # Returns
///
/// * `None` - If the decimal has no finite `f64` counterpart
pub fn from_decimal(d: Decimal) -> Option<Price> {
    from_f64(d.to_f64()?)
}

/// Shortest decimal that reads back as the key's `f64`
///
/// # Example
///
/// ```
/// use hft_orderbook::types::price::{from_f64, to_decimal};
/// use rust_decimal::Decimal;
///
/// let price = from_f64(50000.25).unwrap();
/// assert_eq!(to_decimal(price), Some(Decimal::new(5_000_025, 2)));
/// ```
pub fn to_decimal(price: Price) -> Option<Decimal> {
    Decimal::from_f64(to_f64(price))
}

// ============================================================================
// Unit Tests
// ============================================================================

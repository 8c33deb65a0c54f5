//! Order types for the limit order book.
//!
//! An [`Order`] is built by the caller and handed to
//! [`Orderbook::add`](crate::orderbook::Orderbook::add). Its price is not
//! part of the order: the book files it under the price passed to `add`.

use std::fmt;

// ============================================================================
// Side enum
// ============================================================================

/// Side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Side {
    /// Buy interest; best price is the highest
    #[default]
    Bid,
    /// Sell interest; best price is the lowest
    Ask,
}

impl Side {
    /// Returns `true` for [`Side::Bid`]
    #[inline]
    pub fn is_bid(self) -> bool {
        matches!(self, Side::Bid)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => f.write_str("bid"),
            Side::Ask => f.write_str("ask"),
        }
    }
}

// ============================================================================
// Order struct
// ============================================================================

/// A resting limit order.
///
/// `id` uniqueness per side and a non-negative `volume` are the caller's
/// responsibility; the book rejects non-finite or negative volumes but does
/// not police duplicate ids.
///
/// ## Example
///
/// ```
/// use hft_orderbook::types::{Order, Side};
///
/// let order = Order::new(1, 0.25, Side::Bid);
/// assert!(order.side.is_bid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Order {
    /// Caller-assigned identifier
    pub id: u64,

    /// Quantity resting at the level
    pub volume: f64,

    /// Book side
    pub side: Side,
}

impl Order {
    /// Create a new order
    ///
    /// # Arguments
    ///
    /// * `id` - Caller-assigned identifier
    /// * `volume` - Non-negative quantity
    /// * `side` - Bid or Ask
    pub fn new(id: u64, volume: f64, side: Side) -> Self {
        Self { id, volume, side }
    }

    /// Shorthand for a bid order
    pub fn bid(id: u64, volume: f64) -> Self {
        Self::new(id, volume, Side::Bid)
    }

    /// Shorthand for an ask order
    pub fn ask(id: u64, volume: f64) -> Self {
        Self::new(id, volume, Side::Ask)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(Side::Bid.to_string(), "bid");
        assert_eq!(Side::Ask.to_string(), "ask");
    }

    #[test]
    fn test_side_is_bid() {
        assert!(Side::Bid.is_bid());
        assert!(!Side::Ask.is_bid());
        assert_eq!(Side::default(), Side::Bid);
    }

    #[test]
    fn test_order_constructors() {
        let bid = Order::bid(7, 1.5);
        assert_eq!(bid, Order::new(7, 1.5, Side::Bid));

        let ask = Order::ask(8, 0.5);
        assert_eq!(ask.side, Side::Ask);
        assert_eq!(ask.id, 8);
        assert_eq!(ask.volume, 0.5);
    }
}

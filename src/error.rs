//! Error types for the price index, the indexed heap and the order book.
//!
//! Every variant is a caller precondition violation. Benign absence
//! (volume queries and level deletion on a missing price) never produces
//! an error; those operations return zero or do nothing instead.

use thiserror::Error;

use crate::types::Side;

/// Failures reported by [`OrderedIndex`](crate::index::OrderedIndex).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("price index is empty")]
    Empty,
    #[error("key is not present in the price index")]
    KeyNotFound,
    #[error("no key is less than or equal to the query")]
    NoFloor,
    #[error("no key is greater than or equal to the query")]
    NoCeiling,
    #[error("rank {rank} is out of range for an index of {len} keys")]
    RankOutOfRange { rank: usize, len: usize },
    #[error("key range falls outside [min, max] of the index")]
    RangeOutOfBounds,
}

/// Failures reported by [`IndexedMinHeap`](crate::index::IndexedMinHeap).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    #[error("slot {slot} is outside the heap capacity {capacity}")]
    SlotOutOfRange { slot: usize, capacity: usize },
    #[error("slot {0} is already in use")]
    SlotInUse(usize),
    #[error("slot {0} holds no key")]
    SlotVacant(usize),
    #[error("heap is full ({capacity} keys)")]
    Full { capacity: usize },
    #[error("heap is empty")]
    Empty,
}

/// Failures reported by [`Orderbook`](crate::orderbook::Orderbook) and
/// [`PriceLevel`](crate::orderbook::PriceLevel).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("price {0} is not a finite number")]
    InvalidPrice(f64),
    #[error("volume {0} must be finite and non-negative")]
    InvalidVolume(f64),
    #[error("there is no {side} level at price {price}")]
    NoSuchLevel { side: Side, price: f64 },
    #[error("order {0} does not exist")]
    OrderNotFound(usize),
    #[error("order {0} is not resting in any price level")]
    OrderNotResting(usize),
    #[error("order {0} is not queued here")]
    OrderNotQueued(usize),
    #[error("order {order} does not belong to the level at price {price}")]
    OrderNotInLevel { order: usize, price: f64 },
    #[error("{0} side of the book is empty")]
    EmptySide(Side),
    #[error(transparent)]
    Index(#[from] IndexError),
}

//! # hft-orderbook
//!
//! In-memory core of a limit order book.
//!
//! ## Architecture
//!
//! - **Types**: caller-built `Order`, `Side`, order-preserving `Price` key
//! - **Index**: price-ordered index (left-leaning red-black tree or plain
//!   BST) with cached min/max and a key-ordered list, plus an indexed
//!   min-heap alternative
//! - **OrderBook**: FIFO price levels, hash caches and the bid/ask facade
//!
//! ## Design Principles
//!
//! 1. **Levels are logarithmic, orders are constant**: only opening or
//!    closing a price level touches the tree
//! 2. **Exact price keys**: every finite `f64` price maps to its own `u64`
//!    key with the same ordering, so no two prices share a level
//! 3. **Arena storage**: orders, levels and tree nodes live in slabs and
//!    refer to each other by key
//! 4. **No panics on bad input**: precondition violations come back as
//!    errors before anything is mutated
//!
//! ## Example
//!
//! ```
//! use hft_orderbook::{Order, Orderbook};
//!
//! let mut book = Orderbook::new();
//! for i in 0..100u64 {
//!     book.add(i as f64, Order::bid(i, 1.0)).unwrap();
//!     book.add(100.0 + i as f64, Order::ask(i, 1.0)).unwrap();
//! }
//!
//! assert_eq!(book.best_bid(), Ok(99.0));
//! assert_eq!(book.best_offer(), Ok(100.0));
//! assert_eq!(book.bid_levels(), 100);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

/// Error enums for the index, the heap and the book
pub mod error;

/// Core data types: Order, Side, Price
pub mod types;

/// Ordered price index and indexed min-heap
pub mod index;

/// Order book: queues, price levels and the facade
pub mod orderbook;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use error::{BookError, HeapError, IndexError};
pub use index::{Balance, IndexedMinHeap, OrderedIndex, PlainIndex, RedBlack, Unbalanced};
pub use orderbook::{OrderKey, OrderNode, OrderQueue, Orderbook, OrderbookConfig, PriceLevel};
pub use types::{Order, Price, Side};

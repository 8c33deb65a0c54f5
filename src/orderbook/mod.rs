//! Order book: price levels, their FIFO queues and the two-sided facade.
//!
//! ## Architecture
//!
//! - **Slab-based storage**: orders and levels live in slabs and link to
//!   each other by key
//! - **Ordered price index**: per-side red-black index with O(1) best price
//! - **Hash caches**: per-side price to level lookup for O(1) adds
//!
//! ## Components
//!
//! - [`OrderNode`]: `Order` plus queue links and a [`LevelRef`]
//! - [`OrderQueue`]: intrusive FIFO over order keys
//! - [`PriceLevel`]: one price, its queue and its running volume
//! - [`Orderbook`]: bid and ask sides behind one API
//! - [`OrderbookConfig`]: sizing hints
//!
//! ## Example
//!
//! ```
//! use hft_orderbook::orderbook::Orderbook;
//! use hft_orderbook::types::Order;
//!
//! let mut book = Orderbook::with_capacity(10_000);
//! book.add(50_000.5, Order::bid(1, 0.25)).unwrap();
//! book.add(50_000.5, Order::bid(2, 0.75)).unwrap();
//!
//! assert_eq!(book.best_bid(), Ok(50_000.5));
//! assert_eq!(book.volume_at_bid_limit(50_000.5), 1.0);
//! assert_eq!(book.bid_levels(), 1);
//! ```

pub mod book;
pub mod config;
pub mod level;
pub mod node;
pub mod queue;

pub use book::{LevelIndex, Orderbook};
pub use config::{
    OrderbookConfig, DEFAULT_ORDER_CAPACITY, DEFAULT_RECLAIM_BATCH, MAX_LEVELS_PER_SIDE,
};
pub use level::PriceLevel;
pub use node::{LevelRef, OrderKey, OrderNode};
pub use queue::{OrderQueue, QueueIter};

//! Core data types for the order book
//!
//! ## Types
//!
//! - [`Order`]: A caller-built order (id, volume, side)
//! - [`Side`]: Bid or Ask
//! - [`Price`]: Order-preserving `u64` key of an `f64` price
//!
//! ## Price Keys
//!
//! Prices cross the public API as `f64` and are stored as `u64` keys whose
//! integer order is the price order. Every finite `f64` has its own key.

mod order;
pub mod price;

pub use order::{Order, Side};
pub use price::Price;

//! Price-level indexes
//!
//! ## Components
//!
//! - [`OrderedIndex`]: ordered map with cached min/max and a key-ordered
//!   list threaded through its nodes, generic over a [`Balance`] strategy
//! - [`RedBlack`] / [`Unbalanced`]: left-leaning red-black tree or plain BST
//! - [`IndexedMinHeap`]: fixed-capacity slot-addressed min-heap, an
//!   alternative when only the best price matters

mod balance;
mod heap;
mod tree;

pub use balance::{Balance, RedBlack, Unbalanced};
pub use heap::IndexedMinHeap;
pub use tree::{Arena, Iter, OrderedIndex};

/// Ordered index backed by a plain BST
pub type PlainIndex<K, V> = OrderedIndex<K, V, Unbalanced>;

//! FIFO order queue for a single price level.
//!
//! ## Queue Structure
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! The queue only holds the endpoints and a length; the links live in the
//! [`OrderNode`]s of the shared order slab. Every operation is O(1).
//!
//! The queue can only vouch for its endpoints: an order at the head or tail
//! of some other queue is rejected, one from the middle of another queue is
//! not. [`PriceLevel`](crate::orderbook::PriceLevel) checks the order's
//! level back-reference before asking the queue to unlink it.

use slab::Slab;

use crate::error::BookError;
use crate::orderbook::node::{OrderKey, OrderNode};

/// Intrusive doubly-linked FIFO over slab keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQueue {
    head: Option<OrderKey>,
    tail: Option<OrderKey>,
    len: usize,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest order
    #[inline]
    pub fn head(&self) -> Option<OrderKey> {
        self.head
    }

    /// Newest order
    #[inline]
    pub fn tail(&self) -> Option<OrderKey> {
        self.tail
    }

    /// Append `key` at the tail
    ///
    /// # Errors
    ///
    /// `OrderNotFound` if `key` is not in the slab
    pub fn enqueue(&mut self, key: OrderKey, orders: &mut Slab<OrderNode>) -> Result<(), BookError> {
        let node = orders.get_mut(key).ok_or(BookError::OrderNotFound(key))?;
        node.prev = self.tail;
        node.next = None;

        match self.tail {
            Some(tail) => {
                if let Some(tail_node) = orders.get_mut(tail) {
                    tail_node.next = Some(key);
                }
            }
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.len += 1;
        Ok(())
    }

    /// Remove and return the head, or `None` when the queue is empty.
    pub fn dequeue(&mut self, orders: &mut Slab<OrderNode>) -> Option<OrderKey> {
        let head = self.head?;
        self.unlink(head, orders);
        Some(head)
    }

    /// Unlink `key` from anywhere in the queue.
    ///
    /// # Errors
    ///
    /// * `OrderNotFound` - `key` is not in the slab
    /// * `OrderNotQueued` - the queue is empty, or `key` has no neighbour on
    ///   one side without being this queue's head or tail
    pub fn delete(&mut self, key: OrderKey, orders: &mut Slab<OrderNode>) -> Result<(), BookError> {
        let node = orders.get(key).ok_or(BookError::OrderNotFound(key))?;
        let foreign_head = node.prev.is_none() && self.head != Some(key);
        let foreign_tail = node.next.is_none() && self.tail != Some(key);
        if self.is_empty() || foreign_head || foreign_tail {
            return Err(BookError::OrderNotQueued(key));
        }
        self.unlink(key, orders);
        Ok(())
    }

    fn unlink(&mut self, key: OrderKey, orders: &mut Slab<OrderNode>) {
        let (prev, next) = match orders.get_mut(key) {
            Some(node) => (node.prev.take(), node.next.take()),
            None => return,
        };

        match prev.and_then(|p| orders.get_mut(p)) {
            Some(prev_node) => prev_node.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| orders.get_mut(n)) {
            Some(next_node) => next_node.prev = prev,
            None => self.tail = prev,
        }

        self.len -= 1;
    }

    /// Iterate order keys from head to tail
    pub fn iter<'a>(&self, orders: &'a Slab<OrderNode>) -> QueueIter<'a> {
        QueueIter {
            orders,
            cursor: self.head,
        }
    }
}

/// Head-to-tail iterator over the keys of an [`OrderQueue`].
#[derive(Debug, Clone)]
pub struct QueueIter<'a> {
    orders: &'a Slab<OrderNode>,
    cursor: Option<OrderKey>,
}

impl<'a> Iterator for QueueIter<'a> {
    type Item = OrderKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor?;
        self.cursor = self.orders.get(key).and_then(|node| node.next);
        Some(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

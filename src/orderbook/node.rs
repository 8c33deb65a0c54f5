//! Order node for slab-based storage.
//!
//! ## Design
//!
//! `OrderNode` wraps a caller's [`Order`] with the links of its level's
//! FIFO queue and a back-reference to the level itself. All three are slab
//! keys, not references:
//!
//! - `next`: the order queued after this one (newer)
//! - `prev`: the order queued before this one (older)
//! - `level`: the owning [`PriceLevel`](crate::orderbook::PriceLevel)
//!
//! ## Level References
//!
//! A [`LevelRef`] pairs the level's slab key with the generation the level
//! held when the order joined it. Levels take a new generation when they are
//! created and whenever they are cleared, and level slots are reused, so a
//! ref whose generation no longer matches belongs to an order that was
//! dropped from its queue wholesale.

use crate::types::Order;

/// Slab key of an order; the caller's handle after
/// [`Orderbook::add`](crate::orderbook::Orderbook::add)
pub type OrderKey = usize;

/// Back-reference from an order to the level holding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelRef {
    /// Slab key of the level
    pub key: usize,
    /// Generation of the level at enqueue time
    pub generation: u64,
}

/// Order node stored in the slab.
#[derive(Debug, Clone)]
pub struct OrderNode {
    /// The caller's order
    pub order: Order,

    /// Next order in the level queue. `None` at the tail.
    pub next: Option<usize>,

    /// Previous order in the level queue. `None` at the head.
    pub prev: Option<usize>,

    /// Owning level, set while the order is queued
    pub level: Option<LevelRef>,
}

impl OrderNode {
    /// Create a new order node (not yet queued)
    ///
    /// # Example
    ///
    /// ```
    /// use hft_orderbook::orderbook::OrderNode;
    /// use hft_orderbook::types::Order;
    ///
    /// let node = OrderNode::new(Order::bid(1, 0.5));
    ///
    /// assert!(node.is_unlinked());
    /// assert!(node.level.is_none());
    /// ```
    #[inline]
    pub fn new(order: Order) -> Self {
        Self {
            order,
            next: None,
            prev: None,
            level: None,
        }
    }

    /// Check if this node has no queue neighbours
    #[inline]
    pub fn is_unlinked(&self) -> bool {
        self.next.is_none() && self.prev.is_none()
    }

    #[inline]
    pub fn order_id(&self) -> u64 {
        self.order.id
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.order.volume
    }

    /// Check if the node was queued by the level behind `level`
    #[inline]
    pub fn belongs_to(&self, level: LevelRef) -> bool {
        self.level == Some(level)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_node_new() {
        let order = Order::ask(42, 1.25);
        let node = OrderNode::new(order);

        assert_eq!(node.order, order);
        assert_eq!(node.order_id(), 42);
        assert_eq!(node.volume(), 1.25);
        assert!(node.is_unlinked());
        assert!(node.level.is_none());
    }

    #[test]
    fn test_order_node_linking() {
        let mut node = OrderNode::new(Order::bid(1, 1.0));

        node.next = Some(2);
        assert!(!node.is_unlinked());

        node.prev = Some(0);
        node.next = None;
        assert!(!node.is_unlinked());
    }

    #[test]
    fn test_belongs_to_checks_generation() {
        let mut node = OrderNode::new(Order::bid(1, 1.0));
        let current = LevelRef { key: 3, generation: 7 };
        let stale = LevelRef { key: 3, generation: 6 };

        assert!(!node.belongs_to(current));
        node.level = Some(current);
        assert!(node.belongs_to(current));
        assert!(!node.belongs_to(stale));
    }
}

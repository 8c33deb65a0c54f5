//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` owns one [`OrderQueue`] and keeps the level's total volume
//! up to date on every enqueue, dequeue and delete, using the moving order's
//! own volume so the bookkeeping stays O(1).
//!
//! Each level knows its own slab key and carries a generation. Queued orders
//! record both in their [`LevelRef`]; [`PriceLevel::clear`] swaps in an
//! empty queue and a fresh generation, which detaches every previously
//! queued order without visiting it.

use slab::Slab;

use crate::error::BookError;
use crate::orderbook::node::{LevelRef, OrderKey, OrderNode};
use crate::orderbook::queue::{OrderQueue, QueueIter};
use crate::types::price::{self, Price};

/// All orders resting at one price on one side.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Price key of this level
    price: Price,

    /// Sum of the volumes of queued orders
    total_volume: f64,

    queue: OrderQueue,

    /// Slab key of this level
    key: usize,

    /// Bumped on creation and on every clear
    generation: u64,
}

impl PriceLevel {
    /// Create a new empty price level
    ///
    /// # Arguments
    ///
    /// * `price` - Fixed-point price of the level
    /// * `key` - Slab key the level is stored under
    /// * `generation` - Fresh generation for its back-references
    pub fn new(price: Price, key: usize, generation: u64) -> Self {
        Self {
            price,
            total_volume: 0.0,
            queue: OrderQueue::new(),
            key,
            generation,
        }
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    /// Price as `f64`
    #[inline]
    pub fn price_f64(&self) -> f64 {
        price::to_f64(self.price)
    }

    #[inline]
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }

    /// Number of queued orders
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Back-reference stamped on orders queued from now on
    #[inline]
    pub fn level_ref(&self) -> LevelRef {
        LevelRef {
            key: self.key,
            generation: self.generation,
        }
    }

    #[inline]
    pub fn queue(&self) -> &OrderQueue {
        &self.queue
    }

    /// Oldest queued order
    #[inline]
    pub fn peek_head(&self) -> Option<OrderKey> {
        self.queue.head()
    }

    /// Iterate queued order keys, oldest first
    pub fn iter<'a>(&self, orders: &'a Slab<OrderNode>) -> QueueIter<'a> {
        self.queue.iter(orders)
    }

    /// Append an order to the tail and stamp its back-reference
    pub fn enqueue(&mut self, key: OrderKey, orders: &mut Slab<OrderNode>) -> Result<(), BookError> {
        self.queue.enqueue(key, orders)?;
        let level = self.level_ref();
        if let Some(node) = orders.get_mut(key) {
            node.level = Some(level);
            self.total_volume += node.volume();
        }
        Ok(())
    }

    /// Remove the oldest order, or return `None` if the level is empty.
    ///
    /// The order stays in the slab with its back-reference cleared.
    pub fn dequeue(&mut self, orders: &mut Slab<OrderNode>) -> Option<OrderKey> {
        let key = self.queue.dequeue(orders)?;
        if let Some(node) = orders.get_mut(key) {
            node.level = None;
            self.total_volume -= node.volume();
        }
        Some(key)
    }

    /// Remove an arbitrary order.
    ///
    /// # Errors
    ///
    /// * `OrderNotFound` - `key` is not in the slab
    /// * `OrderNotInLevel` - the order is not queued at this level in its
    ///   current generation
    pub fn delete(&mut self, key: OrderKey, orders: &mut Slab<OrderNode>) -> Result<(), BookError> {
        let node = orders.get(key).ok_or(BookError::OrderNotFound(key))?;
        if !node.belongs_to(self.level_ref()) {
            return Err(BookError::OrderNotInLevel {
                order: key,
                price: self.price_f64(),
            });
        }
        let volume = node.volume();

        self.queue.delete(key, orders)?;
        if let Some(node) = orders.get_mut(key) {
            node.level = None;
        }
        self.total_volume -= volume;
        Ok(())
    }

    /// Drop every queued order in O(1) and hand back the old queue.
    ///
    /// Orders are not visited: they stay linked to each other and keep a
    /// back-reference carrying the old generation, which no longer matches
    /// this level. The owner of the slab frees them through the returned
    /// queue.
    pub fn clear(&mut self, generation: u64) -> OrderQueue {
        self.total_volume = 0.0;
        self.generation = generation;
        std::mem::take(&mut self.queue)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Order;

    fn price_key() -> Price {
        price::from_f64(50_000.0).unwrap()
    }

    fn create_test_node(slab: &mut Slab<OrderNode>, id: u64, volume: f64) -> usize {
        slab.insert(OrderNode::new(Order::bid(id, volume)))
    }

    #[test]
    fn test_price_level_new() {
        let level = PriceLevel::new(price_key(), 3, 1);

        assert_eq!(level.price(), price_key());
        assert_eq!(level.price_f64(), 50_000.0);
        assert_eq!(level.total_volume(), 0.0);
        assert_eq!(level.len(), 0);
        assert!(level.is_empty());
        assert_eq!(level.level_ref(), LevelRef { key: 3, generation: 1 });
    }

    #[test]
    fn test_price_level_enqueue_multiple() {
        let mut slab = Slab::with_capacity(10);
        let mut level = PriceLevel::new(price_key(), 0, 1);

        let key1 = create_test_node(&mut slab, 1, 1.0);
        let key2 = create_test_node(&mut slab, 2, 2.0);
        let key3 = create_test_node(&mut slab, 3, 3.0);
        for key in [key1, key2, key3] {
            level.enqueue(key, &mut slab).unwrap();
        }

        assert_eq!(level.len(), 3);
        assert_eq!(level.total_volume(), 6.0);
        assert_eq!(level.peek_head(), Some(key1));
        assert_eq!(level.iter(&slab).collect::<Vec<_>>(), vec![key1, key2, key3]);
        assert!(slab[key2].belongs_to(level.level_ref()));
    }

    #[test]
    fn test_price_level_volume_sums_with_tolerance() {
        let mut slab = Slab::new();
        let mut level = PriceLevel::new(price_key(), 0, 1);

        for (id, volume) in [(1, 0.1), (2, 0.2)] {
            let key = create_test_node(&mut slab, id, volume);
            level.enqueue(key, &mut slab).unwrap();
        }
        assert!((level.total_volume() - 0.3).abs() < 1e-7);
    }

    #[test]
    fn test_price_level_dequeue() {
        let mut slab = Slab::new();
        let mut level = PriceLevel::new(price_key(), 0, 1);

        let key1 = create_test_node(&mut slab, 1, 1.5);
        let key2 = create_test_node(&mut slab, 2, 2.5);
        level.enqueue(key1, &mut slab).unwrap();
        level.enqueue(key2, &mut slab).unwrap();

        assert_eq!(level.dequeue(&mut slab), Some(key1));
        assert_eq!(level.total_volume(), 2.5);
        assert!(slab[key1].level.is_none());

        assert_eq!(level.dequeue(&mut slab), Some(key2));
        assert_eq!(level.total_volume(), 0.0);
        assert_eq!(level.dequeue(&mut slab), None);
    }

    #[test]
    fn test_price_level_delete() {
        let mut slab = Slab::new();
        let mut level = PriceLevel::new(price_key(), 0, 1);

        let keys: Vec<usize> = (1..=3)
            .map(|id| create_test_node(&mut slab, id, id as f64))
            .collect();
        for &key in &keys {
            level.enqueue(key, &mut slab).unwrap();
        }

        level.delete(keys[1], &mut slab).unwrap();
        assert_eq!(level.len(), 2);
        assert_eq!(level.total_volume(), 4.0);
        assert!(slab[keys[1]].level.is_none());
        assert_eq!(level.iter(&slab).collect::<Vec<_>>(), vec![keys[0], keys[2]]);
    }

    #[test]
    fn test_price_level_delete_foreign_order() {
        let mut slab = Slab::new();
        let mut level = PriceLevel::new(price_key(), 0, 1);
        let mut other = PriceLevel::new(price_key() + 1, 1, 2);

        let mine = create_test_node(&mut slab, 1, 1.0);
        let theirs = create_test_node(&mut slab, 2, 1.0);
        level.enqueue(mine, &mut slab).unwrap();
        other.enqueue(theirs, &mut slab).unwrap();

        assert_eq!(
            level.delete(theirs, &mut slab),
            Err(BookError::OrderNotInLevel {
                order: theirs,
                price: 50_000.0
            })
        );
        assert_eq!(level.delete(99, &mut slab), Err(BookError::OrderNotFound(99)));

        // nothing moved
        assert_eq!(level.len(), 1);
        assert_eq!(other.len(), 1);
        assert_eq!(level.total_volume(), 1.0);
    }

    #[test]
    fn test_price_level_clear_detaches_orders() {
        let mut slab = Slab::new();
        let mut level = PriceLevel::new(price_key(), 0, 1);

        let old = create_test_node(&mut slab, 1, 1.0);
        level.enqueue(old, &mut slab).unwrap();

        let dropped = level.clear(5);
        assert_eq!(dropped.iter(&slab).collect::<Vec<_>>(), vec![old]);
        assert!(level.is_empty());
        assert_eq!(level.total_volume(), 0.0);
        assert_eq!(level.generation(), 5);

        // the stale order can no longer be deleted through the level
        assert!(matches!(
            level.delete(old, &mut slab),
            Err(BookError::OrderNotInLevel { .. })
        ));

        let new = create_test_node(&mut slab, 2, 2.0);
        level.enqueue(new, &mut slab).unwrap();
        assert_eq!(level.iter(&slab).collect::<Vec<_>>(), vec![new]);
        assert_eq!(level.total_volume(), 2.0);
    }
}

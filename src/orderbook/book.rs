//! Limit order book facade.
//!
//! ## Architecture
//!
//! - **Order slab**: every order lives in one `Slab<OrderNode>`; its key is
//!   the caller's handle
//! - **Level slab**: price levels live in a `Slab<PriceLevel>` whose freed
//!   slots are reused, so opening a level rarely allocates
//! - **Ordered indexes**: one [`OrderedIndex`] per side maps price to level
//!   key and answers best-price queries in O(1)
//! - **Hash caches**: one `HashMap` per side maps price to level key so that
//!   adding to an existing level skips the tree entirely
//!
//! The cache and the index of a side always hold the same set of prices.
//!
//! ## Dropped Orders
//!
//! `delete_*_limit` frees the level's orders on the spot. `clear_*_limit`
//! stays O(1) by handing the old queue to a reclaim list instead; every
//! `add` and `cancel` frees up to `reclaim_batch` of those orders, and
//! [`Orderbook::reclaim`] frees the rest at once. Keys of dropped orders are
//! dead from the moment of the clear or delete.
//!
//! ## Price Ordering
//!
//! Both indexes are ascending. The best bid is the bid index maximum, the
//! best offer is the ask index minimum.
//!
//! ## Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | add (existing level) | O(1) |
//! | add (new level) | O(log M) |
//! | cancel | O(1), O(log M) when the level empties |
//! | clear_*_limit | O(1) |
//! | delete_*_limit | O(log M + k) for k dropped orders |
//! | volume_at_*_limit | O(1) |
//! | best_bid / best_offer | O(1) |
//!
//! ## Concurrency
//!
//! Single-writer. Callers that share a book across threads must serialize
//! mutations themselves.

use std::collections::{HashMap, VecDeque};

use slab::Slab;
use tracing::{debug, trace, warn};

use crate::error::BookError;
use crate::index::{Balance, OrderedIndex, RedBlack};
use crate::orderbook::config::OrderbookConfig;
use crate::orderbook::level::PriceLevel;
use crate::orderbook::node::{LevelRef, OrderKey, OrderNode};
use crate::types::price::{self, Price};
use crate::types::{Order, Side};

/// Price index of one side: price key to level slab key
pub type LevelIndex<B> = OrderedIndex<Price, usize, B>;

/// Two-sided limit order book.
///
/// ## Example
///
/// ```
/// use hft_orderbook::orderbook::Orderbook;
/// use hft_orderbook::types::Order;
///
/// let mut book = Orderbook::new();
/// let first = book.add(1.0, Order::bid(1, 0.5)).unwrap();
/// let second = book.add(2.0, Order::bid(2, 0.5)).unwrap();
/// book.add(3.0, Order::ask(3, 1.0)).unwrap();
///
/// assert_eq!(book.best_bid(), Ok(2.0));
/// assert_eq!(book.best_offer(), Ok(3.0));
///
/// book.cancel(second).unwrap();
/// assert_eq!(book.best_bid(), Ok(1.0));
/// assert_eq!(book.volume_at_bid_limit(1.0), 0.5);
/// assert!(book.is_resting(first));
/// ```
#[derive(Debug, Clone)]
pub struct Orderbook<B = RedBlack> {
    /// Order storage
    orders: Slab<OrderNode>,

    /// Price level pool shared by both sides
    levels: Slab<PriceLevel>,

    bids: LevelIndex<B>,
    asks: LevelIndex<B>,

    bid_cache: HashMap<Price, usize>,
    ask_cache: HashMap<Price, usize>,

    /// Last generation handed to a level
    generation: u64,

    /// Heads of queues dropped by a clear, still linked through their nodes
    dropped: VecDeque<OrderKey>,

    /// Orders on the dropped queues
    unreclaimed: usize,

    config: OrderbookConfig,
}

impl Orderbook {
    /// Create an empty red-black book with default sizing
    pub fn new() -> Self {
        Self::with_config(OrderbookConfig::default())
    }

    /// Create an empty red-black book with room for `order_capacity` orders
    ///
    /// # Example
    ///
    /// ```
    /// use hft_orderbook::orderbook::Orderbook;
    ///
    /// let book = Orderbook::with_capacity(100_000);
    /// assert!(book.capacity() >= 100_000);
    /// ```
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self::with_config(OrderbookConfig::default().with_order_capacity(order_capacity))
    }
}

impl<B: Balance> Default for Orderbook<B> {
    fn default() -> Self {
        Self::with_config(OrderbookConfig::default())
    }
}

impl<B: Balance> Orderbook<B> {
    /// Create an empty book sized by `config`
    pub fn with_config(config: OrderbookConfig) -> Self {
        let levels = config.max_levels_per_side;
        Self {
            orders: Slab::with_capacity(config.order_capacity),
            levels: Slab::with_capacity(levels.saturating_mul(2)),
            bids: OrderedIndex::with_capacity(levels),
            asks: OrderedIndex::with_capacity(levels),
            bid_cache: HashMap::with_capacity(levels),
            ask_cache: HashMap::with_capacity(levels),
            generation: 0,
            dropped: VecDeque::new(),
            unreclaimed: 0,
            config,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn config(&self) -> &OrderbookConfig {
        &self.config
    }

    /// Pre-allocated order slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Orders held in the slab, including cleared ones not yet reclaimed
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Cleared orders still waiting to be freed
    #[inline]
    pub fn dropped_count(&self) -> usize {
        self.unreclaimed
    }

    /// Number of bid price levels
    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels
    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Queue `order` at `price` on its side.
    ///
    /// Opens the price level on first use; otherwise the level is found
    /// through the hash cache without touching the index.
    ///
    /// # Returns
    ///
    /// The order's slab key, used to cancel it later
    ///
    /// # Errors
    ///
    /// `InvalidPrice` or `InvalidVolume`, before anything is mutated
    pub fn add(&mut self, price: f64, order: Order) -> Result<OrderKey, BookError> {
        let fixed = price::from_f64(price).ok_or(BookError::InvalidPrice(price))?;
        if !order.volume.is_finite() || order.volume < 0.0 {
            return Err(BookError::InvalidVolume(order.volume));
        }
        self.reclaim_dropped(self.config.reclaim_batch);

        let side = order.side;
        let cached = self.cache(side).get(&fixed).copied();
        let level_key = match cached {
            Some(key) => key,
            None => self.open_level(side, fixed),
        };

        let key = self.orders.insert(OrderNode::new(order));
        let level = self
            .levels
            .get_mut(level_key)
            .ok_or(BookError::NoSuchLevel { side, price })?;
        level.enqueue(key, &mut self.orders)?;

        trace!(
            "Order book: added order {} (key {}) {} {} @ {}",
            order.id,
            key,
            side,
            order.volume,
            price::to_f64(fixed)
        );
        Ok(key)
    }

    /// Remove a resting order and return it.
    ///
    /// The order's level is removed from the index and the cache when this
    /// was its last order.
    ///
    /// # Errors
    ///
    /// * `OrderNotFound` - no order under `key`
    /// * `OrderNotResting` - the order was dropped by a clear of its level
    ///   and is waiting to be reclaimed
    pub fn cancel(&mut self, key: OrderKey) -> Result<Order, BookError> {
        let node = self.orders.get(key).ok_or(BookError::OrderNotFound(key))?;
        let side = node.order.side;
        let level_ref = node
            .level
            .filter(|level| self.is_live(*level))
            .ok_or(BookError::OrderNotResting(key))?;

        let level = self
            .levels
            .get_mut(level_ref.key)
            .ok_or(BookError::OrderNotResting(key))?;
        level.delete(key, &mut self.orders)?;
        let (emptied, fixed) = (level.is_empty(), level.price());

        if emptied {
            self.close_level(side, fixed)?;
        }

        let order = self.orders.remove(key).order;
        self.reclaim_dropped(self.config.reclaim_batch);
        trace!(
            "Order book: cancelled order {} (key {}) {} @ {}",
            order.id,
            key,
            side,
            price::to_f64(fixed)
        );
        Ok(order)
    }

    /// Look up a resting order
    pub fn order(&self, key: OrderKey) -> Option<&Order> {
        self.orders
            .get(key)
            .filter(|node| node.level.map_or(false, |level| self.is_live(level)))
            .map(|node| &node.order)
    }

    /// Check if the order under `key` is queued in a live level
    pub fn is_resting(&self, key: OrderKey) -> bool {
        self.orders
            .get(key)
            .and_then(|node| node.level)
            .map_or(false, |level| self.is_live(level))
    }

    // ========================================================================
    // Level Management
    // ========================================================================

    /// Drop every order at a bid price in O(1), keeping the empty level.
    ///
    /// # Errors
    ///
    /// `NoSuchLevel` if no bid level rests at `price`
    pub fn clear_bid_limit(&mut self, price: f64) -> Result<(), BookError> {
        self.clear_limit(Side::Bid, price)
    }

    /// Drop every order at an ask price in O(1), keeping the empty level.
    pub fn clear_ask_limit(&mut self, price: f64) -> Result<(), BookError> {
        self.clear_limit(Side::Ask, price)
    }

    /// Remove a bid level and free its orders.
    ///
    /// # Returns
    ///
    /// `false` when no level rests at `price`, which is not an error
    pub fn delete_bid_limit(&mut self, price: f64) -> bool {
        self.delete_limit(Side::Bid, price)
    }

    /// Remove an ask level and free its orders; `false` when absent
    pub fn delete_ask_limit(&mut self, price: f64) -> bool {
        self.delete_limit(Side::Ask, price)
    }

    fn clear_limit(&mut self, side: Side, price: f64) -> Result<(), BookError> {
        let fixed = price::from_f64(price).ok_or(BookError::InvalidPrice(price))?;
        let key = self
            .cache(side)
            .get(&fixed)
            .copied()
            .ok_or(BookError::NoSuchLevel { side, price })?;

        let generation = self.next_generation();
        let level = self
            .levels
            .get_mut(key)
            .ok_or(BookError::NoSuchLevel { side, price })?;
        let queue = level.clear(generation);
        if let Some(head) = queue.head() {
            self.dropped.push_back(head);
            self.unreclaimed += queue.len();
        }

        debug!(
            "Order book: cleared {} level {} ({} orders dropped)",
            side,
            price,
            queue.len()
        );
        Ok(())
    }

    fn delete_limit(&mut self, side: Side, price: f64) -> bool {
        let Some(fixed) = price::from_f64(price) else {
            return false;
        };
        if !self.cache(side).contains_key(&fixed) {
            return false;
        }
        match self.close_level(side, fixed) {
            Ok(level) => {
                self.free_queue(level.queue().head(), usize::MAX);
                true
            }
            Err(err) => {
                warn!("Order book: cached {} level {} could not be closed: {}", side, price, err);
                false
            }
        }
    }

    fn open_level(&mut self, side: Side, fixed: Price) -> usize {
        let generation = self.next_generation();
        let entry = self.levels.vacant_entry();
        let key = entry.key();
        entry.insert(PriceLevel::new(fixed, key, generation));

        let (index, cache) = self.side_mut(side);
        index.put(fixed, key);
        cache.insert(fixed, key);

        debug!("Order book: opened {} level {}", side, price::to_f64(fixed));
        key
    }

    /// Remove a level from the index, the cache and the level pool.
    fn close_level(&mut self, side: Side, fixed: Price) -> Result<PriceLevel, BookError> {
        let missing = BookError::NoSuchLevel {
            side,
            price: price::to_f64(fixed),
        };

        let key = self.cache(side).get(&fixed).copied().ok_or_else(|| missing.clone())?;
        if !self.levels.contains(key) || !self.index(side).contains(fixed) {
            return Err(missing);
        }

        let (index, cache) = self.side_mut(side);
        index.delete(fixed)?;
        cache.remove(&fixed);
        let level = self.levels.try_remove(key).ok_or(missing)?;

        debug!(
            "Order book: closed {} level {} ({} orders left)",
            side,
            price::to_f64(fixed),
            level.len()
        );
        Ok(level)
    }

    /// Free every order dropped by a clear that has not been reclaimed yet.
    ///
    /// # Returns
    ///
    /// The number of orders freed
    pub fn reclaim(&mut self) -> usize {
        self.reclaim_dropped(usize::MAX)
    }

    fn reclaim_dropped(&mut self, mut budget: usize) -> usize {
        let mut total = 0;
        while budget > 0 {
            let Some(head) = self.dropped.pop_front() else {
                break;
            };
            let (freed, rest) = self.free_queue(Some(head), budget);
            if let Some(rest) = rest {
                self.dropped.push_front(rest);
            }
            budget = budget.saturating_sub(freed.max(1));
            total += freed;
        }
        self.unreclaimed = self.unreclaimed.saturating_sub(total);
        total
    }

    /// Free up to `budget` orders along a queue's `next` links.
    ///
    /// Returns the number freed and the key the queue continues at.
    fn free_queue(&mut self, mut cursor: Option<OrderKey>, budget: usize) -> (usize, Option<OrderKey>) {
        let mut freed = 0;
        while freed < budget {
            let Some(key) = cursor else {
                break;
            };
            cursor = self.orders.try_remove(key).and_then(|node| node.next);
            freed += 1;
        }
        (freed, cursor)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Total volume at a bid price; 0.0 when no level rests there
    pub fn volume_at_bid_limit(&self, price: f64) -> f64 {
        self.bid_level(price).map_or(0.0, PriceLevel::total_volume)
    }

    /// Total volume at an ask price; 0.0 when no level rests there
    pub fn volume_at_ask_limit(&self, price: f64) -> f64 {
        self.ask_level(price).map_or(0.0, PriceLevel::total_volume)
    }

    /// Number of orders queued at a bid price
    pub fn orders_at_bid_limit(&self, price: f64) -> usize {
        self.bid_level(price).map_or(0, PriceLevel::len)
    }

    /// Number of orders queued at an ask price
    pub fn orders_at_ask_limit(&self, price: f64) -> usize {
        self.ask_level(price).map_or(0, PriceLevel::len)
    }

    pub fn bid_level(&self, price: f64) -> Option<&PriceLevel> {
        self.level_at(Side::Bid, price)
    }

    pub fn ask_level(&self, price: f64) -> Option<&PriceLevel> {
        self.level_at(Side::Ask, price)
    }

    /// Level by slab key, as stored in the indexes
    #[inline]
    pub fn level(&self, key: usize) -> Option<&PriceLevel> {
        self.levels.get(key)
    }

    /// Highest bid price
    ///
    /// # Errors
    ///
    /// `EmptySide(Bid)` if no bid level rests
    #[inline]
    pub fn best_bid(&self) -> Result<f64, BookError> {
        self.bids
            .max()
            .map(price::to_f64)
            .map_err(|_| BookError::EmptySide(Side::Bid))
    }

    /// Lowest ask price
    ///
    /// # Errors
    ///
    /// `EmptySide(Ask)` if no ask level rests
    #[inline]
    pub fn best_offer(&self) -> Result<f64, BookError> {
        self.asks
            .min()
            .map(price::to_f64)
            .map_err(|_| BookError::EmptySide(Side::Ask))
    }

    /// Up to `n` `(price, volume)` bid levels, best first
    pub fn bid_depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.depth(self.bids.iter().rev(), n)
    }

    /// Up to `n` `(price, volume)` ask levels, best first
    pub fn ask_depth(&self, n: usize) -> Vec<(f64, f64)> {
        self.depth(self.asks.iter(), n)
    }

    fn depth<'a>(&self, levels: impl Iterator<Item = (&'a Price, &'a usize)>, n: usize) -> Vec<(f64, f64)> {
        levels
            .take(n)
            .filter_map(|(_, key)| self.levels.get(*key))
            .map(|level| (level.price_f64(), level.total_volume()))
            .collect()
    }

    /// Bid index, for floor/ceiling/rank queries over resting prices
    #[inline]
    pub fn bids(&self) -> &LevelIndex<B> {
        &self.bids
    }

    /// Ask index, for floor/ceiling/rank queries over resting prices
    #[inline]
    pub fn asks(&self) -> &LevelIndex<B> {
        &self.asks
    }

    // ========================================================================
    // Integrity
    // ========================================================================

    /// Audit the whole book in O(M + N).
    ///
    /// Checks that cache and index hold the same levels on each side, that
    /// the indexes are balanced, that every level's count and volume match
    /// its queue, and that every stored order is either queued or waiting
    /// to be reclaimed.
    pub fn is_consistent(&self) -> bool {
        let queued: usize = self.levels.iter().map(|(_, level)| level.len()).sum();
        self.levels.len() == self.bids.len() + self.asks.len()
            && queued + self.unreclaimed == self.orders.len()
            && self.side_is_consistent(Side::Bid)
            && self.side_is_consistent(Side::Ask)
    }

    fn side_is_consistent(&self, side: Side) -> bool {
        let (index, cache) = (self.index(side), self.cache(side));
        if index.len() != cache.len() || !index.is_balanced() {
            return false;
        }

        index.iter().all(|(&fixed, &key)| {
            cache.get(&fixed) == Some(&key)
                && self.levels.get(key).map_or(false, |level| {
                    level.price() == fixed
                        && level.level_ref().key == key
                        && self.level_is_consistent(level, side)
                })
        })
    }

    fn level_is_consistent(&self, level: &PriceLevel, side: Side) -> bool {
        let mut count = 0;
        let mut volume = 0.0;
        for key in level.iter(&self.orders) {
            let Some(node) = self.orders.get(key) else {
                return false;
            };
            count += 1;
            if count > level.len() || node.order.side != side || !node.belongs_to(level.level_ref()) {
                return false;
            }
            volume += node.volume();
        }
        count == level.len() && (volume - level.total_volume()).abs() <= 1e-7 * volume.max(1.0)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn level_at(&self, side: Side, price: f64) -> Option<&PriceLevel> {
        let fixed = price::from_f64(price)?;
        let key = self.cache(side).get(&fixed)?;
        self.levels.get(*key)
    }

    /// A level ref is live while its level exists in its generation
    fn is_live(&self, level: LevelRef) -> bool {
        self.levels
            .get(level.key)
            .map_or(false, |l| l.generation() == level.generation)
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    #[inline]
    fn cache(&self, side: Side) -> &HashMap<Price, usize> {
        match side {
            Side::Bid => &self.bid_cache,
            Side::Ask => &self.ask_cache,
        }
    }

    #[inline]
    fn index(&self, side: Side) -> &LevelIndex<B> {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> (&mut LevelIndex<B>, &mut HashMap<Price, usize>) {
        match side {
            Side::Bid => (&mut self.bids, &mut self.bid_cache),
            Side::Ask => (&mut self.asks, &mut self.ask_cache),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

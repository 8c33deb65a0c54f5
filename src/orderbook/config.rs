//! Sizing hints for an [`Orderbook`](crate::orderbook::Orderbook).
//!
//! Neither size is a hard limit. They pre-size the order slab, the level
//! slab, both price indexes and both hash caches so the hot path does not
//! reallocate. The reclaim batch bounds how many cleared orders each add or
//! cancel frees.

/// Expected maximum number of price levels per side
pub const MAX_LEVELS_PER_SIDE: usize = 10_000;

/// Default number of pre-allocated order slots
pub const DEFAULT_ORDER_CAPACITY: usize = 100_000;

/// Default number of cleared orders freed per add or cancel
pub const DEFAULT_RECLAIM_BATCH: usize = 16;

/// Order book sizing configuration.
///
/// ## Example
///
/// ```
/// use hft_orderbook::orderbook::OrderbookConfig;
///
/// let config = OrderbookConfig::default()
///     .with_max_levels_per_side(500)
///     .with_order_capacity(4_096);
///
/// assert_eq!(config.max_levels_per_side, 500);
/// assert_eq!(config.order_capacity, 4_096);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderbookConfig {
    /// Capacity hint for levels on each side
    pub max_levels_per_side: usize,

    /// Capacity hint for resting orders across both sides
    pub order_capacity: usize,

    /// Cleared orders freed per add or cancel; 0 leaves them to
    /// [`Orderbook::reclaim`](crate::orderbook::Orderbook::reclaim)
    pub reclaim_batch: usize,
}

impl Default for OrderbookConfig {
    fn default() -> Self {
        Self {
            max_levels_per_side: MAX_LEVELS_PER_SIDE,
            order_capacity: DEFAULT_ORDER_CAPACITY,
            reclaim_batch: DEFAULT_RECLAIM_BATCH,
        }
    }
}

impl OrderbookConfig {
    pub fn new(max_levels_per_side: usize, order_capacity: usize) -> Self {
        Self {
            max_levels_per_side,
            order_capacity,
            reclaim_batch: DEFAULT_RECLAIM_BATCH,
        }
    }

    #[must_use]
    pub fn with_max_levels_per_side(mut self, levels: usize) -> Self {
        self.max_levels_per_side = levels;
        self
    }

    #[must_use]
    pub fn with_order_capacity(mut self, orders: usize) -> Self {
        self.order_capacity = orders;
        self
    }

    #[must_use]
    pub fn with_reclaim_batch(mut self, batch: usize) -> Self {
        self.reclaim_batch = batch;
        self
    }
}

//! Ordered price index.
//!
//! ## Design
//!
//! `OrderedIndex` is a binary search tree whose nodes live in a slab arena
//! and refer to each other by slab key. Besides the `left`/`right` children
//! every node carries `next`/`prev` keys that thread all nodes into a
//! doubly-linked list in ascending key order:
//!
//! ```text
//!            [5]                 tree links (ownership)
//!           /   \
//!         [2]   [8]
//!
//!   min -> [2] <-> [5] <-> [8] <- max     list links (key order)
//! ```
//!
//! The list is spliced at the insertion point while descending and unlinked
//! when a node is detached, so min/max and successor/predecessor steps are
//! O(1) and never depend on the tree's shape. Rotations move tree links
//! only; they never touch the list.
//!
//! Balancing is delegated to a [`Balance`] strategy: [`RedBlack`] (the
//! default, 2·lg M worst-case height) or [`Unbalanced`](crate::index::Unbalanced)
//! (plain BST, O(M) height on sorted input).
//!
//! ## Complexity
//!
//! | Operation | Red-black | Plain BST |
//! |-----------|-----------|-----------|
//! | put / delete / get | O(log M) | O(M) worst |
//! | min / max | O(1) | O(1) |
//! | floor / ceiling / select / rank | O(log M) | O(M) worst |
//! | keys(lo, hi) | O(log M + R) | O(M + R) worst |
//! | successor step (iterator) | O(1) | O(1) |

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::mem;

use slab::Slab;

use crate::error::IndexError;
use crate::index::balance::{Balance, RedBlack};

/// Slab key of a tree node; `None` is the empty link.
type Link = Option<usize>;

#[derive(Debug, Clone)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    /// Successor in key order
    pub(crate) next: Link,
    /// Predecessor in key order
    pub(crate) prev: Link,
    /// Number of nodes in the subtree rooted here
    pub(crate) size: usize,
    pub(crate) red: bool,
}

/// Node storage shared by [`OrderedIndex`] and its [`Balance`] strategy.
///
/// All structural primitives (rotations, color flips, size bookkeeping)
/// live here so that a strategy only decides *when* to apply them.
#[derive(Debug, Clone)]
pub struct Arena<K, V> {
    nodes: Slab<Node<K, V>>,
}

impl<K, V> Arena<K, V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
        }
    }

    /// New nodes are red: they join their parent's 2- or 3-node.
    fn insert(&mut self, key: K, value: V) -> usize {
        self.nodes.insert(Node {
            key,
            value,
            left: None,
            right: None,
            next: None,
            prev: None,
            size: 1,
            red: true,
        })
    }

    fn remove(&mut self, h: usize) -> Node<K, V> {
        self.nodes.remove(h)
    }

    #[inline]
    pub(crate) fn node(&self, h: usize) -> &Node<K, V> {
        &self.nodes[h]
    }

    #[inline]
    pub(crate) fn is_red(&self, link: Link) -> bool {
        link.map_or(false, |h| self.nodes[h].red)
    }

    #[inline]
    pub(crate) fn size(&self, link: Link) -> usize {
        link.map_or(0, |h| self.nodes[h].size)
    }

    #[inline]
    pub(crate) fn left(&self, h: usize) -> Link {
        self.nodes[h].left
    }

    #[inline]
    pub(crate) fn right(&self, h: usize) -> Link {
        self.nodes[h].right
    }

    /// Left child of the left child, if any
    #[inline]
    pub(crate) fn left_left(&self, h: usize) -> Link {
        self.nodes[h].left.and_then(|l| self.nodes[l].left)
    }

    /// Left child of the right child, if any
    #[inline]
    pub(crate) fn right_left(&self, h: usize) -> Link {
        self.nodes[h].right.and_then(|r| self.nodes[r].left)
    }

    #[inline]
    fn set_left(&mut self, h: usize, link: Link) {
        self.nodes[h].left = link;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, h: usize, link: Link) {
        self.nodes[h].right = link;
    }

    #[inline]
    pub(crate) fn set_red(&mut self, h: usize, red: bool) {
        self.nodes[h].red = red;
    }

    /// Recompute `size` of `h` from its children.
    #[inline]
    pub(crate) fn resize(&mut self, h: usize) {
        let size = 1 + self.size(self.nodes[h].left) + self.size(self.nodes[h].right);
        self.nodes[h].size = size;
    }

    /// Make a right-leaning link lean left. Returns the new subtree root;
    /// a node without a right child is returned unchanged.
    pub(crate) fn rotate_left(&mut self, h: usize) -> usize {
        let Some(x) = self.nodes[h].right else {
            return h;
        };
        self.nodes[h].right = self.nodes[x].left;
        self.nodes[x].left = Some(h);
        self.nodes[x].red = self.nodes[h].red;
        self.nodes[h].red = true;
        self.resize(h);
        self.resize(x);
        x
    }

    /// Make a left-leaning link lean right. Returns the new subtree root;
    /// a node without a left child is returned unchanged.
    pub(crate) fn rotate_right(&mut self, h: usize) -> usize {
        let Some(x) = self.nodes[h].left else {
            return h;
        };
        self.nodes[h].left = self.nodes[x].right;
        self.nodes[x].right = Some(h);
        self.nodes[x].red = self.nodes[h].red;
        self.nodes[h].red = true;
        self.resize(h);
        self.resize(x);
        x
    }

    /// Invert the colors of `h` and both of its children.
    pub(crate) fn flip_colors(&mut self, h: usize) {
        self.nodes[h].red = !self.nodes[h].red;
        if let Some(l) = self.nodes[h].left {
            self.nodes[l].red = !self.nodes[l].red;
        }
        if let Some(r) = self.nodes[h].right {
            self.nodes[r].red = !self.nodes[r].red;
        }
    }

    fn height(&self, link: Link) -> usize {
        match link {
            None => 0,
            Some(h) => 1 + self.height(self.nodes[h].left).max(self.height(self.nodes[h].right)),
        }
    }
}

/// Price-ordered map with O(1) min/max and an ordered list over its nodes.
///
/// ## Example
///
/// ```
/// use hft_orderbook::index::OrderedIndex;
///
/// let mut index: OrderedIndex<u64, &str> = OrderedIndex::new();
/// index.put(20, "b");
/// index.put(10, "a");
/// index.put(30, "c");
///
/// assert_eq!(index.min(), Ok(10));
/// assert_eq!(index.max(), Ok(30));
/// assert_eq!(index.floor(25), Ok(20));
/// assert_eq!(index.rank(30), Ok(2));
/// assert!(index.is_balanced());
///
/// let keys: Vec<u64> = index.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, vec![10, 20, 30]);
/// ```
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V, B = RedBlack> {
    arena: Arena<K, V>,
    root: Link,
    /// Cached extremes, maintained through the ordered list
    min: Link,
    max: Link,
    strategy: PhantomData<B>,
}

impl<K: Ord + Copy, V, B: Balance> Default for OrderedIndex<K, V, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy, V, B: Balance> OrderedIndex<K, V, B> {
    /// Create an empty index
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty index with room for `capacity` keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            root: None,
            min: None,
            max: None,
            strategy: PhantomData,
        }
    }

    // ========================================================================
    // Size and Lookup
    // ========================================================================

    /// Number of keys in the index
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.size(self.root)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    #[inline]
    pub fn contains(&self, key: K) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.find(key).map(|h| &self.arena.node(h).value)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut V> {
        let h = self.find(key)?;
        Some(&mut self.arena.nodes[h].value)
    }

    fn find(&self, key: K) -> Link {
        let mut link = self.root;
        while let Some(h) = link {
            let node = self.arena.node(h);
            link = match key.cmp(&node.key) {
                Ordering::Equal => return Some(h),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        None
    }

    /// Remove every key. Arena capacity is kept.
    pub fn clear(&mut self) {
        self.arena.nodes.clear();
        self.root = None;
        self.min = None;
        self.max = None;
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `key`, or replace its value if present.
    ///
    /// # Returns
    ///
    /// The previous value on a search hit, `None` when a node was created
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let mut replaced = None;
        let root = self.put_at(self.root, key, value, &mut replaced);
        B::seal_root(&mut self.arena, root);
        self.root = Some(root);
        replaced
    }

    fn put_at(&mut self, link: Link, key: K, value: V, replaced: &mut Option<V>) -> usize {
        let Some(h) = link else {
            let x = self.arena.insert(key, value);
            if self.min.map_or(true, |m| key < self.arena.node(m).key) {
                self.min = Some(x);
            }
            if self.max.map_or(true, |m| key > self.arena.node(m).key) {
                self.max = Some(x);
            }
            return x;
        };

        match key.cmp(&self.arena.node(h).key) {
            Ordering::Equal => {
                *replaced = Some(mem::replace(&mut self.arena.nodes[h].value, value));
                return h;
            }
            Ordering::Less => {
                let left = self.arena.left(h);
                let child = self.put_at(left, key, value, replaced);
                self.arena.set_left(h, Some(child));
                if left.is_none() {
                    // fresh leaf: h is its successor
                    self.link_before(h, child);
                }
            }
            Ordering::Greater => {
                let right = self.arena.right(h);
                let child = self.put_at(right, key, value, replaced);
                self.arena.set_right(h, Some(child));
                if right.is_none() {
                    // fresh leaf: h is its predecessor
                    self.link_after(h, child);
                }
            }
        }

        let h = B::balance(&mut self.arena, h);
        self.arena.resize(h);
        h
    }

    /// Splice `x` into the list right before `h`.
    fn link_before(&mut self, h: usize, x: usize) {
        let prev = self.arena.nodes[h].prev;
        if let Some(p) = prev {
            self.arena.nodes[p].next = Some(x);
        }
        self.arena.nodes[x].prev = prev;
        self.arena.nodes[x].next = Some(h);
        self.arena.nodes[h].prev = Some(x);
    }

    /// Splice `x` into the list right after `h`.
    fn link_after(&mut self, h: usize, x: usize) {
        let next = self.arena.nodes[h].next;
        if let Some(n) = next {
            self.arena.nodes[n].prev = Some(x);
        }
        self.arena.nodes[x].next = next;
        self.arena.nodes[x].prev = Some(h);
        self.arena.nodes[h].next = Some(x);
    }

    // ========================================================================
    // Delete
    // ========================================================================

    /// Remove `key` and return its value.
    ///
    /// Fails without touching the tree when the index is empty or the key
    /// is absent.
    pub fn delete(&mut self, key: K) -> Result<V, IndexError> {
        let Some(root) = self.root else {
            return Err(IndexError::Empty);
        };
        if self.find(key).is_none() {
            return Err(IndexError::KeyNotFound);
        }

        B::prepare_delete(&mut self.arena, root);
        let mut removed = None;
        self.root = self.delete_at(root, key, &mut removed);
        if let Some(root) = self.root {
            B::seal_root(&mut self.arena, root);
        }
        removed.ok_or(IndexError::KeyNotFound)
    }

    /// Remove the smallest key
    pub fn delete_min(&mut self) -> Result<(K, V), IndexError> {
        let key = self.min()?;
        let value = self.delete(key)?;
        Ok((key, value))
    }

    /// Remove the largest key
    pub fn delete_max(&mut self) -> Result<(K, V), IndexError> {
        let key = self.max()?;
        let value = self.delete(key)?;
        Ok((key, value))
    }

    // The key is known to be present below `h`.
    fn delete_at(&mut self, h: usize, key: K, removed: &mut Option<V>) -> Link {
        let mut h = h;
        if key < self.arena.node(h).key {
            h = B::push_red_left(&mut self.arena, h);
            if let Some(left) = self.arena.left(h) {
                let left = self.delete_at(left, key, removed);
                self.arena.set_left(h, left);
            }
        } else {
            h = B::lean_right(&mut self.arena, h);
            if key == self.arena.node(h).key && self.arena.right(h).is_none() {
                let left = self.arena.left(h);
                *removed = Some(self.detach(h).value);
                return left;
            }
            h = B::push_red_right(&mut self.arena, h);
            match (key == self.arena.node(h).key, self.arena.right(h)) {
                (true, Some(right)) => {
                    // take over the successor's entry, then drop its node
                    let (right, successor) = self.delete_min_at(right);
                    self.arena.set_right(h, right);
                    let node = &mut self.arena.nodes[h];
                    node.key = successor.key;
                    *removed = Some(mem::replace(&mut node.value, successor.value));
                }
                (false, Some(right)) => {
                    let right = self.delete_at(right, key, removed);
                    self.arena.set_right(h, right);
                }
                (_, None) => {}
            }
        }

        let h = B::balance(&mut self.arena, h);
        self.arena.resize(h);
        Some(h)
    }

    /// Remove the minimum of the subtree at `h`. Returns the new subtree
    /// root and the detached node.
    fn delete_min_at(&mut self, h: usize) -> (Link, Node<K, V>) {
        if self.arena.left(h).is_none() {
            let right = self.arena.right(h);
            return (right, self.detach(h));
        }

        let h = B::push_red_left(&mut self.arena, h);
        let Some(left) = self.arena.left(h) else {
            let right = self.arena.right(h);
            return (right, self.detach(h));
        };
        let (left, min) = self.delete_min_at(left);
        self.arena.set_left(h, left);

        let h = B::balance(&mut self.arena, h);
        self.arena.resize(h);
        (Some(h), min)
    }

    /// Unlink `h` from the ordered list, refresh the cached extremes and
    /// free its slot. Tree links must already bypass `h`.
    fn detach(&mut self, h: usize) -> Node<K, V> {
        let (prev, next) = (self.arena.nodes[h].prev, self.arena.nodes[h].next);
        if let Some(p) = prev {
            self.arena.nodes[p].next = next;
        }
        if let Some(n) = next {
            self.arena.nodes[n].prev = prev;
        }
        if self.min == Some(h) {
            self.min = next;
        }
        if self.max == Some(h) {
            self.max = prev;
        }
        self.arena.remove(h)
    }

    // ========================================================================
    // Ordered Queries
    // ========================================================================

    /// Smallest key, O(1)
    pub fn min(&self) -> Result<K, IndexError> {
        self.min
            .map(|h| self.arena.node(h).key)
            .ok_or(IndexError::Empty)
    }

    /// Largest key, O(1)
    pub fn max(&self) -> Result<K, IndexError> {
        self.max
            .map(|h| self.arena.node(h).key)
            .ok_or(IndexError::Empty)
    }

    pub fn min_value(&self) -> Result<&V, IndexError> {
        self.min
            .map(|h| &self.arena.node(h).value)
            .ok_or(IndexError::Empty)
    }

    pub fn max_value(&self) -> Result<&V, IndexError> {
        self.max
            .map(|h| &self.arena.node(h).value)
            .ok_or(IndexError::Empty)
    }

    /// Largest key less than or equal to `key`
    pub fn floor(&self, key: K) -> Result<K, IndexError> {
        if self.is_empty() {
            return Err(IndexError::Empty);
        }
        self.floor_node(key)
            .map(|h| self.arena.node(h).key)
            .ok_or(IndexError::NoFloor)
    }

    /// Smallest key greater than or equal to `key`
    pub fn ceiling(&self, key: K) -> Result<K, IndexError> {
        if self.is_empty() {
            return Err(IndexError::Empty);
        }
        self.ceiling_node(key)
            .map(|h| self.arena.node(h).key)
            .ok_or(IndexError::NoCeiling)
    }

    fn floor_node(&self, key: K) -> Link {
        let mut link = self.root;
        let mut best = None;
        while let Some(h) = link {
            let node = self.arena.node(h);
            link = match key.cmp(&node.key) {
                Ordering::Equal => return Some(h),
                Ordering::Less => node.left,
                Ordering::Greater => {
                    best = Some(h);
                    node.right
                }
            };
        }
        best
    }

    fn ceiling_node(&self, key: K) -> Link {
        let mut link = self.root;
        let mut best = None;
        while let Some(h) = link {
            let node = self.arena.node(h);
            link = match key.cmp(&node.key) {
                Ordering::Equal => return Some(h),
                Ordering::Greater => node.right,
                Ordering::Less => {
                    best = Some(h);
                    node.left
                }
            };
        }
        best
    }

    /// Key with exactly `rank` smaller keys in the index
    pub fn select(&self, rank: usize) -> Result<K, IndexError> {
        let len = self.len();
        if rank >= len {
            return Err(IndexError::RankOutOfRange { rank, len });
        }

        let mut link = self.root;
        let mut k = rank;
        while let Some(h) = link {
            let node = self.arena.node(h);
            let left_size = self.arena.size(node.left);
            link = match k.cmp(&left_size) {
                Ordering::Equal => return Ok(node.key),
                Ordering::Less => node.left,
                Ordering::Greater => {
                    k -= left_size + 1;
                    node.right
                }
            };
        }
        Err(IndexError::RankOutOfRange { rank, len })
    }

    /// Number of keys strictly less than `key`
    pub fn rank(&self, key: K) -> Result<usize, IndexError> {
        if self.is_empty() {
            return Err(IndexError::Empty);
        }

        let mut link = self.root;
        let mut rank = 0;
        while let Some(h) = link {
            let node = self.arena.node(h);
            link = match key.cmp(&node.key) {
                Ordering::Equal => return Ok(rank + self.arena.size(node.left)),
                Ordering::Less => node.left,
                Ordering::Greater => {
                    rank += self.arena.size(node.left) + 1;
                    node.right
                }
            };
        }
        Ok(rank)
    }

    /// All keys in `[lo, hi]`, ascending.
    ///
    /// Finds the ceiling of `lo` in O(log M), then walks the ordered list.
    /// Both bounds must lie within `[min, max]`.
    pub fn keys(&self, lo: K, hi: K) -> Result<Vec<K>, IndexError> {
        let (min, max) = (self.min()?, self.max()?);
        if lo < min || hi > max {
            return Err(IndexError::RangeOutOfBounds);
        }

        let mut keys = Vec::new();
        let mut link = self.ceiling_node(lo);
        while let Some(h) = link {
            let node = self.arena.node(h);
            if node.key > hi {
                break;
            }
            keys.push(node.key);
            link = node.next;
        }
        Ok(keys)
    }

    // ========================================================================
    // Shape
    // ========================================================================

    /// Number of nodes on the longest root-to-leaf path
    pub fn height(&self) -> usize {
        self.arena.height(self.root)
    }

    /// Check the balancing strategy's shape invariants.
    ///
    /// For [`RedBlack`]: black root, no right-leaning red link, no two red
    /// links in a row, equal black height on every path. Always `true` for
    /// the plain BST. O(M); meant for tests.
    pub fn is_balanced(&self) -> bool {
        B::is_balanced(&self.arena, self.root)
    }

    /// Iterate `(key, value)` pairs in ascending order by following the
    /// ordered list. Reverse iteration starts at the cached max.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            arena: &self.arena,
            front: self.min,
            back: self.max,
            remaining: self.len(),
        }
    }
}

impl<'a, K: Ord + Copy, V, B: Balance> IntoIterator for &'a OrderedIndex<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered-list iterator over an [`OrderedIndex`].
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    front: Link,
    back: Link,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.arena.node(self.front?);
        self.front = node.next;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.arena.node(self.back?);
        self.back = node.prev;
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Unbalanced;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    type RbIndex = OrderedIndex<u64, u64>;
    type BstIndex = OrderedIndex<u64, u64, Unbalanced>;

    fn in_order<K: Copy, V>(arena: &Arena<K, V>, link: Link, out: &mut Vec<K>) {
        if let Some(h) = link {
            in_order(arena, arena.node(h).left, out);
            out.push(arena.node(h).key);
            in_order(arena, arena.node(h).right, out);
        }
    }

    /// Returns the subtree size, asserting the cached counter at every node.
    fn checked_size<K, V>(arena: &Arena<K, V>, link: Link) -> usize {
        match link {
            None => 0,
            Some(h) => {
                let node = arena.node(h);
                let size = 1 + checked_size(arena, node.left) + checked_size(arena, node.right);
                assert_eq!(node.size, size, "stale subtree size");
                size
            }
        }
    }

    fn assert_invariants<B: Balance>(index: &OrderedIndex<u64, u64, B>) {
        let mut keys = Vec::new();
        in_order(&index.arena, index.root, &mut keys);

        // BST order and size bookkeeping
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys not strictly ascending");
        assert_eq!(checked_size(&index.arena, index.root), keys.len());
        assert_eq!(index.len(), keys.len());
        assert_eq!(index.arena.nodes.len(), keys.len(), "leaked arena slots");

        // cached extremes
        assert_eq!(index.min().ok(), keys.first().copied());
        assert_eq!(index.max().ok(), keys.last().copied());

        // ordered list, forwards from min and backwards from max
        let mut listed = Vec::new();
        let mut link = index.min;
        let mut last = None;
        while let Some(h) = link {
            listed.push(index.arena.node(h).key);
            last = Some(h);
            link = index.arena.node(h).next;
        }
        assert_eq!(listed, keys);
        assert_eq!(last, index.max);

        let backwards: Vec<u64> = index.iter().rev().map(|(k, _)| *k).collect();
        let mut expected = keys.clone();
        expected.reverse();
        assert_eq!(backwards, expected);

        assert!(index.is_balanced(), "balance invariants violated");
    }

    #[test]
    fn test_empty() {
        let index = RbIndex::new();
        assert_eq!(index.len(), 0);
        assert!(index.is_empty());
        assert_eq!(index.min(), Err(IndexError::Empty));
        assert_eq!(index.max(), Err(IndexError::Empty));
        assert_eq!(index.floor(1), Err(IndexError::Empty));
        assert_eq!(index.ceiling(1), Err(IndexError::Empty));
        assert_eq!(index.rank(1), Err(IndexError::Empty));
        assert_eq!(
            index.select(0),
            Err(IndexError::RankOutOfRange { rank: 0, len: 0 })
        );
        assert_eq!(index.keys(0, 1), Err(IndexError::Empty));
        assert_eq!(index.height(), 0);
        assert!(index.is_balanced());
        assert_eq!(index.iter().next(), None);
    }

    #[test]
    fn test_delete_on_empty_fails() {
        let mut index = RbIndex::new();
        assert_eq!(index.delete(1), Err(IndexError::Empty));
        assert_eq!(index.delete_min(), Err(IndexError::Empty));
        assert_eq!(index.delete_max(), Err(IndexError::Empty));
    }

    #[test]
    fn test_put_and_get() {
        let mut index = RbIndex::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let keys: Vec<u64> = (0..10).map(|_| rng.gen_range(0..1_000_000)).collect();
        for &k in &keys {
            index.put(k, k * 2);
        }

        for &k in &keys {
            assert!(index.contains(k));
            assert_eq!(index.get(k), Some(&(k * 2)));
        }
        assert_invariants(&index);
    }

    #[test]
    fn test_put_hit_replaces_value() {
        let mut index = RbIndex::new();
        assert_eq!(index.put(5, 50), None);
        assert_eq!(index.put(5, 55), Some(50));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(5), Some(&55));

        *index.get_mut(5).unwrap() = 56;
        assert_eq!(index.get(5), Some(&56));
        assert_invariants(&index);
    }

    #[test]
    fn test_height_is_logarithmic() {
        let mut index = RbIndex::with_capacity(100_000);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        while index.len() < 100_000 {
            index.put(rng.gen(), 0);
        }

        // lg N <= height <= 2 lg N
        let height = index.height();
        assert!((17..=34).contains(&height), "height {height}");
        assert!(index.is_balanced());
    }

    #[test]
    fn test_sorted_input_stays_balanced() {
        let mut rb = RbIndex::new();
        let mut bst = BstIndex::new();
        for k in 0..1024 {
            rb.put(k, k);
            bst.put(k, k);
        }

        assert!(rb.height() <= 20);
        // the plain tree degenerates into a list
        assert_eq!(bst.height(), 1024);
        assert_invariants(&rb);
        assert_invariants(&bst);
    }

    #[test]
    fn test_min_max() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(10 - i, 0);
        }
        assert_eq!(index.min(), Ok(1));
        assert_eq!(index.max(), Ok(10));
    }

    #[test]
    fn test_min_max_cached_on_delete() {
        let mut index = RbIndex::new();
        for i in 0..100 {
            index.put(100 - i, i);
        }
        assert_eq!(index.min(), Ok(1));
        assert_eq!(index.max(), Ok(100));

        assert_eq!(index.delete_min(), Ok((1, 99)));
        assert_eq!(index.delete_min(), Ok((2, 98)));
        for k in 3..20 {
            index.delete(k).unwrap();
        }
        assert_eq!(index.delete_max(), Ok((100, 0)));
        assert_eq!(index.delete_max(), Ok((99, 1)));
        for k in (71..=98).rev() {
            index.delete(k).unwrap();
        }

        assert_eq!(index.min(), Ok(20));
        assert_eq!(index.max(), Ok(70));
        assert_eq!(index.min_value(), Ok(&80));
        assert_eq!(index.max_value(), Ok(&30));
        assert_invariants(&index);
    }

    #[test]
    fn test_delete_max_with_interior_successor() {
        // deleting an interior node whose successor is the max
        let mut index = RbIndex::new();
        for k in [2, 1, 3] {
            index.put(k, k);
        }
        index.delete(2).unwrap();
        assert_eq!(index.max(), Ok(3));
        assert_eq!(index.min(), Ok(1));
        assert_invariants(&index);
    }

    #[test]
    fn test_floor() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(20 - 2 * i, 0);
        }
        assert_eq!(index.floor(3), Ok(2));
        assert_eq!(index.floor(10), Ok(10));
        assert_eq!(index.floor(100), Ok(20));
        assert_eq!(index.floor(1), Err(IndexError::NoFloor));
    }

    #[test]
    fn test_ceiling() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(20 - 2 * i, 0);
        }
        assert_eq!(index.ceiling(3), Ok(4));
        assert_eq!(index.ceiling(10), Ok(10));
        assert_eq!(index.ceiling(0), Ok(2));
        assert_eq!(index.ceiling(21), Err(IndexError::NoCeiling));
    }

    #[test]
    fn test_select() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(10 - i, 0);
        }
        assert_eq!(index.select(2), Ok(3));
        assert_eq!(index.select(9), Ok(10));
        assert_eq!(
            index.select(10),
            Err(IndexError::RankOutOfRange { rank: 10, len: 10 })
        );
    }

    #[test]
    fn test_rank() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(10 - i, 0);
        }
        for i in 0..10 {
            let k = index.select(i).unwrap();
            assert_eq!(index.rank(k), Ok(i));
        }

        // a new maximum ranks after every key, whatever its value
        assert_eq!(index.rank(11), Ok(10));
        assert_eq!(index.rank(11), index.rank(12));
        assert_eq!(index.rank(0), Ok(0));
    }

    #[test]
    fn test_keys_range() {
        let mut index = RbIndex::new();
        for i in 0..10 {
            index.put(10 - i, 0);
        }
        assert_eq!(index.keys(3, 6), Ok(vec![3, 4, 5, 6]));
        assert_eq!(index.keys(1, 10).unwrap().len(), 10);
        assert_eq!(index.keys(6, 3), Ok(vec![]));
        assert_eq!(index.keys(0, 6), Err(IndexError::RangeOutOfBounds));
        assert_eq!(index.keys(3, 11), Err(IndexError::RangeOutOfBounds));
    }

    #[test]
    fn test_delete_missing_key_leaves_tree_intact() {
        let mut index = RbIndex::new();
        for k in 0..20 {
            index.put(k * 2, k);
        }
        assert_eq!(index.delete(7), Err(IndexError::KeyNotFound));
        assert_eq!(index.len(), 20);
        assert_invariants(&index);
    }

    #[test]
    fn test_delete_single() {
        let mut index = RbIndex::new();
        for k in 0..10 {
            index.put(k, k);
        }
        assert_eq!(index.delete(5), Ok(5));
        assert_eq!(index.len(), 9);
        assert!(!index.contains(5));
        assert_invariants(&index);
    }

    #[test]
    fn test_delete_everything() {
        let mut index = RbIndex::new();
        for k in 0..64 {
            index.put(k, k);
        }
        for k in 0..64 {
            index.delete(k).unwrap();
            assert_invariants(&index);
        }
        assert!(index.is_empty());
        assert_eq!(index.min(), Err(IndexError::Empty));
        assert_eq!(index.max(), Err(IndexError::Empty));
    }

    #[test]
    fn test_iter_double_ended() {
        let mut index = RbIndex::new();
        for k in [5, 1, 4, 2, 3] {
            index.put(k, k * 10);
        }

        let mut iter = index.iter();
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.next(), Some((&1, &10)));
        assert_eq!(iter.next_back(), Some((&5, &50)));
        assert_eq!(iter.next(), Some((&2, &20)));
        assert_eq!(iter.next_back(), Some((&4, &40)));
        assert_eq!(iter.next(), Some((&3, &30)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn test_clear() {
        let mut index = RbIndex::new();
        for k in 0..10 {
            index.put(k, k);
        }
        index.clear();
        assert!(index.is_empty());
        assert_invariants(&index);

        index.put(3, 3);
        assert_eq!(index.min(), Ok(3));
        assert_invariants(&index);
    }

    fn random_put_delete<B: Balance>(seed: u64) {
        let mut index: OrderedIndex<u64, u64, B> = OrderedIndex::new();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let n = 1000;
        let mut keys: Vec<u64> = (0..n).map(|_| rng.gen_range(0..1_000_000)).collect();
        for &k in &keys {
            index.put(k, k);
        }
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(index.len(), keys.len());
        assert_invariants(&index);

        // trim both ends and a random middle key on every round
        let rounds = keys.len() * 3 / 10;
        for _ in 0..rounds {
            index.delete_min().unwrap();
            let k = index.select(rng.gen_range(0..index.len())).unwrap();
            assert_eq!(index.delete(k), Ok(k));
            index.delete_max().unwrap();
        }
        assert_eq!(index.len(), keys.len() - 3 * rounds);
        assert_invariants(&index);

        for k in index.iter().map(|(k, _)| *k).collect::<Vec<_>>() {
            let rank = index.rank(k).unwrap();
            assert_eq!(index.select(rank), Ok(k));
        }

        keys.shuffle(&mut rng);
        for k in keys {
            let _ = index.delete(k);
            if rng.gen_bool(0.05) {
                assert_invariants(&index);
            }
        }
        assert!(index.is_empty());
        assert_invariants(&index);
    }

    #[test]
    fn test_random_put_delete_red_black() {
        random_put_delete::<RedBlack>(42);
        random_put_delete::<RedBlack>(43);
    }

    #[test]
    fn test_random_put_delete_plain() {
        random_put_delete::<Unbalanced>(42);
    }

    #[test]
    fn test_interleaved_operations_keep_invariants() {
        let mut index = RbIndex::new();
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..2000 {
            let k = rng.gen_range(0..200);
            if rng.gen_bool(0.6) {
                index.put(k, k);
            } else {
                let _ = index.delete(k);
            }
            assert_invariants(&index);
        }
    }
}

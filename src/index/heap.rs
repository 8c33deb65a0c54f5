//! Indexed min-heap over price keys.
//!
//! ## Design
//!
//! A binary heap stored in a `Vec`, plus two side tables that map between
//! the caller's stable slot numbers and heap offsets:
//!
//! ```text
//! slot:       0      1      2      3
//! keys:     [Some(7) None  Some(3) Some(9)]
//! positions:[Some(1) None  Some(0) Some(2)]   slot -> heap offset
//! heap:     [2, 0, 3]                         heap offset -> slot
//! ```
//!
//! Capacity is fixed at construction: slots are `0..capacity`. Only the
//! minimum is reachable in O(1); there is no floor/ceiling/rank.

use crate::error::HeapError;

/// Fixed-capacity min-heap addressed by caller-assigned slots.
///
/// ## Example
///
/// ```
/// use hft_orderbook::index::IndexedMinHeap;
///
/// let mut heap = IndexedMinHeap::with_capacity(4);
/// heap.insert(0, 300u64).unwrap();
/// heap.insert(1, 100).unwrap();
/// heap.insert(2, 200).unwrap();
///
/// assert_eq!(heap.top(), Ok(100));
/// heap.change(1, 400).unwrap();
/// assert_eq!(heap.top_slot(), Ok(2));
/// assert_eq!(heap.delete_top(), Ok(2));
/// assert_eq!(heap.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<K> {
    /// Heap-ordered slots
    heap: Vec<usize>,
    /// Heap offset of each slot
    positions: Vec<Option<usize>>,
    /// Key held by each slot
    keys: Vec<Option<K>>,
}

impl<K: Ord + Copy> IndexedMinHeap<K> {
    /// Create an empty heap accepting slots `0..capacity`
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            positions: vec![None; capacity],
            keys: vec![None; capacity],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if `slot` currently holds a key. Out-of-range slots
    /// hold nothing.
    pub fn contains(&self, slot: usize) -> bool {
        self.positions.get(slot).map_or(false, Option::is_some)
    }

    /// Key held by `slot`
    pub fn key_of(&self, slot: usize) -> Result<K, HeapError> {
        self.check_slot(slot)?;
        self.keys[slot].ok_or(HeapError::SlotVacant(slot))
    }

    /// Insert `key` under `slot`.
    ///
    /// # Errors
    ///
    /// `SlotOutOfRange`, `SlotInUse`, or `Full`
    pub fn insert(&mut self, slot: usize, key: K) -> Result<(), HeapError> {
        self.check_slot(slot)?;
        if self.positions[slot].is_some() {
            return Err(HeapError::SlotInUse(slot));
        }
        if self.heap.len() == self.capacity() {
            return Err(HeapError::Full {
                capacity: self.capacity(),
            });
        }

        let offset = self.heap.len();
        self.heap.push(slot);
        self.positions[slot] = Some(offset);
        self.keys[slot] = Some(key);
        self.swim(offset);
        Ok(())
    }

    /// Replace the key of `slot` and restore heap order.
    ///
    /// # Returns
    ///
    /// The previous key
    pub fn change(&mut self, slot: usize, key: K) -> Result<K, HeapError> {
        let offset = self.offset_of(slot)?;
        let old = self.keys[slot].replace(key).ok_or(HeapError::SlotVacant(slot))?;
        if key > old {
            self.sink(offset);
        } else if key < old {
            self.swim(offset);
        }
        Ok(old)
    }

    /// Remove `slot` and return its key.
    pub fn delete(&mut self, slot: usize) -> Result<K, HeapError> {
        let offset = self.offset_of(slot)?;
        let last = self.heap.len() - 1;
        self.swap(offset, last);
        self.heap.pop();
        self.positions[slot] = None;
        let key = self.keys[slot].take().ok_or(HeapError::SlotVacant(slot))?;

        // the moved element may belong either above or below its new offset
        if offset < self.heap.len() {
            self.sink(offset);
            self.swim(offset);
        }
        Ok(key)
    }

    /// Smallest key, O(1)
    pub fn top(&self) -> Result<K, HeapError> {
        let slot = self.top_slot()?;
        self.keys[slot].ok_or(HeapError::SlotVacant(slot))
    }

    /// Slot holding the smallest key, O(1)
    pub fn top_slot(&self) -> Result<usize, HeapError> {
        self.heap.first().copied().ok_or(HeapError::Empty)
    }

    /// Remove the smallest key and return the slot that held it
    pub fn delete_top(&mut self) -> Result<usize, HeapError> {
        let slot = self.top_slot()?;
        self.delete(slot)?;
        Ok(slot)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn check_slot(&self, slot: usize) -> Result<(), HeapError> {
        if slot >= self.capacity() {
            return Err(HeapError::SlotOutOfRange {
                slot,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    fn offset_of(&self, slot: usize) -> Result<usize, HeapError> {
        self.check_slot(slot)?;
        self.positions[slot].ok_or(HeapError::SlotVacant(slot))
    }

    #[inline]
    fn less(&self, a: usize, b: usize) -> bool {
        self.keys[self.heap[a]] < self.keys[self.heap[b]]
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.positions[self.heap[a]] = Some(a);
        self.positions[self.heap[b]] = Some(b);
    }

    fn swim(&mut self, mut offset: usize) {
        while offset > 0 {
            let parent = (offset - 1) / 2;
            if !self.less(offset, parent) {
                break;
            }
            self.swap(offset, parent);
            offset = parent;
        }
    }

    fn sink(&mut self, mut offset: usize) {
        let n = self.heap.len();
        loop {
            let mut child = 2 * offset + 1;
            if child >= n {
                break;
            }
            if child + 1 < n && self.less(child + 1, child) {
                child += 1;
            }
            if !self.less(child, offset) {
                break;
            }
            self.swap(offset, child);
            offset = child;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

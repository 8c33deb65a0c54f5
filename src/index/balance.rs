//! Balancing strategies for [`OrderedIndex`](crate::index::OrderedIndex).
//!
//! ## Design
//!
//! The insert and delete descents in the tree are the same for every
//! strategy. At fixed points on the way down and back up they call the
//! hooks below, which may rotate or recolor the subtree and return its new
//! root. The default hooks do nothing, which yields a plain BST.
//!
//! [`RedBlack`] implements a left-leaning red-black tree (2-3 tree
//! isomorphism): red links lean left, no node has two red links, and every
//! root-to-leaf path crosses the same number of black links.

use crate::index::tree::Arena;

/// Rebalancing hooks driven by the tree's insert and delete descents.
pub trait Balance {
    /// Restore local invariants on the way back up. Returns the new
    /// subtree root.
    fn balance<K, V>(_arena: &mut Arena<K, V>, h: usize) -> usize {
        h
    }

    /// Before descending left during a delete: make sure the left child is
    /// not a 2-node.
    fn push_red_left<K, V>(_arena: &mut Arena<K, V>, h: usize) -> usize {
        h
    }

    /// Before comparing against `h` on the right branch of a delete.
    fn lean_right<K, V>(_arena: &mut Arena<K, V>, h: usize) -> usize {
        h
    }

    /// Before descending right during a delete: make sure the right child
    /// is not a 2-node.
    fn push_red_right<K, V>(_arena: &mut Arena<K, V>, h: usize) -> usize {
        h
    }

    /// Called on the root before a delete starts.
    fn prepare_delete<K, V>(_arena: &mut Arena<K, V>, _root: usize) {}

    /// Called on the root after every insert and delete.
    fn seal_root<K, V>(_arena: &mut Arena<K, V>, _root: usize) {}

    /// Check the strategy's shape invariants over the whole tree.
    fn is_balanced<K, V>(_arena: &Arena<K, V>, _root: Option<usize>) -> bool {
        true
    }
}

/// Left-leaning red-black tree. Height stays within 2·lg M.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedBlack;

/// Plain binary search tree. Sorted insertion degrades it to a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbalanced;

impl Balance for Unbalanced {}

impl Balance for RedBlack {
    fn balance<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
        let mut h = h;
        if arena.is_red(arena.right(h)) && !arena.is_red(arena.left(h)) {
            h = arena.rotate_left(h);
        }
        if arena.is_red(arena.left(h)) && arena.is_red(arena.left_left(h)) {
            h = arena.rotate_right(h);
        }
        if arena.is_red(arena.left(h)) && arena.is_red(arena.right(h)) {
            arena.flip_colors(h);
        }
        h
    }

    fn push_red_left<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
        if !arena.is_red(arena.left(h)) && !arena.is_red(arena.left_left(h)) {
            move_red_left(arena, h)
        } else {
            h
        }
    }

    fn lean_right<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
        if arena.is_red(arena.left(h)) {
            arena.rotate_right(h)
        } else {
            h
        }
    }

    fn push_red_right<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
        if !arena.is_red(arena.right(h)) && !arena.is_red(arena.right_left(h)) {
            move_red_right(arena, h)
        } else {
            h
        }
    }

    fn prepare_delete<K, V>(arena: &mut Arena<K, V>, root: usize) {
        if !arena.is_red(arena.left(root)) && !arena.is_red(arena.right(root)) {
            arena.set_red(root, true);
        }
    }

    fn seal_root<K, V>(arena: &mut Arena<K, V>, root: usize) {
        arena.set_red(root, false);
    }

    fn is_balanced<K, V>(arena: &Arena<K, V>, root: Option<usize>) -> bool {
        !arena.is_red(root) && is_2_3(arena, root) && black_height(arena, root).is_some()
    }
}

/// `h` is red and both children are black: make `h.left` or one of its
/// children red.
fn move_red_left<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
    arena.flip_colors(h);
    if arena.is_red(arena.right_left(h)) {
        if let Some(right) = arena.right(h) {
            let right = arena.rotate_right(right);
            arena.set_right(h, Some(right));
        }
        let h = arena.rotate_left(h);
        arena.flip_colors(h);
        return h;
    }
    h
}

/// `h` is red and both children are black: make `h.right` or one of its
/// children red.
fn move_red_right<K, V>(arena: &mut Arena<K, V>, h: usize) -> usize {
    arena.flip_colors(h);
    if arena.is_red(arena.left_left(h)) {
        let h = arena.rotate_right(h);
        arena.flip_colors(h);
        return h;
    }
    h
}

/// No right-leaning red link and no two red links in a row.
fn is_2_3<K, V>(arena: &Arena<K, V>, link: Option<usize>) -> bool {
    let Some(h) = link else {
        return true;
    };
    if arena.is_red(arena.right(h)) {
        return false;
    }
    if arena.is_red(link) && arena.is_red(arena.left(h)) {
        return false;
    }
    is_2_3(arena, arena.left(h)) && is_2_3(arena, arena.right(h))
}

/// Black links from `link` down to any leaf, or `None` if paths disagree.
fn black_height<K, V>(arena: &Arena<K, V>, link: Option<usize>) -> Option<usize> {
    let Some(h) = link else {
        return Some(0);
    };
    let left = black_height(arena, arena.left(h))?;
    let right = black_height(arena, arena.right(h))?;
    if left != right {
        return None;
    }
    Some(left + usize::from(!arena.is_red(link)))
}

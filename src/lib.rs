//! Arena-backed red-black tree.
//!
//! [`Redwood`] stores keys in a self-balancing binary search tree, giving
//! `O(log n)` insertion, lookup and removal. Nodes live in a generational
//! arena and are addressed through copyable [`NodeHandle`]s, which stay valid
//! until the node they name is erased.
//!
//! ```
//! use redwood::Redwood;
//!
//! let mut tree = Redwood::new();
//! for key in [5, 1, 9, 1] {
//!     tree.insert(key);
//! }
//!
//! let min = tree.min().unwrap();
//! assert_eq!(tree.key(min), Some(&1));
//!
//! let nine = tree.find(&9).unwrap();
//! assert_eq!(tree.erase(nine), Ok(9));
//! assert!(tree.iter().eq([1, 1, 5].iter()));
//! ```

extern crate alloc;

use core::borrow::Borrow;
use core::cmp::Ordering;

use alloc::vec::Vec;
use generational_arena::{Arena, Index};
use log::{debug, trace};

mod erase;
mod error;
mod iter;
mod validate;

pub use error::{InvariantViolation, RedwoodError};
pub use iter::RedwoodSortedIterator;

type Link = Option<Index>;

/// Color tag of a tree node. Absent children count as black.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeColor {
    #[default]
    Red,
    Black,
}

/// Stable reference to a node stored in a [`Redwood`].
///
/// A handle is invalidated when its node is physically removed. Using it
/// afterwards is detected and reported as [`RedwoodError::StaleHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(Index);

#[derive(Debug)]
struct RedwoodNode<K> {
    key: K,
    color: NodeColor,
    parent: Link,
    left: Link,
    right: Link,
}

impl<K> RedwoodNode<K> {
    fn new_isolated(key: K, parent: Link) -> Self {
        Self {
            key,
            color: NodeColor::default(),
            parent,
            left: None,
            right: None,
        }
    }
}

/// A red-black tree of ordered keys. Duplicate keys are allowed.
#[derive(Debug)]
pub struct Redwood<K: Ord> {
    storage: Arena<RedwoodNode<K>>,
    root: Link,
}

impl<K: Ord> Redwood<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arena::new(),
            root: None,
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Reserves room for at least `additional` more keys.
    pub fn reserve(&mut self, additional: usize) {
        self.storage.reserve(additional);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every node. Outstanding handles become stale.
    pub fn clear(&mut self) {
        debug!("tearing down tree of {} nodes", self.storage.len());

        // Removing slot by slot bumps the arena generation, so old handles
        // never alias nodes inserted afterwards.
        let live: Vec<Index> = self.storage.iter().map(|(idx, _)| idx).collect();
        for idx in live {
            self.storage.remove(idx);
        }
        self.root = None;
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Returns a node holding `key`, if any.
    ///
    /// When the tree holds duplicates of `key`, the first one met while
    /// descending from the root is returned.
    pub fn find<Q>(&self, key: &Q) -> Option<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current_node = self.root;

        while let Some(idx) = current_node {
            let curr_node_storage = &self.storage[idx];

            current_node = match key.cmp(curr_node_storage.key.borrow()) {
                Ordering::Less => curr_node_storage.left,
                Ordering::Equal => return Some(NodeHandle(idx)),
                Ordering::Greater => curr_node_storage.right,
            };
        }

        None
    }

    #[must_use]
    pub fn min(&self) -> Option<NodeHandle> {
        self.root.map(|root| NodeHandle(self.leftmost(root)))
    }

    #[must_use]
    pub fn max(&self) -> Option<NodeHandle> {
        self.root.map(|root| NodeHandle(self.rightmost(root)))
    }

    pub fn key(&self, handle: NodeHandle) -> Option<&K> {
        self.storage.get(handle.0).map(|node| &node.key)
    }

    pub fn color(&self, handle: NodeHandle) -> Option<NodeColor> {
        self.storage.get(handle.0).map(|node| node.color)
    }

    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root.map(NodeHandle)
    }

    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.storage.get(handle.0)?.parent.map(NodeHandle)
    }

    pub fn left(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.storage.get(handle.0)?.left.map(NodeHandle)
    }

    pub fn right(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.storage.get(handle.0)?.right.map(NodeHandle)
    }

    /// Inserts `key` and returns a handle to its node.
    ///
    /// Keys equal to an existing key descend to the right, so a duplicate is
    /// placed after every equal key met on its path.
    pub fn insert(&mut self, key: K) -> NodeHandle {
        let mut current_node = self.root;
        let mut parent_node = None;
        let mut goes_left = false;

        while let Some(idx) = current_node {
            parent_node = Some(idx);
            let curr_node_storage = &self.storage[idx];

            goes_left = key < curr_node_storage.key;
            current_node = if goes_left {
                curr_node_storage.left
            } else {
                curr_node_storage.right
            };
        }

        let new_node = self
            .storage
            .insert(RedwoodNode::new_isolated(key, parent_node));

        match parent_node {
            None => self.root = Some(new_node),
            Some(parent) if goes_left => self.storage[parent].left = Some(new_node),
            Some(parent) => self.storage[parent].right = Some(new_node),
        }

        self.fix_red_violation(new_node);

        NodeHandle(new_node)
    }

    fn fix_red_violation(&mut self, start_node_idx: Index) {
        let mut curr_node = start_node_idx;

        while let Some(mut parent_idx) = self.storage[curr_node]
            .parent
            .filter(|&parent| self.is_red(Some(parent)))
        {
            let grandparent_idx = self.storage[parent_idx]
                .parent
                .expect("a red node always has a parent");
            let grandparent = &self.storage[grandparent_idx];

            let parent_is_left = grandparent.left == Some(parent_idx);
            let uncle = if parent_is_left {
                grandparent.right
            } else {
                grandparent.left
            };

            if let Some(uncle_idx) = uncle.filter(|&uncle| self.is_red(Some(uncle))) {
                trace!("insert fix-up: red uncle, recoloring");
                self.set_color(parent_idx, NodeColor::Black);
                self.set_color(uncle_idx, NodeColor::Black);
                self.set_color(grandparent_idx, NodeColor::Red);

                curr_node = grandparent_idx;
                continue;
            }

            let curr_is_left = self.storage[parent_idx].left == Some(curr_node);
            if curr_is_left != parent_is_left {
                trace!("insert fix-up: inner grandchild, straightening");
                if parent_is_left {
                    self.rotate_left(parent_idx);
                } else {
                    self.rotate_right(parent_idx);
                }

                core::mem::swap(&mut curr_node, &mut parent_idx);
            }

            trace!("insert fix-up: outer grandchild, rotating grandparent");
            self.set_color(parent_idx, NodeColor::Black);
            self.set_color(grandparent_idx, NodeColor::Red);

            if parent_is_left {
                self.rotate_right(grandparent_idx);
            } else {
                self.rotate_left(grandparent_idx);
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, NodeColor::Black);
        }
    }

    /// Rotates `center` down to the left. Its right child takes its place
    /// and is returned.
    fn rotate_left(&mut self, center: Index) -> Index {
        let grandparent_idx = self.storage[center].parent;
        let pivot_idx = self.storage[center]
            .right
            .expect("left rotation needs a right child");
        trace!("rotate left at {center:?}");

        let c_idx = self.storage[pivot_idx].left;

        self.storage[center].right = c_idx;
        if let Some(c_idx) = c_idx {
            self.storage[c_idx].parent = Some(center);
        }

        self.storage[pivot_idx].left = Some(center);
        self.storage[center].parent = Some(pivot_idx);

        self.replace_child(grandparent_idx, center, Some(pivot_idx));

        pivot_idx
    }

    /// Mirror of [`Self::rotate_left`].
    fn rotate_right(&mut self, center: Index) -> Index {
        let grandparent_idx = self.storage[center].parent;
        let pivot_idx = self.storage[center]
            .left
            .expect("right rotation needs a left child");
        trace!("rotate right at {center:?}");

        let c_idx = self.storage[pivot_idx].right;

        self.storage[center].left = c_idx;
        if let Some(c_idx) = c_idx {
            self.storage[c_idx].parent = Some(center);
        }

        self.storage[pivot_idx].right = Some(center);
        self.storage[center].parent = Some(pivot_idx);

        self.replace_child(grandparent_idx, center, Some(pivot_idx));

        pivot_idx
    }

    /// Puts `new` where `old` hung below `parent`, or at the root when
    /// `parent` is absent. Only compares `old`, so it may already be freed.
    fn replace_child(&mut self, parent: Link, old: Index, new: Link) {
        if let Some(new) = new {
            self.storage[new].parent = parent;
        }

        match parent {
            Some(parent) => {
                let parent_node = &mut self.storage[parent];
                if parent_node.left == Some(old) {
                    parent_node.left = new;
                } else {
                    parent_node.right = new;
                }
            }
            None => self.root = new,
        }
    }

    fn leftmost(&self, mut idx: Index) -> Index {
        while let Some(left) = self.storage[idx].left {
            idx = left;
        }
        idx
    }

    fn rightmost(&self, mut idx: Index) -> Index {
        while let Some(right) = self.storage[idx].right {
            idx = right;
        }
        idx
    }

    fn color_of(&self, link: Link) -> NodeColor {
        link.map_or(NodeColor::Black, |idx| self.storage[idx].color)
    }

    fn is_red(&self, link: Link) -> bool {
        self.color_of(link) == NodeColor::Red
    }

    fn set_color(&mut self, idx: Index, color: NodeColor) {
        self.storage[idx].color = color;
    }
}

impl<K: Ord> Default for Redwood<K> {
    fn default() -> Self {
        Self::new()
    }
}

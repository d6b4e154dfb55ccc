use core::borrow::Borrow;
use core::mem;

use generational_arena::Index;
use log::trace;

use crate::{Link, NodeColor, NodeHandle, Redwood, RedwoodError};

/// What is left behind after a node with at most one child is unlinked.
struct Spliced<K> {
    key: K,
    color: NodeColor,
    replacement: Link,
    parent: Link,
}

impl<K: Ord> Redwood<K> {
    /// Removes the key stored at `handle` and returns it.
    ///
    /// If the node has two children its in-order successor is unlinked
    /// instead, after moving the successor's key into the node. The handle
    /// of the successor becomes stale, `handle` itself stays valid and now
    /// names the successor's key.
    pub fn erase(&mut self, handle: NodeHandle) -> Result<K, RedwoodError> {
        let target = handle.0;
        let node = self
            .storage
            .get(target)
            .ok_or(RedwoodError::StaleHandle(handle))?;

        let spliced = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                let mut spliced = self.splice_out(successor);

                mem::swap(&mut self.storage[target].key, &mut spliced.key);
                spliced
            }
            _ => self.splice_out(target),
        };

        match spliced.parent {
            None => {
                if let Some(root) = spliced.replacement {
                    self.set_color(root, NodeColor::Black);
                }
            }
            Some(parent) if spliced.color == NodeColor::Black => {
                self.fix_black_deficit(spliced.replacement, parent);
            }
            Some(_) => {}
        }

        Ok(spliced.key)
    }

    /// Removes one node holding `key` and returns its key.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.find(key)?;
        self.erase(handle).ok()
    }

    /// Unlinks and frees `idx`, which must have at most one child. The child
    /// moves up into its place.
    fn splice_out(&mut self, idx: Index) -> Spliced<K> {
        let node = self
            .storage
            .remove(idx)
            .expect("spliced node is live");
        let replacement = node.left.or(node.right);

        self.replace_child(node.parent, idx, replacement);

        Spliced {
            key: node.key,
            color: node.color,
            replacement,
            parent: node.parent,
        }
    }

    fn fix_black_deficit(&mut self, mut curr_node: Link, parent_idx: Index) {
        let mut parent_node = Some(parent_idx);

        while let Some(parent_idx) = parent_node {
            if self.is_red(curr_node) {
                break;
            }

            let curr_is_left = self.storage[parent_idx].left == curr_node;
            let mut sibling_idx = self.sibling(parent_idx, curr_is_left);

            if self.is_red(Some(sibling_idx)) {
                trace!("erase fix-up: red sibling");
                self.set_color(sibling_idx, NodeColor::Black);
                self.set_color(parent_idx, NodeColor::Red);
                self.rotate_toward(parent_idx, curr_is_left);

                sibling_idx = self.sibling(parent_idx, curr_is_left);
            }

            let (near, far) = self.nephews(sibling_idx, curr_is_left);

            if !self.is_red(near) && !self.is_red(far) {
                trace!("erase fix-up: black nephews, moving up");
                self.set_color(sibling_idx, NodeColor::Red);

                curr_node = Some(parent_idx);
                parent_node = self.storage[parent_idx].parent;
                continue;
            }

            if !self.is_red(far) {
                trace!("erase fix-up: red near nephew");
                let near_idx = near.expect("red nephew is present");
                self.set_color(near_idx, NodeColor::Black);
                self.set_color(sibling_idx, NodeColor::Red);
                self.rotate_toward(sibling_idx, !curr_is_left);

                sibling_idx = self.sibling(parent_idx, curr_is_left);
            }

            trace!("erase fix-up: red far nephew");
            let parent_color = self.storage[parent_idx].color;
            self.set_color(sibling_idx, parent_color);
            self.set_color(parent_idx, NodeColor::Black);
            self.rotate_toward(parent_idx, curr_is_left);

            // The far nephew is red and now hangs below the sibling; blackening
            // it after the loop settles the deficit.
            curr_node = self.nephews(sibling_idx, !curr_is_left).0;
            parent_node = Some(sibling_idx);
        }

        if let Some(curr_idx) = curr_node {
            self.set_color(curr_idx, NodeColor::Black);
        }
        if let Some(root) = self.root {
            self.set_color(root, NodeColor::Black);
        }
    }

    /// Rotates at `idx` so it moves down on the `left` side (or right side).
    fn rotate_toward(&mut self, idx: Index, left: bool) -> Index {
        if left {
            self.rotate_left(idx)
        } else {
            self.rotate_right(idx)
        }
    }

    /// Sibling of the child on the `curr_is_left` side of `parent_idx`. A
    /// black deficit below a parent implies the sibling exists.
    fn sibling(&self, parent_idx: Index, curr_is_left: bool) -> Index {
        let parent = &self.storage[parent_idx];
        let sibling = if curr_is_left {
            parent.right
        } else {
            parent.left
        };
        sibling.expect("a black-height deficit implies a sibling")
    }

    /// Near and far children of `sibling_idx` relative to the current side.
    fn nephews(&self, sibling_idx: Index, curr_is_left: bool) -> (Link, Link) {
        let sibling = &self.storage[sibling_idx];
        if curr_is_left {
            (sibling.left, sibling.right)
        } else {
            (sibling.right, sibling.left)
        }
    }
}

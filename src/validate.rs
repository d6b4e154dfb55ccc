use generational_arena::Index;

use crate::{InvariantViolation, Link, NodeColor, NodeHandle, Redwood};

struct Walk<'a, K> {
    previous: Option<&'a K>,
    reachable: usize,
}

impl<K: Ord> Redwood<K> {
    /// Checks every red-black and search-tree invariant.
    ///
    /// Returns the number of black nodes on each path from the root down to
    /// an absent child (0 for an empty tree).
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        let Some(root) = self.root else {
            return match self.storage.len() {
                0 => Ok(0),
                stored => Err(InvariantViolation::NodeCountMismatch {
                    reachable: 0,
                    stored,
                }),
            };
        };

        let root_node = &self.storage[root];
        if root_node.parent.is_some() {
            return Err(InvariantViolation::RootHasParent(NodeHandle(root)));
        }
        if root_node.color == NodeColor::Red {
            return Err(InvariantViolation::RedRoot(NodeHandle(root)));
        }

        let mut walk = Walk {
            previous: None,
            reachable: 0,
        };
        let black_height = self.validate_subtree(root, &mut walk)?;

        if walk.reachable != self.storage.len() {
            return Err(InvariantViolation::NodeCountMismatch {
                reachable: walk.reachable,
                stored: self.storage.len(),
            });
        }

        Ok(black_height)
    }

    fn validate_subtree<'a>(
        &'a self,
        idx: Index,
        walk: &mut Walk<'a, K>,
    ) -> Result<usize, InvariantViolation> {
        let node = &self.storage[idx];
        walk.reachable += 1;

        let left = self.validate_child(idx, node.left, walk)?;

        if walk.previous.is_some_and(|previous| *previous > node.key) {
            return Err(InvariantViolation::OutOfOrder(NodeHandle(idx)));
        }
        walk.previous = Some(&node.key);

        let right = self.validate_child(idx, node.right, walk)?;

        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch {
                node: NodeHandle(idx),
                left,
                right,
            });
        }

        Ok(left + usize::from(node.color == NodeColor::Black))
    }

    fn validate_child<'a>(
        &'a self,
        parent: Index,
        child: Link,
        walk: &mut Walk<'a, K>,
    ) -> Result<usize, InvariantViolation> {
        let Some(child) = child else {
            return Ok(0);
        };

        let child_node = self
            .storage
            .get(child)
            .filter(|node| node.parent == Some(parent))
            .ok_or(InvariantViolation::BrokenParentLink {
                parent: NodeHandle(parent),
                child: NodeHandle(child),
            })?;

        if child_node.color == NodeColor::Red && self.storage[parent].color == NodeColor::Red {
            return Err(InvariantViolation::RedRedEdge {
                parent: NodeHandle(parent),
                child: NodeHandle(child),
            });
        }

        self.validate_subtree(child, walk)
    }
}

#[cfg(test)]
mod tests {
    use crate::{InvariantViolation, NodeColor, Redwood};

    #[test]
    pub fn empty_tree_is_valid() {
        assert_eq!(Redwood::<u8>::new().validate(), Ok(0));
    }

    #[test]
    pub fn detects_red_root() {
        let mut tree = Redwood::new();
        let root = tree.insert(1);
        tree.storage[root.0].color = NodeColor::Red;

        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot(root)));
    }

    #[test]
    pub fn detects_red_red_edge() {
        let mut tree = Redwood::new();
        tree.insert(2);
        let left = tree.insert(1);
        let right = tree.insert(3);
        tree.storage[left.0].color = NodeColor::Black;
        tree.storage[right.0].color = NodeColor::Black;
        let leaf = tree.insert(4);
        tree.storage[right.0].color = NodeColor::Red;
        tree.storage[leaf.0].color = NodeColor::Red;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::RedRedEdge {
                parent: right,
                child: leaf,
            })
        );
    }

    #[test]
    pub fn detects_black_height_mismatch() {
        let mut tree = Redwood::new();
        let root = tree.insert(2);
        let left = tree.insert(1);
        tree.storage[left.0].color = NodeColor::Black;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch {
                node: root,
                left: 1,
                right: 0,
            })
        );
    }

    #[test]
    pub fn detects_out_of_order_keys() {
        let mut tree = Redwood::new();
        tree.insert(2);
        let right = tree.insert(3);
        tree.storage[right.0].key = 1;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::OutOfOrder(right))
        );
    }

    #[test]
    pub fn detects_broken_parent_link() {
        let mut tree = Redwood::new();
        let root = tree.insert(2);
        let child = tree.insert(1);
        tree.storage[child.0].parent = None;

        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BrokenParentLink {
                parent: root,
                child,
            })
        );
    }
}

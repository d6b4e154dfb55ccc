use thiserror::Error;

use crate::NodeHandle;

/// Errors returned by fallible [`Redwood`](crate::Redwood) operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RedwoodError {
    #[error("node handle {0:?} does not refer to a live node")]
    StaleHandle(NodeHandle),
}

/// A broken red-black or search-tree invariant, as reported by
/// [`Redwood::validate`](crate::Redwood::validate).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("root {0:?} is red")]
    RedRoot(NodeHandle),

    #[error("root {0:?} has a parent link")]
    RootHasParent(NodeHandle),

    #[error("node {child:?} does not link back to its parent {parent:?}")]
    BrokenParentLink {
        parent: NodeHandle,
        child: NodeHandle,
    },

    #[error("red node {parent:?} has red child {child:?}")]
    RedRedEdge {
        parent: NodeHandle,
        child: NodeHandle,
    },

    #[error("subtrees of {node:?} have black heights {left} and {right}")]
    BlackHeightMismatch {
        node: NodeHandle,
        left: usize,
        right: usize,
    },

    #[error("key of {0:?} breaks in-order ordering")]
    OutOfOrder(NodeHandle),

    #[error("{reachable} nodes reachable from the root, {stored} stored")]
    NodeCountMismatch { reachable: usize, stored: usize },
}

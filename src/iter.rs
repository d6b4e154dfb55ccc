use alloc::vec::Vec;

use generational_arena::Index;

use crate::{Link, Redwood};

/// In-order iterator over the keys of a [`Redwood`], smallest first.
pub struct RedwoodSortedIterator<'a, K: Ord> {
    pub(crate) tree: &'a Redwood<K>,
    pub(crate) curr: Link,
    pub(crate) stack: Vec<Index>,
    pub(crate) remaining: usize,
}

impl<'a, K: Ord> Iterator for RedwoodSortedIterator<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(curr) = self.curr {
            self.stack.push(curr);
            self.curr = self.tree.storage[curr].left;
        }

        let node = self.tree.storage.get(self.stack.pop()?)?;
        self.curr = node.right;
        self.remaining -= 1;

        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Ord> ExactSizeIterator for RedwoodSortedIterator<'_, K> {}

impl<K: Ord> Redwood<K> {
    pub fn iter(&self) -> RedwoodSortedIterator<'_, K> {
        RedwoodSortedIterator {
            tree: self,
            curr: self.root,
            stack: Vec::new(),
            remaining: self.len(),
        }
    }

    /// Copies keys in ascending order into `out` until it is full, returning
    /// how many were written.
    pub fn to_ordered_slice(&self, out: &mut [K]) -> usize
    where
        K: Clone,
    {
        out.iter_mut()
            .zip(self.iter())
            .map(|(slot, key)| slot.clone_from(key))
            .count()
    }
}

impl<'a, K: Ord> IntoIterator for &'a Redwood<K> {
    type Item = &'a K;
    type IntoIter = RedwoodSortedIterator<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use alloc::vec::Vec;

use super::id::NodeId;
use super::store::NodeStore;

/// An iterator over the nodes owned by a node, in order.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub struct Children<'a> {
    store: &'a NodeStore,
    inner: core::slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, list: &'a [u32]) -> Self {
        Self {
            store,
            inner: list.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.inner.next().map(|&idx| self.store.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<NodeId> {
        self.inner.next_back().map(|&idx| self.store.id_at(idx))
    }
}

impl ExactSizeIterator for Children<'_> {}

/// An iterator over a node's track/stack ancestors, nearest first.
///
/// Created by [`NodeStore::ancestors`].
#[derive(Debug)]
pub struct Ancestors<'a> {
    store: &'a NodeStore,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let cur = self.current?;
        self.current = self.store.parent(cur);
        Some(cur)
    }
}

/// A pre-order iterator over a subtree, excluding its root.
///
/// Created by [`NodeStore::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    store: &'a NodeStore,
    stack: Vec<u32>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.stack.pop()?;
        self.stack
            .extend(self.store.children[idx as usize].iter().rev().copied());
        Some(self.store.id_at(idx))
    }
}

impl NodeStore {
    /// Returns an iterator over the tracks and stacks above `id`.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            store: self,
            current: self.parent(id),
        }
    }

    /// Returns the outermost track or stack above `id`, or `id` itself.
    #[must_use]
    pub fn highest_ancestor(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Returns a pre-order iterator over every node owned, directly or not,
    /// by `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        self.validate(id);
        let stack = self.children[id.idx as usize].iter().rev().copied().collect();
        Descendants { store: self, stack }
    }
}

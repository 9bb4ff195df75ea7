// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Untimed collections.
//!
//! A collection owns any kind of node, including timelines and other
//! collections, in order. Its entries have no temporal parent.

use alloc::vec::Vec;

use crate::error::{Error, Result};

use super::id::NodeId;
use super::kind::NodeKind;
use super::store::{NodeStore, mismatch};

impl NodeStore {
    /// Appends `entry` to `collection`, detaching it from its owner first.
    pub fn collection_append(&mut self, collection: NodeId, entry: NodeId) -> Result<()> {
        let size = self.child_count(collection);
        self.collection_insert(collection, size, entry)
    }

    /// Inserts `entry` at `index`.
    ///
    /// Fails with [`Error::IndexOutOfRange`] if `index` is past the end and
    /// [`Error::Cycle`] if `entry` contains `collection`.
    pub fn collection_insert(
        &mut self,
        collection: NodeId,
        index: usize,
        entry: NodeId,
    ) -> Result<()> {
        self.require_collection(collection)?;
        self.validate(entry);
        let size = self.children[collection.idx as usize].len();
        if index > size {
            return Err(Error::IndexOutOfRange { index, size });
        }
        self.check_cycle(collection.idx, entry.idx)?;
        self.attach(collection.idx, entry.idx, index);
        Ok(())
    }

    /// Detaches and returns the entry at `index`.
    pub fn collection_remove(&mut self, collection: NodeId, index: usize) -> Result<NodeId> {
        self.require_collection(collection)?;
        let list = &self.children[collection.idx as usize];
        let idx = *list.get(index).ok_or(Error::IndexOutOfRange {
            index,
            size: list.len(),
        })?;
        self.unlink(idx);
        Ok(self.id_at(idx))
    }

    /// Detaches every entry and returns them in order.
    pub fn collection_clear(&mut self, collection: NodeId) -> Result<Vec<NodeId>> {
        self.require_collection(collection)?;
        let removed: Vec<NodeId> = self.children(collection).collect();
        for id in &removed {
            self.unlink(id.idx);
        }
        Ok(removed)
    }

    /// Returns entries accepted by `filter`, descending into nested
    /// collections in pre-order.
    pub fn collection_find<F>(&self, collection: NodeId, filter: F) -> Result<Vec<NodeId>>
    where
        F: Fn(NodeId) -> bool,
    {
        self.require_collection(collection)?;
        let mut out = Vec::new();
        let mut pending: Vec<NodeId> = self.children(collection).rev().collect();
        while let Some(entry) = pending.pop() {
            if filter(entry) {
                out.push(entry);
            }
            if self.kind(entry) == NodeKind::SerializableCollection {
                pending.extend(self.children(entry).rev());
            }
        }
        Ok(out)
    }

    fn require_collection(&self, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::SerializableCollection => Ok(()),
            other => Err(mismatch("collection", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::node::{Clip, SerializableCollection, Track};

    #[test]
    fn holds_any_kind_without_parenting() {
        let mut store = NodeStore::new();
        let bin = store.create("bin", SerializableCollection);
        let tl = store.create_timeline("edit");
        let clip = store.create("c", Clip::default());
        store.collection_append(bin, tl).unwrap();
        store.collection_insert(bin, 0, clip).unwrap();
        assert_eq!(store.owner(clip), Some(bin));
        assert_eq!(store.parent(clip), None, "collections are not temporal parents");
        assert_eq!(store.children(bin).collect::<Vec<_>>(), vec![clip, tl]);
        assert_eq!(
            store.collection_insert(bin, 5, clip),
            Err(Error::IndexOutOfRange { index: 5, size: 2 })
        );
    }

    #[test]
    fn find_descends_into_nested_collections() {
        let mut store = NodeStore::new();
        let bin = store.create("bin", SerializableCollection);
        let sub = store.create("sub", SerializableCollection);
        let a = store.create("a", Clip::default());
        let b = store.create("b", Clip::default());
        let t = store.create("t", Track::default());
        let inner = store.create("inner", Clip::default());
        store.append_child(t, inner).unwrap();
        store.collection_append(bin, a).unwrap();
        store.collection_append(bin, sub).unwrap();
        store.collection_append(sub, b).unwrap();
        store.collection_append(bin, t).unwrap();

        let clips = store
            .collection_find(bin, |id| store.kind(id) == NodeKind::Clip)
            .unwrap();
        assert_eq!(clips, vec![a, b], "tracks are not searched");
        assert_eq!(store.collection_find(bin, |_| true).unwrap().len(), 4);
    }

    #[test]
    fn remove_clear_and_cycles() {
        let mut store = NodeStore::new();
        let bin = store.create("bin", SerializableCollection);
        let sub = store.create("sub", SerializableCollection);
        let a = store.create("a", Clip::default());
        store.collection_append(bin, sub).unwrap();
        store.collection_append(sub, a).unwrap();
        assert_eq!(store.collection_append(sub, bin), Err(Error::Cycle));
        assert_eq!(store.collection_remove(sub, 0), Ok(a));
        assert_eq!(store.owner(a), None);
        assert_eq!(store.collection_clear(bin), Ok(vec![sub]));
        assert!(store.collection_append(a, sub).is_err(), "clip is not a collection");
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deep copy and structural equivalence.

use alloc::string::String;
use alloc::vec::Vec;

use crate::metadata::Metadata;
use crate::trace::{EditEvent, SubtreeClonedEvent};

use super::id::NodeId;
use super::kind::{Clip, ItemFields, NodeData};
use super::store::NodeStore;

/// A detached copy of a subtree, in pre-order.
struct Snapshot {
    nodes: Vec<SnapshotNode>,
}

struct SnapshotNode {
    name: String,
    metadata: Metadata,
    data: NodeData,
    /// Position of the owner in `nodes`; `None` for the root.
    owner: Option<usize>,
}

impl Snapshot {
    fn capture(store: &NodeStore, root: NodeId) -> Self {
        store.validate(root);
        let mut nodes = Vec::new();
        let mut pending = alloc::vec![(root.idx, None)];
        while let Some((idx, owner)) = pending.pop() {
            let pos = nodes.len();
            nodes.push(SnapshotNode {
                name: store.name[idx as usize].clone(),
                metadata: store.metadata[idx as usize].clone(),
                data: store.data[idx as usize].clone(),
                owner,
            });
            pending.extend(
                store.children[idx as usize]
                    .iter()
                    .rev()
                    .map(|&child| (child, Some(pos))),
            );
        }
        Self { nodes }
    }

    fn instantiate(self, store: &mut NodeStore, source: NodeId) -> NodeId {
        let mut slots: Vec<u32> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes {
            let idx = store.alloc(node.name, node.data);
            store.metadata[idx as usize] = node.metadata;
            if let Some(owner) = node.owner {
                let owner = slots[owner];
                let end = store.children[owner as usize].len();
                store.link(owner, idx, end);
            }
            slots.push(idx);
        }
        let clone = store.id_at(slots[0]);
        let event = SubtreeClonedEvent {
            source,
            clone,
            node_count: u32::try_from(slots.len()).unwrap_or(u32::MAX),
        };
        store.record(EditEvent::Cloned(event));
        clone
    }
}

impl NodeStore {
    /// Deep-copies `id` and everything it owns into a new detached subtree.
    ///
    /// The copy shares nothing with the original: names, metadata, effects,
    /// markers and media references are all duplicated.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        Snapshot::capture(self, id).instantiate(self, id)
    }

    /// Deep-copies `id` from this store into `target`, returning the new
    /// root's handle in `target`.
    pub fn clone_subtree_into(&self, id: NodeId, target: &mut Self) -> NodeId {
        Snapshot::capture(self, id).instantiate(target, id)
    }

    /// Returns `true` if the subtree at `a` in this store has the same shape
    /// as the subtree at `b` in `other`.
    ///
    /// Kinds must match exactly. Names and kind-specific fields are
    /// compared, and children are compared pairwise in order. Node metadata
    /// is ignored.
    #[must_use]
    pub fn is_equivalent(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        if self.name(a) != other.name(b) {
            return false;
        }
        let same_payload = match (self.data(a), other.data(b)) {
            (NodeData::Clip(x), NodeData::Clip(y)) => clips_equivalent(x, y),
            (NodeData::Gap(x), NodeData::Gap(y)) => items_equivalent(&x.item, &y.item),
            (NodeData::Transition(x), NodeData::Transition(y)) => x == y,
            (NodeData::Track(x), NodeData::Track(y)) => {
                x.kind == y.kind && items_equivalent(&x.item, &y.item)
            }
            (NodeData::Stack(x), NodeData::Stack(y)) => items_equivalent(&x.item, &y.item),
            (NodeData::Timeline(x), NodeData::Timeline(y)) => {
                x.global_start_time == y.global_start_time
            }
            (NodeData::SerializableCollection(_), NodeData::SerializableCollection(_)) => true,
            _ => false,
        };
        same_payload
            && self.child_count(a) == other.child_count(b)
            && self
                .children(a)
                .zip(other.children(b))
                .all(|(x, y)| self.is_equivalent(x, other, y))
    }
}

fn items_equivalent(a: &ItemFields, b: &ItemFields) -> bool {
    a.source_range == b.source_range
        && a.enabled == b.enabled
        && a.color == b.color
        && a.effects.len() == b.effects.len()
        && a.effects.iter().zip(&b.effects).all(|(x, y)| x.is_equivalent_to(y))
        && a.markers.len() == b.markers.len()
        && a.markers.iter().zip(&b.markers).all(|(x, y)| x.is_equivalent_to(y))
}

fn clips_equivalent(a: &Clip, b: &Clip) -> bool {
    let (refs_a, refs_b) = (a.media_references(), b.media_references());
    items_equivalent(&a.item, &b.item)
        && a.active_media_reference_key() == b.active_media_reference_key()
        && refs_a.len() == refs_b.len()
        && refs_a
            .iter()
            .zip(refs_b)
            .all(|((ka, ra), (kb, rb))| ka == kb && ra.is_equivalent_to(rb))
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Track trimming and transition expansion.

use alloc::vec::Vec;

use crate::error::Result;
use crate::node::{NodeData, NodeId, NodeKind, NodeStore};
use crate::range::TimeRange;

use super::{attach_or_destroy, clone_showing, clone_with_source, fill_or_destroy, shallow_copy};

/// Returns a copy of `track` holding only what falls inside `range`.
///
/// Children outside the range are dropped, children straddling an edge are
/// retimed to the overlap, and transitions are dropped. The track is never
/// lengthened.
pub fn track_trimmed_to_range(
    store: &mut NodeStore,
    track: NodeId,
    range: TimeRange,
) -> Result<NodeId> {
    store.track(track)?;
    let epsilon = store.config().epsilon_s;
    let placed = store.range_of_all_children(track)?;
    let result = shallow_copy(store, track);
    fill_or_destroy(store, result, |store, result| {
        for (child, child_range) in placed {
            if store.kind(child) == NodeKind::Transition {
                continue;
            }
            let Some(overlap) = child_range.intersection(range, epsilon) else {
                continue;
            };
            let copy = clone_showing(store, child, child_range, overlap)?;
            attach_or_destroy(store, result, copy)?;
        }
        Ok(())
    })
}

/// Returns a copy of `track` with every transition's overlap made explicit.
///
/// For `[A, T, B]` the result is `[A, A_tail, T, B_head, B]`, where `A_tail`
/// is the last `in_offset` of `A`, `B_head` is the first `out_offset` of `B`,
/// and `A` and `B` are shortened by the same amounts. The track duration is
/// unchanged.
pub fn track_with_expanded_transitions(store: &mut NodeStore, track: NodeId) -> Result<NodeId> {
    store.track(track)?;
    let children: Vec<NodeId> = store.children(track).collect();
    let result = shallow_copy(store, track);
    fill_or_destroy(store, result, |store, result| {
        for (i, &child) in children.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| children[p]);
            let next = children.get(i + 1).copied();

            if let NodeData::Transition(t) = *store.data(child) {
                if let Some(prev) = prev.filter(|&p| store.kind(p).is_item()) {
                    let source = store.trimmed_range(prev)?;
                    let tail =
                        TimeRange::new(source.end_time_exclusive() - t.in_offset, t.in_offset);
                    append_retimed(store, result, prev, tail)?;
                }
                let copy = store.clone_subtree(child);
                attach_or_destroy(store, result, copy)?;
                if let Some(next) = next.filter(|&n| store.kind(n).is_item()) {
                    let source = store.trimmed_range(next)?;
                    let head = TimeRange::new(source.start_time(), t.out_offset);
                    append_retimed(store, result, next, head)?;
                }
                continue;
            }

            let mut source = store.trimmed_range(child)?;
            if let Some(NodeData::Transition(t)) = prev.map(|p| store.data(p)) {
                source = TimeRange::new(
                    source.start_time() + t.out_offset,
                    source.duration() - t.out_offset,
                );
            }
            if let Some(NodeData::Transition(t)) = next.map(|n| store.data(n)) {
                source = TimeRange::new(source.start_time(), source.duration() - t.in_offset);
            }
            append_retimed(store, result, child, source)?;
        }
        Ok(())
    })
}

fn append_retimed(
    store: &mut NodeStore,
    track: NodeId,
    item: NodeId,
    source: TimeRange,
) -> Result<()> {
    let copy = clone_with_source(store, item, source)?;
    attach_or_destroy(store, track, copy)
}

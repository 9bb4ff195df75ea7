// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-tree editing helpers.
//!
//! Trimming, flattening and filtering build their result as a new detached
//! subtree in the same [`NodeStore`] and leave their input untouched. The
//! editorial operations in [`edit`] change a composition in place.

pub mod edit;
mod filter;
mod stack;
mod timeline;
mod track;

pub use edit::{
    EditOptions, ReferencePoint, fill, insert, overwrite, remove, remove_range, ripple, roll,
    slice, slide, slip, trim,
};
pub use filter::{
    FilterAction, filtered_composition, filtered_with_sequence_context, keep_all, keep_kinds,
    keep_named, prune_all,
};
pub use stack::{flatten_stack, flatten_tracks, top_clip_at_time};
pub use timeline::{flatten_timeline_video_tracks, timeline_trimmed_to_range};
pub use track::{track_trimmed_to_range, track_with_expanded_transitions};

use alloc::string::String;

use crate::error::Result;
use crate::node::{NodeId, NodeStore};
use crate::range::TimeRange;

/// Returns the source range that shows `visible` of an item whose untrimmed
/// placement is `placed`, both in the parent's coordinates.
fn retimed_source_range(
    store: &NodeStore,
    item: NodeId,
    placed: TimeRange,
    visible: TimeRange,
) -> Result<TimeRange> {
    let source = store.trimmed_range(item)?;
    let offset = visible.start_time() - placed.start_time();
    let start = source.start_time() + offset.rescaled_to(source.start_time().rate());
    let duration = visible.duration().rescaled_to(source.duration().rate());
    Ok(TimeRange::new(start, duration))
}

/// Copies `item` and retimes the copy to show only `visible`.
fn clone_showing(
    store: &mut NodeStore,
    item: NodeId,
    placed: TimeRange,
    visible: TimeRange,
) -> Result<NodeId> {
    let source = retimed_source_range(store, item, placed, visible)?;
    clone_with_source(store, item, source)
}

/// Copies `item` with its source range replaced by `source`.
fn clone_with_source(store: &mut NodeStore, item: NodeId, source: TimeRange) -> Result<NodeId> {
    let copy = store.clone_subtree(item);
    if let Err(e) = store.set_source_range(copy, Some(source)) {
        store.destroy(copy);
        return Err(e);
    }
    Ok(copy)
}

/// Appends the detached `child` to `parent`, destroying it on failure.
fn attach_or_destroy(store: &mut NodeStore, parent: NodeId, child: NodeId) -> Result<()> {
    let attached = store.append_child(parent, child);
    if attached.is_err() {
        store.destroy(child);
    }
    attached
}

/// Runs `fill` on the detached `result`.
///
/// If `fill` fails, `result` and everything attached to it is destroyed, so
/// a failed edit leaves the store with the nodes it had before.
fn fill_or_destroy<F>(store: &mut NodeStore, result: NodeId, fill: F) -> Result<NodeId>
where
    F: FnOnce(&mut NodeStore, NodeId) -> Result<()>,
{
    match fill(store, result) {
        Ok(()) => Ok(result),
        Err(e) => {
            store.destroy(result);
            Err(e)
        }
    }
}

/// Creates an empty node with the name, metadata and payload of `id`.
fn shallow_copy(store: &mut NodeStore, id: NodeId) -> NodeId {
    let name = String::from(store.name(id));
    let data = store.data(id).clone();
    let metadata = store.metadata(id).clone();
    let copy = store.create(name, data);
    *store.metadata_mut(copy) = metadata;
    copy
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whole-timeline trimming and flattening.

use alloc::vec::Vec;

use crate::error::Result;
use crate::node::{NodeId, NodeKind, NodeStore, TrackKind};
use crate::range::TimeRange;

use super::{
    attach_or_destroy, fill_or_destroy, flatten_tracks, shallow_copy, track_trimmed_to_range,
};

/// Returns a copy of `timeline` with every track trimmed to `range`.
///
/// Non-track children of the tracks stack are copied unchanged.
pub fn timeline_trimmed_to_range(
    store: &mut NodeStore,
    timeline: NodeId,
    range: TimeRange,
) -> Result<NodeId> {
    let tracks = store.tracks(timeline)?;
    let children: Vec<NodeId> = store.children(tracks).collect();
    let stack = shallow_copy(store, tracks);
    let stack = fill_or_destroy(store, stack, |store, stack| {
        for child in children {
            let copy = if store.kind(child) == NodeKind::Track {
                track_trimmed_to_range(store, child, range)?
            } else {
                store.clone_subtree(child)
            };
            attach_or_destroy(store, stack, copy)?;
        }
        Ok(())
    })?;
    rehome(store, timeline, stack)
}

/// Returns a copy of `timeline` whose video tracks are flattened into one.
///
/// The flattened track comes first, followed by copies of the audio tracks
/// and any other children of the tracks stack.
pub fn flatten_timeline_video_tracks(store: &mut NodeStore, timeline: NodeId) -> Result<NodeId> {
    let tracks = store.tracks(timeline)?;
    let video = store.video_tracks(timeline)?;
    let rest: Vec<NodeId> = store
        .children(tracks)
        .filter(|&c| {
            store
                .track(c)
                .map_or(true, |track| track.kind != TrackKind::Video)
        })
        .collect();
    let flat = flatten_tracks(store, &video)?;
    let stack = shallow_copy(store, tracks);
    let stack = fill_or_destroy(store, stack, |store, stack| {
        attach_or_destroy(store, stack, flat)?;
        for child in rest {
            let copy = store.clone_subtree(child);
            attach_or_destroy(store, stack, copy)?;
        }
        Ok(())
    })?;
    rehome(store, timeline, stack)
}

/// Creates a copy of `timeline` that owns `stack` as its tracks.
///
/// `stack` is destroyed if it cannot be attached.
fn rehome(store: &mut NodeStore, timeline: NodeId, stack: NodeId) -> Result<NodeId> {
    let result = shallow_copy(store, timeline);
    match store.set_tracks(result, stack) {
        Ok(placeholder) => {
            store.destroy(placeholder);
            Ok(result)
        }
        Err(e) => {
            store.destroy(result);
            store.destroy(stack);
            Err(e)
        }
    }
}

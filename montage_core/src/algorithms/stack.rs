// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stack flattening and top-most clip lookup.

use alloc::vec::Vec;

use crate::error::Result;
use crate::node::{Gap, NodeId, NodeKind, NodeStore, Track, TrackKind};
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::{attach_or_destroy, clone_showing, fill_or_destroy};

/// A visible slice of some item, in track time.
#[derive(Clone, Copy, Debug)]
struct Segment {
    /// Where the slice shows.
    visible: TimeRange,
    /// The item it comes from.
    item: NodeId,
    /// The item's untrimmed placement in its track.
    placed: TimeRange,
}

/// Flattens the tracks directly under `stack` into one track.
///
/// Non-track children are ignored. See [`flatten_tracks`].
pub fn flatten_stack(store: &mut NodeStore, stack: NodeId) -> Result<NodeId> {
    let tracks: Vec<NodeId> = store
        .children(stack)
        .filter(|&c| store.kind(c) == NodeKind::Track)
        .collect();
    flatten_tracks(store, &tracks)
}

/// Composites `tracks`, listed bottom to top, into a new video track named
/// `"Flattened"`.
///
/// At every instant the enabled item of the highest track wins. Gaps and
/// transitions never cover lower content. Holes are filled with gaps.
/// Track-level source ranges are not applied.
pub fn flatten_tracks(store: &mut NodeStore, tracks: &[NodeId]) -> Result<NodeId> {
    let epsilon = store.config().epsilon_s;
    let mut segments: Vec<Segment> = Vec::new();
    for &track in tracks {
        store.track(track)?;
        for (item, placed) in store.range_of_all_children(track)? {
            let kind = store.kind(item);
            if matches!(kind, NodeKind::Gap | NodeKind::Transition) || !store.enabled(item) {
                continue;
            }
            if placed.duration().to_seconds() <= epsilon {
                continue;
            }
            overwrite(&mut segments, placed, epsilon);
            segments.push(Segment {
                visible: placed,
                item,
                placed,
            });
        }
    }
    segments.sort_by(|a, b| {
        let (a, b) = (a.visible.start_time(), b.visible.start_time());
        a.to_seconds().total_cmp(&b.to_seconds())
    });

    let result = store.create("Flattened", Track::new(TrackKind::Video));
    fill_or_destroy(store, result, |store, result| {
        let mut cursor: Option<RationalTime> = None;
        for segment in segments {
            let start = segment.visible.start_time();
            let hole = match cursor {
                Some(c) => start - c,
                None => start,
            };
            if hole.to_seconds() > epsilon {
                let gap = store.create("", Gap::with_duration(hole));
                attach_or_destroy(store, result, gap)?;
            }
            let copy = clone_showing(store, segment.item, segment.placed, segment.visible)?;
            attach_or_destroy(store, result, copy)?;
            cursor = Some(segment.visible.end_time_exclusive());
        }
        Ok(())
    })
}

/// Removes `cover` from every segment, splitting those it lands inside.
fn overwrite(segments: &mut Vec<Segment>, cover: TimeRange, epsilon: f64) {
    let mut kept = Vec::with_capacity(segments.len() + 1);
    for segment in segments.drain(..) {
        let visible = segment.visible;
        if !visible.intersects(cover, epsilon) {
            kept.push(segment);
            continue;
        }
        let before = TimeRange::from_start_end_time(visible.start_time(), cover.start_time());
        if visible.start_time() < cover.start_time() && before.duration().to_seconds() > epsilon {
            kept.push(Segment {
                visible: before,
                ..segment
            });
        }
        let after =
            TimeRange::from_start_end_time(cover.end_time_exclusive(), visible.end_time_exclusive());
        if visible.end_time_exclusive() > cover.end_time_exclusive()
            && after.duration().to_seconds() > epsilon
        {
            kept.push(Segment {
                visible: after,
                ..segment
            });
        }
    }
    *segments = kept;
}

/// Returns the enabled clip visible at `time` on the highest track of
/// `stack`, descending into stacks nested in tracks.
pub fn top_clip_at_time(
    store: &NodeStore,
    stack: NodeId,
    time: RationalTime,
) -> Result<Option<NodeId>> {
    for track in store.children(stack).rev() {
        if store.kind(track) != NodeKind::Track {
            continue;
        }
        if let Some(clip) = clip_at_time_in_track(store, track, time)? {
            if store.enabled(clip) {
                return Ok(Some(clip));
            }
        }
    }
    Ok(None)
}

fn clip_at_time_in_track(
    store: &NodeStore,
    track: NodeId,
    time: RationalTime,
) -> Result<Option<NodeId>> {
    for (child, range) in store.range_of_all_children(track)? {
        if !range.contains(time) {
            continue;
        }
        return match store.kind(child) {
            NodeKind::Clip => Ok(Some(child)),
            NodeKind::Stack => top_clip_at_time(store, child, time - range.start_time()),
            _ => Ok(None),
        };
    }
    Ok(None)
}

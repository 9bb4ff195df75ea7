// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-kind ranges and the cross-node time transform.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::error::{Error, Result};
use crate::range::TimeRange;
use crate::time::RationalTime;
#[cfg(feature = "trace-rich")]
use crate::trace::{TimeWalkStepEvent, WalkDirection};
use crate::trace::Tracer;

use super::id::NodeId;
use super::kind::{NodeData, NodeKind};
use super::store::{NodeStore, mismatch};

impl NodeStore {
    // -- Ranges --

    /// Returns the intrinsic, untrimmed range of a node.
    ///
    /// - Clip: the active media reference's available range.
    /// - Gap: its source range.
    /// - Track: the sum of its visible children.
    /// - Stack: its longest child.
    /// - Timeline: the range of its tracks stack.
    ///
    /// Fails with [`Error::CannotComputeRange`] for a clip whose media has no
    /// range or a gap with no source range, and [`Error::TypeMismatch`] for
    /// transitions and collections.
    pub fn available_range(&self, id: NodeId) -> Result<TimeRange> {
        match self.data(id) {
            NodeData::Clip(clip) => clip
                .media_reference()
                .available_range
                .ok_or(Error::CannotComputeRange),
            NodeData::Gap(gap) => gap.item.source_range.ok_or(Error::CannotComputeRange),
            NodeData::Track(_) => self.track_available_range(id),
            NodeData::Stack(_) => self.stack_available_range(id),
            NodeData::Timeline(_) => self.available_range(self.tracks(id)?),
            other => Err(mismatch("item", other.kind())),
        }
    }

    /// Returns the source range if set, else the available range.
    pub fn trimmed_range(&self, id: NodeId) -> Result<TimeRange> {
        match self.source_range(id)? {
            Some(range) => Ok(range),
            None => self.available_range(id),
        }
    }

    /// Returns the trimmed range widened by the handles of adjacent
    /// transitions when the node sits in a track.
    pub fn visible_range(&self, id: NodeId) -> Result<TimeRange> {
        let mut range = self.trimmed_range(id)?;
        let Some(parent) = self.parent(id) else {
            return Ok(range);
        };
        if self.kind(parent) != NodeKind::Track {
            return Ok(range);
        }
        let (in_handle, out_handle) = self.handles_of_child(parent, id)?;
        if let Some(head) = in_handle {
            range = TimeRange::new(range.start_time() - head, range.duration() + head);
        }
        if let Some(tail) = out_handle {
            range = TimeRange::new(range.start_time(), range.duration() + tail);
        }
        Ok(range)
    }

    /// Returns the length a node occupies in its parent.
    ///
    /// Items report their source range duration if trimmed, else their
    /// available duration. A transition's duration is `in_offset +
    /// out_offset`; a timeline's is that of its tracks.
    pub fn duration(&self, id: NodeId) -> Result<RationalTime> {
        match self.data(id) {
            NodeData::Transition(t) => Ok(t.duration()),
            NodeData::Timeline(_) => self.duration(self.tracks(id)?),
            NodeData::SerializableCollection(_) => {
                Err(mismatch("item", NodeKind::SerializableCollection))
            }
            data => match data.item().and_then(|item| item.source_range) {
                Some(range) => Ok(range.duration()),
                None => Ok(self.available_range(id)?.duration()),
            },
        }
    }

    /// Returns the node's untrimmed range in its parent's coordinates.
    ///
    /// Fails with [`Error::NotFound`] for nodes without a track or stack
    /// parent.
    pub fn range_in_parent(&self, id: NodeId) -> Result<TimeRange> {
        let parent = self.parent(id).ok_or(Error::NotFound)?;
        self.range_of_child(parent, id)
    }

    /// Returns the node's range in its parent's coordinates, clipped by the
    /// parent's trim. `None` if the trim hides it entirely.
    pub fn trimmed_range_in_parent(&self, id: NodeId) -> Result<Option<TimeRange>> {
        let parent = self.parent(id).ok_or(Error::NotFound)?;
        self.trimmed_range_of_child(parent, id)
    }

    /// Returns the union of every clip's media image bounds under `id`, or
    /// the clip's own bounds. `None` if no media declares bounds.
    pub fn available_image_bounds(&self, id: NodeId) -> Result<Option<Rect>> {
        match self.data(id) {
            NodeData::Clip(clip) => Ok(clip.media_reference().available_image_bounds),
            NodeData::Gap(_) | NodeData::Transition(_) => Ok(None),
            NodeData::Timeline(_) => self.available_image_bounds(self.tracks(id)?),
            NodeData::Track(_) | NodeData::Stack(_) => {
                let mut bounds: Option<Rect> = None;
                for child in self.children(id) {
                    if let Some(b) = self.available_image_bounds(child)? {
                        bounds = Some(bounds.map_or(b, |acc| acc.union(b)));
                    }
                }
                Ok(bounds)
            }
            other => Err(mismatch("item", other.kind())),
        }
    }

    // -- Coordinate transforms --

    /// Maps `time` from `from`'s internal coordinates into `to`'s.
    ///
    /// Both nodes must share a root. With `to == None` the time is returned
    /// unchanged. Fails with [`Error::NotFound`] if the nodes are in
    /// different trees.
    pub fn transformed_time(
        &self,
        time: RationalTime,
        from: NodeId,
        to: Option<NodeId>,
    ) -> Result<RationalTime> {
        self.transformed_time_traced(time, from, to, &mut Tracer::none())
    }

    /// Like [`transformed_time`](Self::transformed_time), reporting each level
    /// of the walk to `tracer` under the `trace-rich` feature.
    pub fn transformed_time_traced(
        &self,
        time: RationalTime,
        from: NodeId,
        to: Option<NodeId>,
        tracer: &mut Tracer<'_>,
    ) -> Result<RationalTime> {
        let Some(to) = to else {
            return Ok(time);
        };
        #[cfg(not(feature = "trace-rich"))]
        {
            _ = &tracer;
        }
        let root = self.highest_ancestor(from);

        // Up from `from` until the root or `to`.
        let mut result = time;
        let mut item = from;
        while item != root && item != to {
            let Some(parent) = self.parent(item) else {
                break;
            };
            result -= self.trimmed_range(item)?.start_time();
            result += self.range_of_child(parent, item)?.start_time();
            item = parent;
            #[cfg(feature = "trace-rich")]
            tracer.time_walk_step(&TimeWalkStepEvent {
                node: item,
                direction: WalkDirection::Up,
                time: result,
            });
        }
        if item == to {
            return Ok(result);
        }

        // Up from `to`, recording each level, then replay downwards.
        let ancestor = item;
        let mut steps: Vec<(NodeId, RationalTime, RationalTime)> = Vec::new();
        let mut item = to;
        while item != ancestor {
            let Some(parent) = self.parent(item) else {
                break;
            };
            let trimmed_start = self.trimmed_range(item)?.start_time();
            let in_parent = self.range_of_child(parent, item)?.start_time();
            steps.push((item, trimmed_start, in_parent));
            item = parent;
        }
        if item != ancestor {
            return Err(Error::NotFound);
        }
        for &(node, trimmed_start, in_parent) in steps.iter().rev() {
            result = result - in_parent + trimmed_start;
            #[cfg(feature = "trace-rich")]
            tracer.time_walk_step(&TimeWalkStepEvent {
                node,
                direction: WalkDirection::Down,
                time: result,
            });
            #[cfg(not(feature = "trace-rich"))]
            {
                _ = node;
            }
        }
        Ok(result)
    }

    /// Maps a range's start with [`transformed_time`](Self::transformed_time);
    /// the duration is kept.
    pub fn transformed_time_range(
        &self,
        range: TimeRange,
        from: NodeId,
        to: Option<NodeId>,
    ) -> Result<TimeRange> {
        let start = self.transformed_time(range.start_time(), from, to)?;
        Ok(TimeRange::new(start, range.duration()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaReference;
    use crate::node::{Clip, Gap, SerializableCollection, Stack, Track, Transition, TransitionType};

    fn rt(v: f64) -> RationalTime {
        RationalTime::new(v, 24.0)
    }

    fn media(start: f64, frames: f64) -> MediaReference {
        MediaReference::external("file:///m.mov")
            .with_available_range(TimeRange::from_values(start, frames, 24.0))
    }

    #[test]
    fn clip_ranges_follow_media_and_trim() {
        let mut store = NodeStore::new();
        let untrimmed = store.create("a", Clip::new(Some(media(100.0, 50.0))));
        assert_eq!(
            store.trimmed_range(untrimmed),
            Ok(TimeRange::from_values(100.0, 50.0, 24.0))
        );
        assert_eq!(store.duration(untrimmed).unwrap().value(), 50.0);

        let trimmed = store.create(
            "b",
            Clip::new(Some(media(100.0, 50.0)))
                .with_source_range(TimeRange::from_values(110.0, 10.0, 24.0)),
        );
        assert_eq!(store.duration(trimmed).unwrap().value(), 10.0);
        assert_eq!(
            store.available_range(trimmed),
            Ok(TimeRange::from_values(100.0, 50.0, 24.0))
        );

        let missing = store.create("m", Clip::default());
        assert_eq!(store.available_range(missing), Err(Error::CannotComputeRange));
        assert_eq!(store.duration(missing), Err(Error::CannotComputeRange));
    }

    #[test]
    fn gap_without_range_cannot_compute() {
        let mut store = NodeStore::new();
        let gap = store.create("g", Gap::default());
        assert_eq!(store.available_range(gap), Err(Error::CannotComputeRange));
        let coll = store.create("bin", SerializableCollection);
        assert!(store.duration(coll).is_err(), "collections are untimed");
    }

    #[test]
    fn visible_range_includes_transition_handles() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::default());
        let a = store.create(
            "a",
            Clip::new(Some(media(0.0, 100.0))).with_source_range(TimeRange::from_values(10.0, 24.0, 24.0)),
        );
        let t = store.create(
            "x",
            Transition::new(TransitionType::SmpteDissolve, rt(3.0), rt(5.0)),
        );
        let b = store.create(
            "b",
            Clip::new(Some(media(0.0, 100.0))).with_source_range(TimeRange::from_values(40.0, 24.0, 24.0)),
        );
        for id in [a, t, b] {
            store.append_child(track, id).unwrap();
        }
        assert_eq!(store.visible_range(a), Ok(TimeRange::from_values(10.0, 29.0, 24.0)));
        assert_eq!(store.visible_range(b), Ok(TimeRange::from_values(37.0, 27.0, 24.0)));
        assert_eq!(store.range_in_parent(b), Ok(TimeRange::from_values(24.0, 24.0, 24.0)));
        assert_eq!(store.duration(t).unwrap().value(), 8.0);
    }

    #[test]
    fn range_in_parent_requires_parent() {
        let mut store = NodeStore::new();
        let gap = store.create("g", Gap::with_duration(rt(5.0)));
        assert_eq!(store.range_in_parent(gap), Err(Error::NotFound));
        assert_eq!(store.trimmed_range_in_parent(gap), Err(Error::NotFound));
    }

    #[test]
    fn image_bounds_union() {
        let mut store = NodeStore::new();
        let stack = store.create("s", Stack::new());
        let track = store.create("t", Track::default());
        let a = store.create(
            "a",
            Clip::new(Some(media(0.0, 10.0).with_image_bounds(Rect::new(0.0, 0.0, 16.0, 9.0)))),
        );
        let b = store.create(
            "b",
            Clip::new(Some(media(0.0, 10.0).with_image_bounds(Rect::new(-4.0, 2.0, 8.0, 12.0)))),
        );
        let g = store.create("g", Gap::with_duration(rt(5.0)));
        store.append_child(track, a).unwrap();
        store.append_child(track, g).unwrap();
        store.append_child(stack, track).unwrap();
        store.append_child(stack, b).unwrap();
        assert_eq!(
            store.available_image_bounds(stack),
            Ok(Some(Rect::new(-4.0, 0.0, 16.0, 12.0)))
        );
        assert_eq!(store.available_image_bounds(g), Ok(None));
    }

    /// Stack -> Track -> Clip with a trimmed clip and a leading gap.
    fn nested(store: &mut NodeStore) -> (NodeId, NodeId, NodeId) {
        let stack = store.create("root", Stack::new());
        let track = store.create("v1", Track::default());
        let lead = store.create("lead", Gap::with_duration(rt(48.0)));
        let clip = store.create(
            "c",
            Clip::new(Some(media(0.0, 500.0))).with_source_range(TimeRange::from_values(100.0, 24.0, 24.0)),
        );
        store.append_child(track, lead).unwrap();
        store.append_child(track, clip).unwrap();
        store.append_child(stack, track).unwrap();
        (stack, track, clip)
    }

    #[test]
    fn transformed_time_walks_up() {
        let mut store = NodeStore::new();
        let (stack, track, clip) = nested(&mut store);
        // Media frame 110 is 10 frames into the clip, which starts at 48.
        let in_track = store.transformed_time(rt(110.0), clip, Some(track)).unwrap();
        assert_eq!(in_track.value(), 58.0);
        let in_stack = store.transformed_time(rt(110.0), clip, Some(stack)).unwrap();
        assert_eq!(in_stack.value(), 58.0);
        assert_eq!(store.transformed_time(rt(7.0), clip, None), Ok(rt(7.0)), "identity");
    }

    #[test]
    fn transformed_time_round_trips_through_root() {
        let mut store = NodeStore::new();
        let (stack, _, clip) = nested(&mut store);
        let t = rt(117.0);
        let up = store.transformed_time(t, clip, Some(stack)).unwrap();
        let back = store.transformed_time(up, stack, Some(clip)).unwrap();
        assert!(back.strictly_equal(t), "{back:?}");

        let range = TimeRange::from_values(117.0, 3.0, 24.0);
        let up = store.transformed_time_range(range, clip, Some(stack)).unwrap();
        assert_eq!(up, TimeRange::from_values(65.0, 3.0, 24.0));
    }

    #[test]
    fn transformed_time_between_cousins() {
        let mut store = NodeStore::new();
        let (stack, _, clip) = nested(&mut store);
        let other = store.create("v2", Track::default());
        let g = store.create("g", Gap::with_duration(rt(10.0)));
        let c2 = store.create(
            "c2",
            Clip::new(Some(media(0.0, 500.0))).with_source_range(TimeRange::from_values(300.0, 100.0, 24.0)),
        );
        store.append_child(other, g).unwrap();
        store.append_child(other, c2).unwrap();
        store.append_child(stack, other).unwrap();
        // Clip frame 110 -> stack 58 -> track v2 58 -> c2 300 + 48.
        let t = store.transformed_time(rt(110.0), clip, Some(c2)).unwrap();
        assert_eq!(t.value(), 348.0);
    }

    #[test]
    fn transformed_time_across_trees_fails() {
        let mut store = NodeStore::new();
        let (_, _, clip) = nested(&mut store);
        let (_, _, stranger) = nested(&mut store);
        assert_eq!(
            store.transformed_time(rt(0.0), clip, Some(stranger)),
            Err(Error::NotFound)
        );
    }

    #[cfg(feature = "trace-rich")]
    #[test]
    fn traced_walk_reports_each_level() {
        use crate::trace::{TimeWalkStepEvent, TraceSink, WalkDirection};

        #[derive(Default)]
        struct Steps(Vec<TimeWalkStepEvent>);
        impl TraceSink for Steps {
            fn on_time_walk_step(&mut self, e: &TimeWalkStepEvent) {
                self.0.push(*e);
            }
        }

        let mut store = NodeStore::new();
        let (stack, track, clip) = nested(&mut store);
        let mut sink = Steps::default();
        let mut tracer = Tracer::new(&mut sink);
        let up = store
            .transformed_time_traced(rt(110.0), clip, Some(stack), &mut tracer)
            .unwrap();
        store
            .transformed_time_traced(up, stack, Some(clip), &mut tracer)
            .unwrap();
        drop(tracer);
        let nodes: Vec<_> = sink.0.iter().map(|e| (e.node, e.direction)).collect();
        assert_eq!(
            nodes,
            [
                (track, WalkDirection::Up),
                (stack, WalkDirection::Up),
                (track, WalkDirection::Down),
                (clip, WalkDirection::Down),
            ]
        );
    }
}

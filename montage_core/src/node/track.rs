// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequential layout.
//!
//! Children of a track sit back to back. Only visible children advance the
//! playhead, so a transition's range starts where its successor starts and
//! the track's length ignores it.

use alloc::vec::Vec;

use crate::error::Result;
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::id::NodeId;
use super::kind::{NodeData, NodeKind, Transition};
use super::store::{NodeStore, mismatch};

/// Whether [`NodeStore::neighbors_of`] fills missing edge neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NeighborGapPolicy {
    /// Report a missing neighbor as `None`.
    #[default]
    Never,
    /// Report a zero-length gap beside a transition at either end.
    AroundTransitions,
}

/// One side of [`NodeStore::neighbors_of`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Neighbor {
    /// A sibling in the track.
    Node(NodeId),
    /// A zero-length gap standing in for a missing sibling. Not in the store.
    SyntheticGap,
}

impl Neighbor {
    /// Returns the sibling handle, if this is not synthetic.
    #[must_use]
    pub const fn node(self) -> Option<NodeId> {
        match self {
            Self::Node(id) => Some(id),
            Self::SyntheticGap => None,
        }
    }
}

impl NodeStore {
    /// Returns the in and out handles of `child`: the offsets of the
    /// transitions directly before and after it, if any.
    pub fn handles_of_child(
        &self,
        track: NodeId,
        child: NodeId,
    ) -> Result<(Option<RationalTime>, Option<RationalTime>)> {
        self.require_track(track)?;
        let index = self.index_of_child(track, child)?;
        let list = &self.children[track.idx as usize];
        let in_handle = index
            .checked_sub(1)
            .and_then(|i| self.transition_at(list[i]))
            .map(|t| t.in_offset);
        let out_handle = list
            .get(index + 1)
            .and_then(|&idx| self.transition_at(idx))
            .map(|t| t.out_offset);
        Ok((in_handle, out_handle))
    }

    /// Returns the siblings on either side of `item`.
    pub fn neighbors_of(
        &self,
        track: NodeId,
        item: NodeId,
        policy: NeighborGapPolicy,
    ) -> Result<(Option<Neighbor>, Option<Neighbor>)> {
        self.require_track(track)?;
        let index = self.index_of_child(track, item)?;
        let list = &self.children[track.idx as usize];
        let synthesize = policy == NeighborGapPolicy::AroundTransitions
            && self.kind(item) == NodeKind::Transition;
        let edge = || synthesize.then_some(Neighbor::SyntheticGap);

        let prev = match index.checked_sub(1) {
            Some(i) => Some(Neighbor::Node(self.id_at(list[i]))),
            None => edge(),
        };
        let next = match list.get(index + 1) {
            Some(&idx) => Some(Neighbor::Node(self.id_at(idx))),
            None => edge(),
        };
        Ok((prev, next))
    }

    // -- Layout, dispatched from composition --

    pub(crate) fn track_range_of_child_at_index(
        &self,
        track: NodeId,
        index: usize,
    ) -> Result<TimeRange> {
        let list = &self.children[track.idx as usize];
        let duration = self.duration(self.id_at(list[index]))?;
        let mut start = RationalTime::new(0.0, duration.rate());
        for &idx in &list[..index] {
            let prev = self.id_at(idx);
            if self.visible(prev) {
                start += self.duration(prev)?;
            }
        }
        Ok(TimeRange::new(start, duration))
    }

    pub(crate) fn track_range_of_all_children(
        &self,
        track: NodeId,
    ) -> Result<Vec<(NodeId, TimeRange)>> {
        let mut out = Vec::with_capacity(self.child_count(track));
        let mut elapsed: Option<RationalTime> = None;
        for child in self.children(track) {
            let duration = self.duration(child)?;
            let mut start = RationalTime::new(0.0, duration.rate());
            if let Some(elapsed) = elapsed {
                start += elapsed;
            }
            out.push((child, TimeRange::new(start, duration)));
            if self.visible(child) {
                elapsed = Some(elapsed.map_or(duration, |e| e + duration));
            }
        }
        Ok(out)
    }

    /// Sum of visible children; the first one fixes the rate.
    pub(crate) fn track_available_range(&self, track: NodeId) -> Result<TimeRange> {
        let mut total: Option<RationalTime> = None;
        for child in self.children(track) {
            if self.visible(child) {
                let duration = self.duration(child)?;
                total = Some(total.map_or(duration, |t| t + duration));
            }
        }
        let total = total.unwrap_or(RationalTime::ZERO);
        Ok(TimeRange::new(RationalTime::new(0.0, total.rate()), total))
    }

    fn require_track(&self, id: NodeId) -> Result<()> {
        match self.kind(id) {
            NodeKind::Track => Ok(()),
            other => Err(mismatch("track", other)),
        }
    }

    fn transition_at(&self, idx: u32) -> Option<&Transition> {
        match &self.data[idx as usize] {
            NodeData::Transition(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::media::MediaReference;
    use crate::node::{Clip, Gap, Track, TrackKind, TransitionType};

    fn rt(v: f64) -> RationalTime {
        RationalTime::new(v, 24.0)
    }

    fn clip(store: &mut NodeStore, name: &str, frames: f64) -> NodeId {
        let media = MediaReference::external("file:///a.mov")
            .with_available_range(TimeRange::from_values(0.0, 240.0, 24.0));
        store.create(
            name,
            Clip::new(Some(media)).with_source_range(TimeRange::from_values(10.0, frames, 24.0)),
        )
    }

    fn dissolve(store: &mut NodeStore, frames: f64) -> NodeId {
        store.create(
            "dissolve",
            Transition::new(TransitionType::SmpteDissolve, rt(frames), rt(frames)),
        )
    }

    #[test]
    fn transition_keeps_duration_and_reports_handles() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::new(TrackKind::Video));
        let a = clip(&mut store, "a", 24.0);
        let b = clip(&mut store, "b", 24.0);
        let c = clip(&mut store, "c", 24.0);
        for id in [a, b, c] {
            store.append_child(track, id).unwrap();
        }
        assert_eq!(store.duration(track).unwrap().value(), 72.0);
        assert_eq!(store.duration(track).unwrap().to_seconds(), 3.0);

        let t = dissolve(&mut store, 6.0);
        store.insert_child(track, 1, t).unwrap();
        assert_eq!(store.duration(track).unwrap().value(), 72.0, "transition is invisible");

        let (in_handle, out_handle) = store.handles_of_child(track, b).unwrap();
        assert_eq!(in_handle.map(RationalTime::value), Some(6.0));
        assert_eq!(out_handle, None);
        let (in_handle, out_handle) = store.handles_of_child(track, a).unwrap();
        assert_eq!(in_handle, None);
        assert_eq!(out_handle.map(RationalTime::value), Some(6.0));
    }

    #[test]
    fn ranges_skip_invisible_children() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::default());
        let a = clip(&mut store, "a", 24.0);
        let t = dissolve(&mut store, 4.0);
        let b = clip(&mut store, "b", 12.0);
        for id in [a, t, b] {
            store.append_child(track, id).unwrap();
        }
        assert_eq!(store.range_of_child(track, t), Ok(TimeRange::from_values(24.0, 8.0, 24.0)));
        assert_eq!(store.range_of_child(track, b), Ok(TimeRange::from_values(24.0, 12.0, 24.0)));

        let all = store.range_of_all_children(track).unwrap();
        assert_eq!(all.len(), 3);
        for (i, (id, range)) in all.into_iter().enumerate() {
            assert_eq!(Ok(range), store.range_of_child_at_index(track, i), "child {i}");
            assert_eq!(store.child_at_index(track, i), Ok(id));
        }
        assert_eq!(
            store.available_range(track),
            Ok(TimeRange::from_values(0.0, 36.0, 24.0))
        );
    }

    #[test]
    fn mixed_rates_resolve_to_the_finer_rate() {
        let mut store = NodeStore::new();
        let track = store.create("a1", Track::new(TrackKind::Audio));
        let g1 = store.create("g1", Gap::with_duration(rt(24.0)));
        let g2 = store.create("g2", Gap::with_duration(RationalTime::new(48.0, 48.0)));
        store.append_child(track, g1).unwrap();
        store.append_child(track, g2).unwrap();
        let range = store.range_of_child(track, g2).unwrap();
        assert_eq!(range.start_time().to_seconds(), 1.0);
        assert_eq!(store.duration(track).unwrap().to_seconds(), 2.0);
    }

    #[test]
    fn empty_track_has_zero_range() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::default());
        let range = store.available_range(track).unwrap();
        assert_eq!(range.duration().value(), 0.0);
        assert_eq!(range.start_time().value(), 0.0);
    }

    #[test]
    fn neighbors_synthesize_gaps_only_around_edge_transitions() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::default());
        let t = dissolve(&mut store, 2.0);
        let a = clip(&mut store, "a", 24.0);
        store.append_child(track, t).unwrap();
        store.append_child(track, a).unwrap();

        let (prev, next) = store.neighbors_of(track, t, NeighborGapPolicy::Never).unwrap();
        assert_eq!(prev, None);
        assert_eq!(next, Some(Neighbor::Node(a)));

        let (prev, next) = store
            .neighbors_of(track, t, NeighborGapPolicy::AroundTransitions)
            .unwrap();
        assert_eq!(prev, Some(Neighbor::SyntheticGap));
        assert_eq!(next.and_then(Neighbor::node), Some(a));

        let (prev, next) = store
            .neighbors_of(track, a, NeighborGapPolicy::AroundTransitions)
            .unwrap();
        assert_eq!(prev, Some(Neighbor::Node(t)));
        assert_eq!(next, None, "clips get no synthetic neighbors");
    }

    #[test]
    fn handles_require_membership() {
        let mut store = NodeStore::new();
        let track = store.create("v1", Track::default());
        let a = clip(&mut store, "a", 24.0);
        assert_eq!(store.handles_of_child(track, a), Err(Error::NotFound));
        assert!(store.handles_of_child(a, a).is_err(), "clip is not a track");
    }
}

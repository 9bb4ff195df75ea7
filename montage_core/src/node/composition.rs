// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Child management and range queries shared by tracks and stacks.
//!
//! Kind-specific layout lives in [`track`](super::track) and
//! [`stack`](super::stack); this module dispatches to them and builds the
//! search operations on top.

use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::id::NodeId;
use super::kind::NodeKind;
use super::store::{NodeStore, mismatch};

impl NodeStore {
    // -- Child management --

    /// Inserts `child` into `parent` at `index`, detaching it from its
    /// previous owner first.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if `parent` is not a track or stack, or
    ///   `child` cannot be composed (a timeline or collection).
    /// - [`Error::IndexOutOfRange`] if `index > child_count(parent)`.
    /// - [`Error::Cycle`] if `child` is `parent` or contains it.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        let size = self.children[parent.idx as usize].len();
        if index > size {
            return Err(Error::IndexOutOfRange { index, size });
        }
        self.attach(parent.idx, child.idx, index);
        Ok(())
    }

    /// Appends `child` to `parent`. See [`insert_child`](Self::insert_child).
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_attach(parent, child)?;
        let size = self.children[parent.idx as usize].len();
        self.attach(parent.idx, child.idx, size);
        Ok(())
    }

    /// Replaces the child at `index` with `child` and returns the node it
    /// displaced, now detached.
    pub fn set_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<NodeId> {
        self.check_attach(parent, child)?;
        let size = self.children[parent.idx as usize].len();
        if index >= size {
            return Err(Error::IndexOutOfRange { index, size });
        }
        let old = self.children[parent.idx as usize][index];
        if old == child.idx {
            return Ok(child);
        }
        self.detach(child.idx);
        // Detaching `child` may have shifted `old` within this parent.
        if let Some((_, pos)) = self.unlink(old) {
            self.link(parent.idx, child.idx, pos);
        }
        Ok(self.id_at(old))
    }

    /// Detaches and returns the child at `index`.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.require_composition(parent)?;
        let id = self.child_at_index(parent, index)?;
        self.unlink(id.idx);
        Ok(id)
    }

    /// Detaches every child and returns them in their former order.
    pub fn clear_children(&mut self, parent: NodeId) -> Result<Vec<NodeId>> {
        self.require_composition(parent)?;
        let removed: Vec<NodeId> = self.children(parent).collect();
        for id in &removed {
            self.unlink(id.idx);
        }
        Ok(removed)
    }

    /// Replaces all children of `parent` with `children`, in order.
    ///
    /// Every new child is checked before anything changes; the previous
    /// children are detached, not destroyed.
    pub fn set_children(&mut self, parent: NodeId, children: &[NodeId]) -> Result<()> {
        self.require_composition(parent)?;
        for &child in children {
            self.check_attach(parent, child)?;
        }
        self.clear_children(parent)?;
        for &child in children {
            let size = self.children[parent.idx as usize].len();
            self.attach(parent.idx, child.idx, size);
        }
        Ok(())
    }

    // -- Child lookup --

    /// Returns the child at `index`.
    pub fn child_at_index(&self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.require_composition(parent)?;
        let list = &self.children[parent.idx as usize];
        list.get(index)
            .map(|&idx| self.id_at(idx))
            .ok_or(Error::IndexOutOfRange {
                index,
                size: list.len(),
            })
    }

    /// Returns the position of `child` among `parent`'s children.
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        self.validate(parent);
        self.validate(child);
        self.children[parent.idx as usize]
            .iter()
            .position(|&c| c == child.idx)
            .ok_or(Error::NotFound)
    }

    /// Returns `true` if `child` is a direct child of `parent`.
    #[must_use]
    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.validate(parent);
        self.owner(child) == Some(parent)
    }

    /// Returns `true` if `parent` owns `node` at any depth.
    #[must_use]
    pub fn is_parent_of(&self, parent: NodeId, node: NodeId) -> bool {
        self.validate(parent);
        self.validate(node);
        parent != node && self.owns_or_is(parent.idx, node.idx)
    }

    // -- Ranges --

    /// Returns the untrimmed range of the child at `index`, in `parent`'s
    /// coordinate space.
    pub fn range_of_child_at_index(&self, parent: NodeId, index: usize) -> Result<TimeRange> {
        let child = self.child_at_index(parent, index)?;
        match self.kind(parent) {
            NodeKind::Track => self.track_range_of_child_at_index(parent, index),
            _ => self.stack_range_of_child(child),
        }
    }

    /// Returns the untrimmed range of `child` in `parent`'s coordinate space.
    pub fn range_of_child(&self, parent: NodeId, child: NodeId) -> Result<TimeRange> {
        self.require_composition(parent)?;
        let index = self.index_of_child(parent, child)?;
        self.range_of_child_at_index(parent, index)
    }

    /// Returns the child's range clipped to `parent`'s source range, or
    /// `None` if the trim removes the child entirely.
    pub fn trimmed_range_of_child_at_index(
        &self,
        parent: NodeId,
        index: usize,
    ) -> Result<Option<TimeRange>> {
        let range = self.range_of_child_at_index(parent, index)?;
        self.trim_child_range(parent, range)
    }

    /// Like [`trimmed_range_of_child_at_index`](Self::trimmed_range_of_child_at_index),
    /// addressed by handle.
    pub fn trimmed_range_of_child(
        &self,
        parent: NodeId,
        child: NodeId,
    ) -> Result<Option<TimeRange>> {
        let range = self.range_of_child(parent, child)?;
        self.trim_child_range(parent, range)
    }

    /// Returns every child with its untrimmed range, in order.
    pub fn range_of_all_children(&self, parent: NodeId) -> Result<Vec<(NodeId, TimeRange)>> {
        match self.kind(parent) {
            NodeKind::Track => self.track_range_of_all_children(parent),
            NodeKind::Stack => self
                .children(parent)
                .map(|child| Ok((child, self.stack_range_of_child(child)?)))
                .collect(),
            other => Err(mismatch("composition", other)),
        }
    }

    // -- Search --

    /// Returns the child whose range contains `time`.
    ///
    /// Tracks return the first match; stacks scan from the top layer down.
    /// Unless `shallow`, a matching track or stack is searched in turn,
    /// which may find nothing.
    pub fn child_at_time(
        &self,
        parent: NodeId,
        time: RationalTime,
        shallow: bool,
    ) -> Result<Option<NodeId>> {
        let is_track = match self.kind(parent) {
            NodeKind::Track => true,
            NodeKind::Stack => false,
            other => return Err(mismatch("composition", other)),
        };
        let count = self.child_count(parent);
        let mut order = 0..count;
        loop {
            let next = if is_track {
                order.next()
            } else {
                order.next_back()
            };
            let Some(index) = next else {
                return Ok(None);
            };
            let range = self.range_of_child_at_index(parent, index)?;
            if !range.contains(time) {
                continue;
            }
            let child = self.id_at(self.children[parent.idx as usize][index]);
            if !shallow && self.kind(child).is_composition() {
                let local = if is_track {
                    time - range.start_time()
                } else {
                    time
                };
                return self.child_at_time(child, local, false);
            }
            return Ok(Some(child));
        }
    }

    /// Returns the children whose ranges intersect `range`.
    pub fn children_in_range(&self, parent: NodeId, range: TimeRange) -> Result<Vec<NodeId>> {
        let epsilon = self.config.epsilon_s;
        let mut out = Vec::new();
        for (child, child_range) in self.range_of_all_children(parent)? {
            if range.intersects(child_range, epsilon) {
                out.push(child);
            }
        }
        Ok(out)
    }

    /// Returns descendants accepted by `filter`, in pre-order.
    ///
    /// With a `range`, only children intersecting it are considered, and the
    /// range is shifted into each nested composition's coordinates before
    /// descending. With `shallow`, nested compositions are not entered.
    pub fn find_children<F>(
        &self,
        parent: NodeId,
        range: Option<TimeRange>,
        shallow: bool,
        filter: F,
    ) -> Result<Vec<NodeId>>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut out = Vec::new();
        self.find_children_into(parent, range, shallow, &filter, &mut out)?;
        Ok(out)
    }

    /// Returns the clips under `parent`. See [`find_children`](Self::find_children).
    pub fn find_clips(
        &self,
        parent: NodeId,
        range: Option<TimeRange>,
        shallow: bool,
    ) -> Result<Vec<NodeId>> {
        self.find_children(parent, range, shallow, |id| {
            self.kind(id) == NodeKind::Clip
        })
    }

    /// Returns `true` if any clip exists below `parent`.
    #[must_use]
    pub fn has_clips(&self, parent: NodeId) -> bool {
        self.descendants(parent)
            .any(|id| self.kind(id) == NodeKind::Clip)
    }

    // -- Internal helpers --

    pub(crate) fn require_composition(&self, id: NodeId) -> Result<()> {
        let kind = self.kind(id);
        if kind.is_composition() {
            Ok(())
        } else {
            Err(mismatch("composition", kind))
        }
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.require_composition(parent)?;
        let kind = self.kind(child);
        if !kind.is_composable() {
            return Err(mismatch("composable", kind));
        }
        self.check_cycle(parent.idx, child.idx)
    }

    fn trim_child_range(&self, parent: NodeId, range: TimeRange) -> Result<Option<TimeRange>> {
        let Some(source) = self.source_range(parent)? else {
            return Ok(Some(range));
        };
        if !source.intersects(range, self.config.epsilon_s) {
            return Ok(None);
        }
        Ok(Some(source.clamped_range(range)))
    }

    fn find_children_into(
        &self,
        parent: NodeId,
        range: Option<TimeRange>,
        shallow: bool,
        filter: &dyn Fn(NodeId) -> bool,
        out: &mut Vec<NodeId>,
    ) -> Result<()> {
        self.require_composition(parent)?;
        let candidates: Vec<(NodeId, TimeRange)> = match range {
            Some(search) => {
                let epsilon = self.config.epsilon_s;
                self.range_of_all_children(parent)?
                    .into_iter()
                    .filter(|(_, r)| search.intersects(*r, epsilon))
                    .collect()
            }
            None => self.range_of_all_children(parent)?,
        };
        for (child, child_range) in candidates {
            if filter(child) {
                out.push(child);
            }
            if !shallow && self.kind(child).is_composition() {
                let local = range.map(|r| {
                    TimeRange::new(r.start_time() - child_range.start_time(), r.duration())
                });
                self.find_children_into(child, local, false, filter, out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use crate::media::MediaReference;
    use crate::node::{Clip, Gap, SerializableCollection, Stack, Track, TrackKind};

    fn rt(v: f64) -> RationalTime {
        RationalTime::new(v, 24.0)
    }

    fn clip(store: &mut NodeStore, name: &str, frames: f64) -> NodeId {
        let media = MediaReference::external("file:///a.mov")
            .with_available_range(TimeRange::from_values(0.0, 1000.0, 24.0));
        store.create(
            name,
            Clip::new(Some(media)).with_source_range(TimeRange::from_values(0.0, frames, 24.0)),
        )
    }

    fn three_clip_track(store: &mut NodeStore) -> (NodeId, [NodeId; 3]) {
        let track = store.create("v1", Track::new(TrackKind::Video));
        let a = clip(store, "a", 24.0);
        let b = clip(store, "b", 24.0);
        let c = clip(store, "c", 24.0);
        for id in [a, b, c] {
            store.append_child(track, id).unwrap();
        }
        (track, [a, b, c])
    }

    #[test]
    fn insert_sets_parent_and_order() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        assert_eq!(store.parent(a), Some(track));
        let d = clip(&mut store, "d", 10.0);
        store.insert_child(track, 1, d).unwrap();
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![a, d, b, c]);
        assert_eq!(store.index_of_child(track, c), Ok(3));
        assert!(store.has_child(track, d), "direct child");
    }

    #[test]
    fn insert_out_of_range_fails() {
        let mut store = NodeStore::new();
        let (track, _) = three_clip_track(&mut store);
        let d = clip(&mut store, "d", 10.0);
        assert_eq!(
            store.insert_child(track, 5, d),
            Err(Error::IndexOutOfRange { index: 5, size: 3 })
        );
        assert_eq!(store.parent(d), None, "left detached");
        assert_eq!(
            store.range_of_child_at_index(track, 3),
            Err(Error::IndexOutOfRange { index: 3, size: 3 })
        );
    }

    #[test]
    fn moving_between_parents_detaches() {
        let mut store = NodeStore::new();
        let (t1, [a, _, _]) = three_clip_track(&mut store);
        let t2 = store.create("v2", Track::default());
        store.append_child(t2, a).unwrap();
        assert_eq!(store.parent(a), Some(t2));
        assert_eq!(store.child_count(t1), 2);
        assert_eq!(store.index_of_child(t1, a), Err(Error::NotFound));
    }

    #[test]
    fn reordering_within_parent() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        store.insert_child(track, 3, a).unwrap();
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![b, c, a]);
        store.insert_child(track, 0, a).unwrap();
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![a, b, c]);
    }

    #[test]
    fn set_child_returns_displaced() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        let d = clip(&mut store, "d", 5.0);
        let old = store.set_child(track, 1, d).unwrap();
        assert_eq!(old, b);
        assert_eq!(store.parent(b), None);
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![a, d, c]);

        // Moving a sibling onto another slot.
        let old = store.set_child(track, 2, a).unwrap();
        assert_eq!(old, c);
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![d, a]);
    }

    #[test]
    fn remove_and_clear() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        assert_eq!(store.remove_child(track, 0), Ok(a));
        assert_eq!(store.parent(a), None);
        assert_eq!(store.clear_children(track), Ok(vec![b, c]));
        assert_eq!(store.child_count(track), 0);
        store.set_children(track, &[c, a]).unwrap();
        let kids: Vec<_> = store.children(track).collect();
        assert_eq!(kids, vec![c, a]);
    }

    #[test]
    fn rejects_cycles_and_wrong_kinds() {
        let mut store = NodeStore::new();
        let outer = store.create("outer", Stack::new());
        let inner = store.create("inner", Track::default());
        store.append_child(outer, inner).unwrap();
        assert_eq!(store.append_child(inner, outer), Err(Error::Cycle));
        assert_eq!(store.append_child(outer, outer), Err(Error::Cycle));

        let tl = store.create_timeline("tl");
        assert_eq!(
            store.append_child(outer, tl),
            Err(Error::TypeMismatch {
                expected: "composable",
                found: NodeKind::Timeline
            })
        );
        let coll = store.create("bin", SerializableCollection);
        assert!(store.append_child(outer, coll).is_err(), "collection");
        let g = store.create("g", Gap::with_duration(rt(1.0)));
        assert_eq!(
            store.append_child(g, inner),
            Err(Error::TypeMismatch {
                expected: "composition",
                found: NodeKind::Gap
            })
        );
        assert!(store.is_parent_of(outer, inner), "direct");
        assert!(!store.is_parent_of(inner, outer), "inverse");
    }

    #[test]
    fn trimmed_child_range_respects_parent_trim() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        store
            .set_source_range(track, Some(TimeRange::from_values(30.0, 20.0, 24.0)))
            .unwrap();
        assert_eq!(store.trimmed_range_of_child(track, a), Ok(None), "a is trimmed away");
        assert_eq!(
            store.trimmed_range_of_child(track, b),
            Ok(Some(TimeRange::from_values(30.0, 18.0, 24.0)))
        );
        assert_eq!(
            store.trimmed_range_of_child_at_index(track, 2),
            Ok(Some(TimeRange::from_values(48.0, 2.0, 24.0)))
        );
        let _ = c;
    }

    #[test]
    fn child_at_time_in_track() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        assert_eq!(store.child_at_time(track, rt(0.0), true), Ok(Some(a)));
        assert_eq!(store.child_at_time(track, rt(24.0), true), Ok(Some(b)));
        assert_eq!(store.child_at_time(track, rt(71.0), true), Ok(Some(c)));
        assert_eq!(store.child_at_time(track, rt(72.0), true), Ok(None));
    }

    #[test]
    fn child_at_time_descends() {
        let mut store = NodeStore::new();
        let stack = store.create("s", Stack::new());
        let (lower, [l0, _, _]) = three_clip_track(&mut store);
        let upper = store.create("v2", Track::default());
        let gap = store.create("g", Gap::with_duration(rt(30.0)));
        let u = clip(&mut store, "u", 10.0);
        store.append_child(upper, gap).unwrap();
        store.append_child(upper, u).unwrap();
        store.append_child(stack, lower).unwrap();
        store.append_child(stack, upper).unwrap();

        assert_eq!(store.child_at_time(stack, rt(5.0), true), Ok(Some(upper)), "top layer");
        assert_eq!(store.child_at_time(stack, rt(35.0), false), Ok(Some(u)));
        assert_eq!(store.child_at_time(stack, rt(5.0), false), Ok(Some(gap)));
        assert_eq!(store.child_at_time(stack, rt(50.0), false), Ok(None), "beyond upper");
        let _ = l0;
    }

    #[test]
    fn children_in_range_skips_touching_edges() {
        let mut store = NodeStore::new();
        let (track, [a, b, c]) = three_clip_track(&mut store);
        let hits = store
            .children_in_range(track, TimeRange::from_values(24.0, 24.0, 24.0))
            .unwrap();
        assert_eq!(hits, vec![b]);
        let hits = store
            .children_in_range(track, TimeRange::from_values(20.0, 30.0, 24.0))
            .unwrap();
        assert_eq!(hits, vec![a, b, c]);
    }

    #[test]
    fn find_clips_shifts_range_into_nested_tracks() {
        let mut store = NodeStore::new();
        let outer = store.create("outer", Track::default());
        let lead = clip(&mut store, "lead", 48.0);
        let (inner, [a, b, c]) = three_clip_track(&mut store);
        store.append_child(outer, lead).unwrap();
        store.append_child(outer, inner).unwrap();

        let all = store.find_clips(outer, None, false).unwrap();
        assert_eq!(all, vec![lead, a, b, c]);
        let shallow = store.find_clips(outer, None, true).unwrap();
        assert_eq!(shallow, vec![lead]);

        // Frames 72..96 of the outer track are frames 24..48 of the inner one.
        let hits = store
            .find_clips(outer, Some(TimeRange::from_values(72.0, 24.0, 24.0)), false)
            .unwrap();
        assert_eq!(hits, vec![b]);
        assert!(store.has_clips(outer), "has clips");
        let empty = store.create("e", Stack::new());
        assert!(!store.has_clips(empty), "empty");
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records. [`decode`] reads them back
//! as an iterator of [`RecordedEvent`].
//!
//! Handles are stored as their raw index and generation, so decoded handles
//! are only meaningful against the store that produced them.

use montage_core::node::{NodeId, NodeKind};
use montage_core::time::RationalTime;
use montage_core::trace::{
    ChildAttachedEvent, ChildDetachedEvent, EditSummary, NodeCreatedEvent, NodeDestroyedEvent,
    SubtreeClonedEvent, TimeWalkStepEvent, TraceSink, WalkDirection,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_NODE_CREATED: u8 = 1;
const TAG_NODE_DESTROYED: u8 = 2;
const TAG_CHILD_ATTACHED: u8 = 3;
const TAG_CHILD_DETACHED: u8 = 4;
const TAG_SUBTREE_CLONED: u8 = 5;
const TAG_EDIT_SUMMARY: u8 = 6;
const TAG_TIME_WALK_STEP: u8 = 7;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_node(&mut self, id: NodeId) {
        self.write_u32(id.index());
        self.write_u32(id.generation());
    }

    fn write_kind(&mut self, kind: NodeKind) {
        self.write_u8(match kind {
            NodeKind::Clip => 0,
            NodeKind::Gap => 1,
            NodeKind::Transition => 2,
            NodeKind::Track => 3,
            NodeKind::Stack => 4,
            NodeKind::Timeline => 5,
            NodeKind::SerializableCollection => 6,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        self.write_u8(TAG_NODE_CREATED);
        self.write_node(e.node);
        self.write_kind(e.kind);
    }

    fn on_node_destroyed(&mut self, e: &NodeDestroyedEvent) {
        self.write_u8(TAG_NODE_DESTROYED);
        self.write_node(e.node);
        self.write_kind(e.kind);
    }

    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        self.write_u8(TAG_CHILD_ATTACHED);
        self.write_node(e.owner);
        self.write_node(e.child);
        self.write_u32(e.index);
    }

    fn on_child_detached(&mut self, e: &ChildDetachedEvent) {
        self.write_u8(TAG_CHILD_DETACHED);
        self.write_node(e.owner);
        self.write_node(e.child);
        self.write_u32(e.index);
    }

    fn on_subtree_cloned(&mut self, e: &SubtreeClonedEvent) {
        self.write_u8(TAG_SUBTREE_CLONED);
        self.write_node(e.source);
        self.write_node(e.clone);
        self.write_u32(e.node_count);
    }

    fn on_edit_summary(&mut self, s: &EditSummary) {
        self.write_u8(TAG_EDIT_SUMMARY);
        self.write_u32(s.created);
        self.write_u32(s.destroyed);
        self.write_u32(s.attached);
        self.write_u32(s.detached);
        self.write_u32(s.cloned);
    }

    fn on_time_walk_step(&mut self, e: &TimeWalkStepEvent) {
        self.write_u8(TAG_TIME_WALK_STEP);
        self.write_node(e.node);
        self.write_u8(match e.direction {
            WalkDirection::Up => 0,
            WalkDirection::Down => 1,
        });
        self.write_f64(e.time.value());
        self.write_f64(e.time.rate());
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedEvent {
    /// A [`NodeCreatedEvent`].
    NodeCreated(NodeCreatedEvent),
    /// A [`NodeDestroyedEvent`].
    NodeDestroyed(NodeDestroyedEvent),
    /// A [`ChildAttachedEvent`].
    ChildAttached(ChildAttachedEvent),
    /// A [`ChildDetachedEvent`].
    ChildDetached(ChildDetachedEvent),
    /// A [`SubtreeClonedEvent`].
    SubtreeCloned(SubtreeClonedEvent),
    /// An [`EditSummary`].
    EditSummary(EditSummary),
    /// A [`TimeWalkStepEvent`].
    TimeWalkStep(TimeWalkStepEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
///
/// Iteration stops at the first truncated record or unknown tag.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.take().map(f64::from_le_bytes)
    }

    fn read_node(&mut self) -> Option<NodeId> {
        let idx = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(NodeId::from_raw_parts(idx, generation))
    }

    fn read_kind(&mut self) -> Option<NodeKind> {
        Some(match self.read_u8()? {
            0 => NodeKind::Clip,
            1 => NodeKind::Gap,
            2 => NodeKind::Transition,
            3 => NodeKind::Track,
            4 => NodeKind::Stack,
            5 => NodeKind::Timeline,
            6 => NodeKind::SerializableCollection,
            _ => return None,
        })
    }

    fn decode_node_created(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeCreated(NodeCreatedEvent {
            node: self.read_node()?,
            kind: self.read_kind()?,
        }))
    }

    fn decode_node_destroyed(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::NodeDestroyed(NodeDestroyedEvent {
            node: self.read_node()?,
            kind: self.read_kind()?,
        }))
    }

    fn decode_child_attached(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChildAttached(ChildAttachedEvent {
            owner: self.read_node()?,
            child: self.read_node()?,
            index: self.read_u32()?,
        }))
    }

    fn decode_child_detached(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ChildDetached(ChildDetachedEvent {
            owner: self.read_node()?,
            child: self.read_node()?,
            index: self.read_u32()?,
        }))
    }

    fn decode_subtree_cloned(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::SubtreeCloned(SubtreeClonedEvent {
            source: self.read_node()?,
            clone: self.read_node()?,
            node_count: self.read_u32()?,
        }))
    }

    fn decode_edit_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EditSummary(EditSummary {
            created: self.read_u32()?,
            destroyed: self.read_u32()?,
            attached: self.read_u32()?,
            detached: self.read_u32()?,
            cloned: self.read_u32()?,
        }))
    }

    fn decode_time_walk_step(&mut self) -> Option<RecordedEvent> {
        let node = self.read_node()?;
        let direction = match self.read_u8()? {
            0 => WalkDirection::Up,
            _ => WalkDirection::Down,
        };
        let value = self.read_f64()?;
        let rate = self.read_f64()?;
        Some(RecordedEvent::TimeWalkStep(TimeWalkStepEvent {
            node,
            direction,
            time: RationalTime::new(value, rate),
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_NODE_CREATED => self.decode_node_created(),
            TAG_NODE_DESTROYED => self.decode_node_destroyed(),
            TAG_CHILD_ATTACHED => self.decode_child_attached(),
            TAG_CHILD_DETACHED => self.decode_child_detached(),
            TAG_SUBTREE_CLONED => self.decode_subtree_cloned(),
            TAG_EDIT_SUMMARY => self.decode_edit_summary(),
            TAG_TIME_WALK_STEP => self.decode_time_walk_step(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::node::{Clip, Gap, NodeStore, StoreConfig, Track};
    use montage_core::trace::Tracer;

    fn id(idx: u32, generation: u32) -> NodeId {
        NodeId::from_raw_parts(idx, generation)
    }

    #[test]
    fn round_trip_attach_and_detach() {
        let mut rec = RecorderSink::new();
        let attached = ChildAttachedEvent {
            owner: id(0, 2),
            child: id(5, 1),
            index: 3,
        };
        let detached = ChildDetachedEvent {
            owner: id(0, 2),
            child: id(5, 1),
            index: 3,
        };
        rec.on_child_attached(&attached);
        rec.on_child_detached(&detached);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(
            events,
            [
                RecordedEvent::ChildAttached(attached),
                RecordedEvent::ChildDetached(detached),
            ]
        );
    }

    #[test]
    fn round_trip_time_walk_step() {
        let mut rec = RecorderSink::new();
        let step = TimeWalkStepEvent {
            node: id(4, 0),
            direction: WalkDirection::Down,
            time: RationalTime::new(12.5, 23.976),
        };
        rec.on_time_walk_step(&step);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        match &events[..] {
            [RecordedEvent::TimeWalkStep(e)] => {
                assert_eq!(e.node, step.node);
                assert_eq!(e.direction, WalkDirection::Down);
                assert!(e.time.strictly_equal(step.time), "{:?}", e.time);
            }
            other => panic!("expected one TimeWalkStep, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_store_journal() {
        let mut store = NodeStore::with_config(StoreConfig::RECORDING);
        let track = store.create("v1", Track::default());
        let clip = store.create("a", Clip::default());
        let gap = store.create("g", Gap::default());
        store.set_children(track, &[clip, gap]).unwrap();
        let copy = store.clone_subtree(track);
        store.destroy(gap);
        let journal = store.take_edits();

        let mut rec = RecorderSink::new();
        Tracer::new(&mut rec).edits(&journal);

        let events: Vec<_> = decode(rec.as_bytes()).collect();
        assert_eq!(events.len(), journal.len() + 1, "journal plus summary");
        assert_eq!(
            events[0],
            RecordedEvent::NodeCreated(NodeCreatedEvent {
                node: track,
                kind: NodeKind::Track,
            })
        );
        assert!(
            events.iter().any(|e| matches!(
                e,
                RecordedEvent::SubtreeCloned(c) if c.source == track && c.clone == copy
            )),
            "clone recorded"
        );
        match events.last() {
            Some(RecordedEvent::EditSummary(s)) => {
                assert_eq!(*s, EditSummary::from_edits(&journal));
                assert_eq!(s.cloned, 1);
                assert_eq!(s.destroyed, 1);
            }
            other => panic!("expected trailing EditSummary, got {other:?}"),
        }
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_subtree_cloned(&SubtreeClonedEvent {
            source: id(1, 0),
            clone: id(2, 0),
            node_count: 4,
        });
        rec.on_subtree_cloned(&SubtreeClonedEvent {
            source: id(1, 0),
            clone: id(9, 0),
            node_count: 4,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1, "partial second record dropped");
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty(), "no records");
    }
}

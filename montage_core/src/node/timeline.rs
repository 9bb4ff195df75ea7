// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timeline roots.
//!
//! A timeline owns exactly one stack, its tracks. Every query here forwards
//! to that stack.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::error::{Error, Result};
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::id::NodeId;
use super::kind::{NodeData, NodeKind, TrackKind};
use super::store::{NodeStore, mismatch};

impl NodeStore {
    /// Returns the timeline's tracks stack.
    pub fn tracks(&self, timeline: NodeId) -> Result<NodeId> {
        self.timeline(timeline)?;
        // A timeline always owns exactly one stack; see `detach`.
        self.children(timeline).next().ok_or(Error::NotFound)
    }

    /// Replaces the tracks stack and returns the previous one, detached.
    ///
    /// Fails with [`Error::TypeMismatch`] if `stack` is not a stack, and
    /// [`Error::Cycle`] if it is the timeline itself or contains it.
    pub fn set_tracks(&mut self, timeline: NodeId, stack: NodeId) -> Result<NodeId> {
        let old = self.tracks(timeline)?;
        let kind = self.kind(stack);
        if kind != NodeKind::Stack {
            return Err(mismatch("stack", kind));
        }
        if old == stack {
            return Ok(old);
        }
        self.check_cycle(timeline.idx, stack.idx)?;
        self.detach(stack.idx);
        // `detach` may have replaced `old` if `stack` came from this timeline,
        // which `old == stack` already rules out.
        self.unlink(old.idx);
        self.link(timeline.idx, stack.idx, 0);
        Ok(old)
    }

    /// Returns the display start time.
    pub fn global_start_time(&self, timeline: NodeId) -> Result<Option<RationalTime>> {
        Ok(self.timeline(timeline)?.global_start_time)
    }

    /// Sets or clears the display start time.
    pub fn set_global_start_time(
        &mut self,
        timeline: NodeId,
        time: Option<RationalTime>,
    ) -> Result<()> {
        self.timeline_mut(timeline)?.global_start_time = time;
        Ok(())
    }

    /// Returns the duration of the tracks stack.
    pub fn timeline_duration(&self, timeline: NodeId) -> Result<RationalTime> {
        self.duration(self.tracks(timeline)?)
    }

    /// Returns the available range of the tracks stack.
    pub fn timeline_available_range(&self, timeline: NodeId) -> Result<TimeRange> {
        self.available_range(self.tracks(timeline)?)
    }

    /// Returns the video tracks directly under the tracks stack.
    pub fn video_tracks(&self, timeline: NodeId) -> Result<Vec<NodeId>> {
        self.tracks_of_kind(timeline, TrackKind::Video)
    }

    /// Returns the audio tracks directly under the tracks stack.
    pub fn audio_tracks(&self, timeline: NodeId) -> Result<Vec<NodeId>> {
        self.tracks_of_kind(timeline, TrackKind::Audio)
    }

    /// Finds clips under the tracks stack. See [`find_clips`](Self::find_clips).
    pub fn timeline_find_clips(
        &self,
        timeline: NodeId,
        range: Option<TimeRange>,
        shallow: bool,
    ) -> Result<Vec<NodeId>> {
        self.find_clips(self.tracks(timeline)?, range, shallow)
    }

    /// Finds nodes under the tracks stack. See [`find_children`](Self::find_children).
    pub fn timeline_find_children<F>(
        &self,
        timeline: NodeId,
        range: Option<TimeRange>,
        shallow: bool,
        filter: F,
    ) -> Result<Vec<NodeId>>
    where
        F: Fn(NodeId) -> bool,
    {
        self.find_children(self.tracks(timeline)?, range, shallow, filter)
    }

    /// Returns the union of all clip image bounds in the timeline.
    pub fn timeline_image_bounds(&self, timeline: NodeId) -> Result<Option<Rect>> {
        self.available_image_bounds(self.tracks(timeline)?)
    }

    fn tracks_of_kind(&self, timeline: NodeId, kind: TrackKind) -> Result<Vec<NodeId>> {
        let tracks = self.tracks(timeline)?;
        Ok(self
            .children(tracks)
            .filter(|&child| matches!(self.data(child), NodeData::Track(t) if t.kind == kind))
            .collect())
    }
}

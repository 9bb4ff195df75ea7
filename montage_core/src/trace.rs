// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for tree edits.
//!
//! This module provides a [`TraceSink`] trait with per-event methods. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! The [`NodeStore`](crate::node::NodeStore) journals structural edits as
//! [`EditEvent`]s when [`StoreConfig::record_edits`](crate::node::StoreConfig)
//! is set. Drain them with [`NodeStore::take_edits`](crate::node::NodeStore::take_edits)
//! and hand the batch to [`Tracer::edits`].
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`TimeWalkStepEvent`], reported
//!   per level by
//!   [`NodeStore::transformed_time_traced`](crate::node::NodeStore::transformed_time_traced).

use crate::node::{NodeId, NodeKind};
#[cfg(feature = "trace-rich")]
use crate::time::RationalTime;

// -- Enums --

/// Direction of a coordinate-walk step.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalkDirection {
    /// From a node into its parent's coordinates.
    Up,
    /// From a parent into a child's coordinates.
    Down,
}

// -- Event structs --

/// Emitted when a node slot is allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeCreatedEvent {
    /// The new node.
    pub node: NodeId,
    /// Its kind.
    pub kind: NodeKind,
}

/// Emitted once per node freed by [`NodeStore::destroy`](crate::node::NodeStore::destroy).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeDestroyedEvent {
    /// The freed handle, now stale.
    pub node: NodeId,
    /// Its kind at the time it was freed.
    pub kind: NodeKind,
}

/// Emitted when a node is placed in a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildAttachedEvent {
    /// The container.
    pub owner: NodeId,
    /// The attached node.
    pub child: NodeId,
    /// Position in the container after insertion.
    pub index: u32,
}

/// Emitted when a node leaves a container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildDetachedEvent {
    /// The former container.
    pub owner: NodeId,
    /// The detached node.
    pub child: NodeId,
    /// Position it occupied.
    pub index: u32,
}

/// Emitted after a subtree is deep-copied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubtreeClonedEvent {
    /// Root of the original subtree.
    pub source: NodeId,
    /// Root of the copy.
    pub clone: NodeId,
    /// Number of nodes copied, including the root.
    pub node_count: u32,
}

/// One level of a cross-node time transform.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWalkStepEvent {
    /// The node whose coordinates were entered or left.
    pub node: NodeId,
    /// Which way the walk moved.
    pub direction: WalkDirection,
    /// The time after the step.
    pub time: RationalTime,
}

/// A journaled structural edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditEvent {
    /// See [`NodeCreatedEvent`].
    Created(NodeCreatedEvent),
    /// See [`NodeDestroyedEvent`].
    Destroyed(NodeDestroyedEvent),
    /// See [`ChildAttachedEvent`].
    Attached(ChildAttachedEvent),
    /// See [`ChildDetachedEvent`].
    Detached(ChildDetachedEvent),
    /// See [`SubtreeClonedEvent`].
    Cloned(SubtreeClonedEvent),
}

/// Counts of each edit kind in a batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EditSummary {
    /// Nodes allocated.
    pub created: u32,
    /// Nodes freed.
    pub destroyed: u32,
    /// Attach operations.
    pub attached: u32,
    /// Detach operations.
    pub detached: u32,
    /// Subtree copies.
    pub cloned: u32,
}

impl EditSummary {
    /// Tallies a batch of edits.
    #[must_use]
    pub fn from_edits(edits: &[EditEvent]) -> Self {
        let mut summary = Self::default();
        for edit in edits {
            let slot = match edit {
                EditEvent::Created(_) => &mut summary.created,
                EditEvent::Destroyed(_) => &mut summary.destroyed,
                EditEvent::Attached(_) => &mut summary.attached,
                EditEvent::Detached(_) => &mut summary.detached,
                EditEvent::Cloned(_) => &mut summary.cloned,
            };
            *slot = slot.saturating_add(1);
        }
        summary
    }

    /// Returns `true` if the batch changed no ownership links.
    #[must_use]
    pub const fn is_topology_unchanged(&self) -> bool {
        self.attached == 0 && self.detached == 0 && self.destroyed == 0
    }
}

// -- TraceSink trait --

/// Receives trace events from the node store.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when a node is created.
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        _ = e;
    }

    /// Called when a node is destroyed.
    fn on_node_destroyed(&mut self, e: &NodeDestroyedEvent) {
        _ = e;
    }

    /// Called when a node is attached to a container.
    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        _ = e;
    }

    /// Called when a node is detached from a container.
    fn on_child_detached(&mut self, e: &ChildDetachedEvent) {
        _ = e;
    }

    /// Called when a subtree is deep-copied.
    fn on_subtree_cloned(&mut self, e: &SubtreeClonedEvent) {
        _ = e;
    }

    /// Called once after a batch of edits has been dispatched.
    fn on_edit_summary(&mut self, s: &EditSummary) {
        _ = s;
    }

    /// Called per level of a time transform (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    fn on_time_walk_step(&mut self, e: &TimeWalkStepEvent) {
        _ = e;
    }
}

// -- NoopSink --

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// -- Tracer wrapper --

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Dispatches each edit to its sink method, then an [`EditSummary`].
    ///
    /// Empty batches are skipped entirely.
    #[inline]
    pub fn edits(&mut self, edits: &[EditEvent]) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            if edits.is_empty() {
                return;
            }
            for edit in edits {
                match edit {
                    EditEvent::Created(e) => s.on_node_created(e),
                    EditEvent::Destroyed(e) => s.on_node_destroyed(e),
                    EditEvent::Attached(e) => s.on_child_attached(e),
                    EditEvent::Detached(e) => s.on_child_detached(e),
                    EditEvent::Cloned(e) => s.on_subtree_cloned(e),
                }
            }
            s.on_edit_summary(&EditSummary::from_edits(edits));
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = edits;
        }
    }

    /// Emits a [`NodeCreatedEvent`].
    #[inline]
    pub fn node_created(&mut self, e: &NodeCreatedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_node_created(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubtreeClonedEvent`].
    #[inline]
    pub fn subtree_cloned(&mut self, e: &SubtreeClonedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_subtree_cloned(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`TimeWalkStepEvent`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn time_walk_step(&mut self, e: &TimeWalkStepEvent) {
        if let Some(s) = &mut self.sink {
            s.on_time_walk_step(e);
        }
    }
}

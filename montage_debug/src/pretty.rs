// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Handles are
//! printed as `#index.generation`.

use std::io::Write;

use montage_core::node::NodeId;
use montage_core::trace::{
    ChildAttachedEvent, ChildDetachedEvent, EditSummary, NodeCreatedEvent, NodeDestroyedEvent,
    SubtreeClonedEvent, TimeWalkStepEvent, TraceSink, WalkDirection,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

struct Handle(NodeId);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}.{}", self.0.index(), self.0.generation())
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_node_created(&mut self, e: &NodeCreatedEvent) {
        let _ = writeln!(self.writer, "[create] {} {}", e.kind, Handle(e.node));
    }

    fn on_node_destroyed(&mut self, e: &NodeDestroyedEvent) {
        let _ = writeln!(self.writer, "[destroy] {} {}", e.kind, Handle(e.node));
    }

    fn on_child_attached(&mut self, e: &ChildAttachedEvent) {
        let _ = writeln!(
            self.writer,
            "[attach] {} -> {} at {}",
            Handle(e.child),
            Handle(e.owner),
            e.index,
        );
    }

    fn on_child_detached(&mut self, e: &ChildDetachedEvent) {
        let _ = writeln!(
            self.writer,
            "[detach] {} <- {} from {}",
            Handle(e.child),
            Handle(e.owner),
            e.index,
        );
    }

    fn on_subtree_cloned(&mut self, e: &SubtreeClonedEvent) {
        let _ = writeln!(
            self.writer,
            "[clone] {} => {} nodes={}",
            Handle(e.source),
            Handle(e.clone),
            e.node_count,
        );
    }

    fn on_edit_summary(&mut self, s: &EditSummary) {
        let _ = writeln!(
            self.writer,
            "[summary] created={} destroyed={} attached={} detached={} cloned={}",
            s.created, s.destroyed, s.attached, s.detached, s.cloned,
        );
    }

    fn on_time_walk_step(&mut self, e: &TimeWalkStepEvent) {
        let direction = match e.direction {
            WalkDirection::Up => "up",
            WalkDirection::Down => "down",
        };
        let _ = writeln!(
            self.writer,
            "[walk] {direction} {} t={}@{}",
            Handle(e.node),
            e.time.value(),
            e.time.rate(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_core::node::{NodeKind, NodeStore, StoreConfig, Track};
    use montage_core::trace::Tracer;

    fn output(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn pretty_print_created() {
        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_node_created(&NodeCreatedEvent {
            node: NodeId::from_raw_parts(3, 1),
            kind: NodeKind::Clip,
        });
        let output = output(sink);
        assert!(output.contains("[create]"), "got: {output}");
        assert!(output.contains("#3.1"), "got: {output}");
    }

    #[test]
    fn pretty_print_store_edits() {
        let mut store = NodeStore::with_config(StoreConfig::RECORDING);
        let track = store.create("v1", Track::default());
        let stack = store.create("s", montage_core::node::Stack::new());
        store.append_child(stack, track).unwrap();

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        Tracer::new(&mut sink).edits(&store.take_edits());
        let output = output(sink);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4, "two creates, one attach, one summary: {output}");
        assert!(lines[2].starts_with("[attach]"), "got: {output}");
        assert!(
            lines[3].contains("created=2") && lines[3].contains("attached=1"),
            "got: {output}"
        );
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter for recorded events.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them as a JSON array, one object per event, with an `"event"`
//! field naming the kind.

use std::io::{self, Write};

use serde_json::{Value, json};

use montage_core::node::NodeId;
use montage_core::trace::WalkDirection;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a pretty-printed JSON array.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| event_to_json(&e)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Converts one decoded event to its JSON object.
#[must_use]
pub fn event_to_json(recorded: &RecordedEvent) -> Value {
    match recorded {
        RecordedEvent::NodeCreated(e) => json!({
            "event": "NodeCreated",
            "node": handle(e.node),
            "kind": e.kind.to_string(),
        }),
        RecordedEvent::NodeDestroyed(e) => json!({
            "event": "NodeDestroyed",
            "node": handle(e.node),
            "kind": e.kind.to_string(),
        }),
        RecordedEvent::ChildAttached(e) => json!({
            "event": "ChildAttached",
            "owner": handle(e.owner),
            "child": handle(e.child),
            "index": e.index,
        }),
        RecordedEvent::ChildDetached(e) => json!({
            "event": "ChildDetached",
            "owner": handle(e.owner),
            "child": handle(e.child),
            "index": e.index,
        }),
        RecordedEvent::SubtreeCloned(e) => json!({
            "event": "SubtreeCloned",
            "source": handle(e.source),
            "clone": handle(e.clone),
            "node_count": e.node_count,
        }),
        RecordedEvent::EditSummary(s) => json!({
            "event": "EditSummary",
            "created": s.created,
            "destroyed": s.destroyed,
            "attached": s.attached,
            "detached": s.detached,
            "cloned": s.cloned,
        }),
        RecordedEvent::TimeWalkStep(e) => {
            let direction = match e.direction {
                WalkDirection::Up => "up",
                WalkDirection::Down => "down",
            };
            json!({
                "event": "TimeWalkStep",
                "node": handle(e.node),
                "direction": direction,
                "value": e.time.value(),
                "rate": e.time.rate(),
            })
        }
    }
}

fn handle(id: NodeId) -> Value {
    json!({ "index": id.index(), "generation": id.generation() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use montage_core::node::{NodeStore, Stack, StoreConfig, Track};
    use montage_core::trace::Tracer;

    #[test]
    fn export_produces_valid_json() {
        let mut store = NodeStore::with_config(StoreConfig::RECORDING);
        let stack = store.create("s", Stack::new());
        let track = store.create("v1", Track::default());
        store.append_child(stack, track).unwrap();

        let mut rec = RecorderSink::new();
        Tracer::new(&mut rec).edits(&store.take_edits());

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[0]["event"], "NodeCreated");
        assert_eq!(parsed[0]["kind"], "Stack");
        assert_eq!(parsed[1]["kind"], "Track");
        assert_eq!(parsed[2]["event"], "ChildAttached");
        assert_eq!(parsed[2]["child"]["index"], track.index());
        assert_eq!(parsed[3]["event"], "EditSummary");
        assert_eq!(parsed[3]["created"], 2);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty(), "no events");
    }
}

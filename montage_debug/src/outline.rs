// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree dumps of a store subtree.
//!
//! Each node is shown with its kind, name and range. Nodes inside a track or
//! stack show their range in the parent; every other node shows its trimmed
//! range when one can be computed.

use std::io::{self, Write};

use serde_json::{Map, Value, json};

use montage_core::node::{NodeId, NodeStore};
use montage_core::range::TimeRange;

/// Writes an indented outline of `root` and everything it owns.
pub fn write_outline(store: &NodeStore, root: NodeId, writer: &mut dyn Write) -> io::Result<()> {
    let mut pending = vec![(root, 0_usize)];
    while let Some((id, depth)) = pending.pop() {
        write!(
            writer,
            "{:indent$}{} {:?}",
            "",
            store.kind(id),
            store.name(id),
            indent = depth * 2
        )?;
        if let Some(range) = shown_range(store, id) {
            let (start, duration) = (range.start_time(), range.duration());
            write!(
                writer,
                " [{}+{}@{}]",
                start.value(),
                duration.value(),
                duration.rate()
            )?;
        }
        if !store.enabled(id) {
            write!(writer, " (disabled)")?;
        }
        writeln!(writer)?;
        let children: Vec<NodeId> = store.children(id).collect();
        pending.extend(children.into_iter().rev().map(|c| (c, depth + 1)));
    }
    Ok(())
}

/// Returns `root` and everything it owns as nested JSON objects.
#[must_use]
pub fn to_json(store: &NodeStore, root: NodeId) -> Value {
    let mut node = Map::new();
    node.insert("name".into(), store.name(root).into());
    node.insert("kind".into(), store.kind(root).to_string().into());
    node.insert("schema".into(), store.schema(root).to_string().into());
    node.insert("enabled".into(), store.enabled(root).into());
    let range = shown_range(store, root).map_or(Value::Null, |r| {
        json!({
            "start": r.start_time().value(),
            "duration": r.duration().value(),
            "rate": r.duration().rate(),
        })
    });
    node.insert("range".into(), range);
    if !store.metadata(root).is_empty() {
        node.insert("metadata".into(), Value::Object(store.metadata(root).clone()));
    }
    let children: Vec<Value> = store.children(root).map(|c| to_json(store, c)).collect();
    node.insert("children".into(), children.into());
    Value::Object(node)
}

fn shown_range(store: &NodeStore, id: NodeId) -> Option<TimeRange> {
    if store.parent(id).is_some() {
        store.range_in_parent(id).ok()
    } else {
        store.trimmed_range(id).ok()
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Filtered copies of composition trees.

use alloc::vec::Vec;

use crate::error::Result;
use crate::node::{NodeId, NodeKind, NodeStore};

/// What a filter decides for one composable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterAction {
    /// Keep the node as it is.
    Keep,
    /// Remove the node and its subtree.
    Prune,
    /// Put these detached nodes in the node's place, in order. An empty list
    /// prunes.
    Replace(Vec<NodeId>),
}

/// Returns a filtered copy of `root`, or `None` if the root itself is pruned.
///
/// `filter` sees every composable in the copy, parents before their
/// children, and may edit or replace it. Nodes whose kind is in `prune` are
/// removed without consulting `filter`. A timeline's own tracks stack is
/// never offered; its tracks are. Collection entries that are not
/// composable are kept and searched. Replacement nodes are not filtered
/// again but their children are.
///
/// Replacing the root keeps only the first replacement.
///
/// # Errors
///
/// Any error from placing a replacement, such as a timeline returned for a
/// track's child. Everything the call created is destroyed on error.
pub fn filtered_composition<F>(
    store: &mut NodeStore,
    root: NodeId,
    prune: &[NodeKind],
    mut filter: F,
) -> Result<Option<NodeId>>
where
    F: FnMut(&mut NodeStore, NodeId) -> FilterAction,
{
    let mut filter = |store: &mut NodeStore, _: Option<NodeId>, id: NodeId, _: Option<NodeId>| {
        filter(store, id)
    };
    filter_tree(store, root, prune, &mut filter, true)
}

/// Like [`filtered_composition`], but `filter` also sees the composable
/// siblings on either side of each node, as they were in the copy before
/// any of them was filtered. The root is not offered to `filter`.
pub fn filtered_with_sequence_context<F>(
    store: &mut NodeStore,
    root: NodeId,
    prune: &[NodeKind],
    mut filter: F,
) -> Result<Option<NodeId>>
where
    F: FnMut(&mut NodeStore, Option<NodeId>, NodeId, Option<NodeId>) -> FilterAction,
{
    filter_tree(store, root, prune, &mut filter, false)
}

/// Keeps everything.
pub fn keep_all(_: &mut NodeStore, _: NodeId) -> FilterAction {
    FilterAction::Keep
}

/// Prunes everything.
pub fn prune_all(_: &mut NodeStore, _: NodeId) -> FilterAction {
    FilterAction::Prune
}

/// Keeps only nodes of the given kinds.
pub fn keep_kinds(kinds: &[NodeKind]) -> impl FnMut(&mut NodeStore, NodeId) -> FilterAction + '_ {
    move |store, id| {
        if kinds.contains(&store.kind(id)) {
            FilterAction::Keep
        } else {
            FilterAction::Prune
        }
    }
}

/// Keeps only nodes whose name satisfies `predicate`.
pub fn keep_named<P>(mut predicate: P) -> impl FnMut(&mut NodeStore, NodeId) -> FilterAction
where
    P: FnMut(&str) -> bool,
{
    move |store, id| {
        if predicate(store.name(id)) {
            FilterAction::Keep
        } else {
            FilterAction::Prune
        }
    }
}

type ContextFilter<'a> =
    dyn FnMut(&mut NodeStore, Option<NodeId>, NodeId, Option<NodeId>) -> FilterAction + 'a;

fn filter_tree(
    store: &mut NodeStore,
    root: NodeId,
    prune: &[NodeKind],
    filter: &mut ContextFilter<'_>,
    filter_root: bool,
) -> Result<Option<NodeId>> {
    if prune.contains(&store.kind(root)) {
        return Ok(None);
    }
    let copy = store.clone_subtree(root);
    let mut result = copy;
    if filter_root && store.kind(copy).is_composable() {
        match filter(store, None, copy, None) {
            FilterAction::Keep => {}
            FilterAction::Prune => {
                store.destroy(copy);
                return Ok(None);
            }
            FilterAction::Replace(nodes) => {
                let Some((&first, rest)) = nodes.split_first() else {
                    store.destroy(copy);
                    return Ok(None);
                };
                store.detach_node(first);
                for &extra in rest {
                    if extra != first && extra != copy {
                        store.destroy(extra);
                    }
                }
                if first != copy {
                    store.destroy(copy);
                }
                result = first;
            }
        }
    }
    if let Err(e) = walk(store, result, prune, filter) {
        store.destroy(result);
        return Err(e);
    }
    Ok(Some(result))
}

fn walk(
    store: &mut NodeStore,
    node: NodeId,
    prune: &[NodeKind],
    filter: &mut ContextFilter<'_>,
) -> Result<()> {
    match store.kind(node) {
        NodeKind::Timeline => {
            let tracks = store.tracks(node)?;
            filter_children(store, tracks, prune, filter)
        }
        NodeKind::Track | NodeKind::Stack | NodeKind::SerializableCollection => {
            filter_children(store, node, prune, filter)
        }
        _ => Ok(()),
    }
}

/// Filters the children of `parent` against their original siblings, then
/// descends into whatever children remain.
fn filter_children(
    store: &mut NodeStore,
    parent: NodeId,
    prune: &[NodeKind],
    filter: &mut ContextFilter<'_>,
) -> Result<()> {
    let children: Vec<NodeId> = store.children(parent).collect();
    let composable = |store: &NodeStore, id: Option<NodeId>| {
        id.filter(|&id| store.kind(id).is_composable())
    };

    let mut actions = Vec::with_capacity(children.len());
    for (i, &child) in children.iter().enumerate() {
        let kind = store.kind(child);
        let action = if prune.contains(&kind) {
            FilterAction::Prune
        } else if !kind.is_composable() {
            FilterAction::Keep
        } else {
            let prev = composable(store, i.checked_sub(1).map(|j| children[j]));
            let next = composable(store, children.get(i + 1).copied());
            filter(store, prev, child, next)
        };
        actions.push(action);
    }

    // Later indices first so earlier ones stay valid.
    for (index, action) in actions.into_iter().enumerate().rev() {
        match action {
            FilterAction::Keep => {}
            FilterAction::Prune => {
                let old = detach_at(store, parent, index)?;
                store.destroy(old);
            }
            FilterAction::Replace(nodes) => {
                let old = detach_at(store, parent, index)?;
                for (offset, &node) in nodes.iter().enumerate() {
                    if let Err(e) = place_at(store, parent, index + offset, node) {
                        for &unplaced in &nodes[offset..] {
                            store.destroy(unplaced);
                        }
                        if !nodes.contains(&old) {
                            store.destroy(old);
                        }
                        return Err(e);
                    }
                }
                if !nodes.contains(&old) {
                    store.destroy(old);
                }
            }
        }
    }

    let remaining: Vec<NodeId> = store.children(parent).collect();
    for child in remaining {
        walk(store, child, prune, filter)?;
    }
    Ok(())
}

fn detach_at(store: &mut NodeStore, parent: NodeId, index: usize) -> Result<NodeId> {
    if store.kind(parent) == NodeKind::SerializableCollection {
        store.collection_remove(parent, index)
    } else {
        store.remove_child(parent, index)
    }
}

fn place_at(store: &mut NodeStore, parent: NodeId, index: usize, node: NodeId) -> Result<()> {
    if store.kind(parent) == NodeKind::SerializableCollection {
        store.collection_insert(parent, index, node)
    } else {
        store.insert_child(parent, index, node)
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec;

    use super::*;
    use crate::node::{Clip, Gap, SerializableCollection, Stack, Track};
    use crate::range::TimeRange;
    use crate::time::RationalTime;

    fn clip(store: &mut NodeStore, name: &str) -> NodeId {
        store.create(
            name,
            Clip::new(None).with_source_range(TimeRange::from_values(0.0, 48.0, 24.0)),
        )
    }

    fn names(store: &NodeStore, parent: NodeId) -> Vec<&str> {
        store.children(parent).map(|c| store.name(c)).collect()
    }

    /// A timeline with one track holding the named clips.
    fn timeline_with(store: &mut NodeStore, clips: &[&str]) -> (NodeId, NodeId) {
        let timeline = store.create_timeline("test");
        let track = store.create("track", Track::default());
        for name in clips {
            let c = clip(store, name);
            store.append_child(track, c).unwrap();
        }
        let tracks = store.tracks(timeline).unwrap();
        store.append_child(tracks, track).unwrap();
        (timeline, track)
    }

    #[test]
    fn keep_all_copies_the_timeline() {
        let mut store = NodeStore::new();
        let (timeline, _) = timeline_with(&mut store, &["clip"]);
        let copy = filtered_composition(&mut store, timeline, &[], keep_all)
            .unwrap()
            .unwrap();
        assert_ne!(copy, timeline, "a new tree");
        assert_eq!(store.kind(copy), NodeKind::Timeline);
        let tracks = store.tracks(copy).unwrap();
        assert_eq!(store.child_count(tracks), 1);
        let track = store.child_at_index(tracks, 0).unwrap();
        assert_eq!(names(&store, track), ["clip"]);
    }

    #[test]
    fn prune_all_keeps_the_timeline_root() {
        let mut store = NodeStore::new();
        let (timeline, track) = timeline_with(&mut store, &["clip"]);
        let copy = filtered_composition(&mut store, timeline, &[], prune_all)
            .unwrap()
            .unwrap();
        let tracks = store.tracks(copy).unwrap();
        assert_eq!(store.child_count(tracks), 0, "every track pruned");
        assert_eq!(store.child_count(track), 1, "input untouched");
    }

    #[test]
    fn pruned_kinds_skip_the_filter() {
        let mut store = NodeStore::new();
        let (timeline, track) = timeline_with(&mut store, &["clip"]);
        let gap = store.create("gap", Gap::with_duration(RationalTime::new(48.0, 24.0)));
        store.append_child(track, gap).unwrap();

        let mut offered = Vec::new();
        let copy = filtered_composition(&mut store, timeline, &[NodeKind::Gap], |store, id| {
            offered.push(String::from(store.name(id)));
            FilterAction::Keep
        })
        .unwrap()
        .unwrap();
        assert_eq!(offered, ["track", "clip"], "gap never offered");
        let tracks = store.tracks(copy).unwrap();
        let track = store.child_at_index(tracks, 0).unwrap();
        assert_eq!(names(&store, track), ["clip"]);

        let root = filtered_composition(&mut store, gap, &[NodeKind::Gap], keep_all).unwrap();
        assert_eq!(root, None, "a pruned root");
    }

    #[test]
    fn keep_kinds_and_keep_named() {
        let mut store = NodeStore::new();
        let gap = store.create("keep_gap", Gap::with_duration(RationalTime::new(1.0, 24.0)));
        let keep = clip(&mut store, "keep_clip");
        let drop = clip(&mut store, "prune_clip");

        let mut clips_only = keep_kinds(&[NodeKind::Clip]);
        assert_eq!(clips_only(&mut store, keep), FilterAction::Keep);
        assert_eq!(clips_only(&mut store, gap), FilterAction::Prune);

        let mut prefixed = keep_named(|name| name.starts_with("keep_"));
        assert_eq!(prefixed(&mut store, keep), FilterAction::Keep);
        assert_eq!(prefixed(&mut store, gap), FilterAction::Keep);
        assert_eq!(prefixed(&mut store, drop), FilterAction::Prune);
    }

    #[test]
    fn sequence_context_sees_original_neighbors() {
        let mut store = NodeStore::new();
        let (_, track) = timeline_with(&mut store, &["clip1", "clip2", "clip3"]);
        let mut seen = Vec::new();
        let copy = filtered_with_sequence_context(&mut store, track, &[], |store, prev, id, next| {
            let name = |n: Option<NodeId>| n.map(|n| String::from(store.name(n)));
            seen.push((name(prev), String::from(store.name(id)), name(next)));
            if prev.is_some() && next.is_some() {
                FilterAction::Keep
            } else {
                FilterAction::Prune
            }
        })
        .unwrap()
        .unwrap();
        assert_eq!(names(&store, copy), ["clip2"], "only the middle clip has both");
        assert_eq!(seen.len(), 3, "root not offered");
        assert_eq!(
            seen[2],
            (Some(String::from("clip2")), String::from("clip3"), None),
            "context is the unfiltered sequence"
        );
    }

    #[test]
    fn stacks_tracks_and_collections() {
        let mut store = NodeStore::new();
        let stack = store.create("stack", Stack::new());
        let track = store.create("track", Track::default());
        let c1 = clip(&mut store, "clip1");
        let c2 = clip(&mut store, "clip2");
        store.set_children(track, &[c1, c2]).unwrap();
        store.append_child(stack, track).unwrap();

        let copy = filtered_composition(&mut store, stack, &[], keep_all).unwrap().unwrap();
        assert_eq!(store.kind(copy), NodeKind::Stack);
        assert_eq!(names(&store, copy), ["track"]);

        let copy = filtered_composition(&mut store, track, &[], keep_all).unwrap().unwrap();
        assert_eq!(names(&store, copy), ["clip1", "clip2"]);

        let coll = store.create("coll", SerializableCollection::default());
        let loose = clip(&mut store, "clip");
        store.collection_append(coll, loose).unwrap();
        let (timeline, _) = timeline_with(&mut store, &["nested"]);
        store.collection_append(coll, timeline).unwrap();
        let copy = filtered_composition(&mut store, coll, &[], keep_named(|n| n != "nested"))
            .unwrap()
            .unwrap();
        assert_eq!(names(&store, copy), ["clip", "test"], "timeline entry kept");
        let nested = store.child_at_index(copy, 1).unwrap();
        let tracks = store.tracks(nested).unwrap();
        let nested_track = store.child_at_index(tracks, 0).unwrap();
        assert_eq!(store.child_count(nested_track), 0, "searched inside the timeline");
    }

    #[test]
    fn replace_expands_and_descends() {
        let mut store = NodeStore::new();
        let (_, track) = timeline_with(&mut store, &["a", "b"]);
        let copy = filtered_composition(&mut store, track, &[], |store, id| {
            if store.kind(id) == NodeKind::Clip && store.name(id) == "a" {
                let twin = store.clone_subtree(id);
                FilterAction::Replace(vec![id, twin])
            } else {
                FilterAction::Keep
            }
        })
        .unwrap()
        .unwrap();
        assert_eq!(names(&store, copy), ["a", "a", "b"]);
        assert_eq!(names(&store, track), ["a", "b"], "input untouched");
    }

    #[test]
    fn replacing_the_root_keeps_the_first_node() {
        let mut store = NodeStore::new();
        let (_, track) = timeline_with(&mut store, &["a", "b"]);
        let before = store.node_count();
        let copy = filtered_composition(&mut store, track, &[], |store, id| {
            if store.kind(id) == NodeKind::Track {
                let a = store.child_at_index(id, 0).unwrap();
                let stray = store.create("stray", Gap::default());
                FilterAction::Replace(vec![a, stray])
            } else {
                FilterAction::Keep
            }
        })
        .unwrap()
        .unwrap();
        assert_eq!(store.name(copy), "a");
        assert_eq!(store.owner(copy), None, "detached");
        assert_eq!(store.node_count(), before + 1, "only the new root survives");
    }

    #[test]
    fn failed_replacement_leaves_no_partial_copy() {
        let mut store = NodeStore::new();
        let (timeline, _) = timeline_with(&mut store, &["a", "b"]);
        let before = (store.node_count(), store.roots());
        let result = filtered_composition(&mut store, timeline, &[], |store, id| {
            if store.name(id) == "b" {
                let stray = store.create_timeline("stray");
                FilterAction::Replace(vec![stray])
            } else {
                FilterAction::Keep
            }
        });
        assert!(result.is_err(), "a timeline cannot sit in a track");
        assert_eq!((store.node_count(), store.roots()), before);
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composition tree data model.
//!
//! A *node* is a clip, gap, transition, track, stack, timeline or collection.
//! Each node has:
//!
//! - An identity ([`NodeId`]): a generational handle that becomes stale when
//!   the node is destroyed, preventing use-after-free bugs at the API level.
//! - A single owner and an ordered list of owned nodes. Tracks and stacks are
//!   temporal [`parent`](NodeStore::parent)s; timelines and collections own
//!   nodes without positioning them in time.
//! - A name, [`Metadata`](crate::metadata::Metadata), and a [`NodeData`]
//!   payload carrying the kind-specific fields.
//!
//! Nodes are stored in struct-of-arrays layout with index-based handles.
//! Handles are `Copy` and hold no borrow, so the tree can be edited freely
//! while handles are kept around.
//!
//! # Layout
//!
//! - **Track**: children sit back to back. Transitions overlap their
//!   neighbors and add no length.
//! - **Stack**: every child starts at zero; the stack is as long as its
//!   longest child.
//!
//! Ranges are recomputed on every query from the current tree; nothing is
//! cached, so edits never leave stale values behind.
//!
//! # Ownership
//!
//! Attaching a node anywhere detaches it from its previous owner first.
//! Attaching a node beneath itself fails with [`Error::Cycle`](crate::Error::Cycle).
//! A timeline always owns exactly one tracks [`Stack`]; removing it gives the
//! timeline a fresh empty one.

mod collection;
mod composition;
mod equivalence;
mod id;
mod item;
mod kind;
mod stack;
mod store;
mod timeline;
mod track;
mod traverse;

pub use id::{INVALID, NodeId};
pub use kind::{
    Clip, DEFAULT_MEDIA_KEY, Gap, ItemFields, NodeData, NodeKind, SerializableCollection, Stack,
    Timeline, Track, TrackKind, Transition, TransitionType,
};
pub use store::{NodeStore, StoreConfig};
pub use track::{Neighbor, NeighborGapPolicy};
pub use traverse::{Ancestors, Children, Descendants};

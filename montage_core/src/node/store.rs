// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage with allocation, ownership, and accessors.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::range::{DEFAULT_EPSILON, TimeRange};
use crate::schema::Schema;
use crate::trace::{
    ChildAttachedEvent, ChildDetachedEvent, EditEvent, NodeCreatedEvent, NodeDestroyedEvent,
};

use super::id::{INVALID, NodeId};
use super::kind::{Clip, ItemFields, NodeData, NodeKind, Stack, Timeline, Track, Transition};
use super::traverse::Children;

/// Store-wide settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoreConfig {
    /// Boundary tolerance in seconds for range intersection tests made by
    /// composition queries.
    pub epsilon_s: f64,
    /// Whether structural edits are journaled for [`NodeStore::take_edits`].
    pub record_edits: bool,
}

impl StoreConfig {
    /// Default tolerance, no journaling.
    pub const DEFAULT: Self = Self {
        epsilon_s: DEFAULT_EPSILON,
        record_edits: false,
    };

    /// Default tolerance with journaling enabled.
    pub const RECORDING: Self = Self {
        epsilon_s: DEFAULT_EPSILON,
        record_edits: true,
    };
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Struct-of-arrays storage for all nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally each node occupies a
/// slot in parallel arrays. Destroyed nodes are recycled via a free list, and
/// generation counters prevent stale handle access.
///
/// Every node has at most one owner. Attaching a node anywhere first detaches
/// it from its previous owner, so a node can never sit in two containers.
///
/// Cloning the store snapshots every node; handles stay valid in the copy.
#[derive(Clone, Debug)]
pub struct NodeStore {
    // -- Topology --
    pub(crate) owner: Vec<u32>,
    pub(crate) children: Vec<Vec<u32>>,

    // -- Payload --
    pub(crate) name: Vec<String>,
    pub(crate) metadata: Vec<Metadata>,
    pub(crate) data: Vec<NodeData>,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Configuration --
    pub(crate) config: StoreConfig,

    // -- Edit journal --
    pub(crate) edits: Vec<EditEvent>,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    /// Creates an empty store with [`StoreConfig::DEFAULT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::DEFAULT)
    }

    /// Creates an empty store with the given settings.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            owner: Vec::new(),
            children: Vec::new(),
            name: Vec::new(),
            metadata: Vec::new(),
            data: Vec::new(),
            generation: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            config,
            edits: Vec::new(),
        }
    }

    /// Returns the store settings.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> StoreConfig {
        self.config
    }

    /// Replaces the store settings.
    pub fn set_config(&mut self, config: StoreConfig) {
        self.config = config;
    }

    // -- Allocation API --

    /// Creates a detached node and returns its handle.
    ///
    /// Creating a [`Timeline`] also creates its `"tracks"` stack.
    pub fn create(&mut self, name: impl Into<String>, data: impl Into<NodeData>) -> NodeId {
        let data = data.into();
        let is_timeline = data.kind() == NodeKind::Timeline;
        let idx = self.alloc(name.into(), data);
        if is_timeline {
            let tracks = self.alloc(String::from("tracks"), NodeData::Stack(Stack::new()));
            self.link(idx, tracks, 0);
        }
        self.id_at(idx)
    }

    /// Creates a timeline with an empty tracks stack.
    pub fn create_timeline(&mut self, name: impl Into<String>) -> NodeId {
        self.create(name, Timeline::default())
    }

    /// Destroys a node and every node it owns, freeing their slots.
    ///
    /// The node is detached from its owner first. Destroying a timeline's
    /// tracks stack leaves the timeline with a fresh empty one.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn destroy(&mut self, id: NodeId) {
        self.validate(id);
        self.detach(id.idx);
        let mut pending = alloc::vec![id.idx];
        while let Some(idx) = pending.pop() {
            pending.extend(core::mem::take(&mut self.children[idx as usize]));
            let node = self.id_at(idx);
            let kind = self.data[idx as usize].kind();
            self.owner[idx as usize] = INVALID;
            self.name[idx as usize] = String::new();
            self.metadata[idx as usize] = Metadata::new();
            self.data[idx as usize] = NodeData::Gap(super::kind::Gap::default());
            // Bump generation so old handles immediately fail validation.
            self.generation[idx as usize] += 1;
            self.free_list.push(idx);
            self.record(EditEvent::Destroyed(NodeDestroyedEvent { node, kind }));
        }
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        (id.idx < self.len)
            && self.generation[id.idx as usize] == id.generation
            && !self.free_list.contains(&id.idx)
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len as usize - self.free_list.len()
    }

    /// Returns every live node that has no owner.
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        (0..self.len)
            .filter(|&idx| self.owner[idx as usize] == INVALID && !self.free_list.contains(&idx))
            .map(|idx| self.id_at(idx))
            .collect()
    }

    // -- Ownership API --

    /// Returns the track or stack this node is a child of.
    ///
    /// Timelines and collections own nodes but are not parents in the
    /// temporal sense; see [`owner`](Self::owner).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.owner(id)
            .filter(|&o| self.data[o.idx as usize].kind().is_composition())
    }

    /// Returns the container that owns this node, of any kind.
    #[must_use]
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let o = self.owner[id.idx as usize];
        (o != INVALID).then(|| self.id_at(o))
    }

    /// Returns an iterator over the nodes owned by `id`, in order.
    ///
    /// For a timeline this yields its tracks stack; for leaves it is empty.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    /// Returns the number of nodes owned by `id`.
    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.validate(id);
        self.children[id.idx as usize].len()
    }

    /// Detaches a node from whatever owns it. Does nothing for roots.
    ///
    /// Detaching a timeline's tracks stack leaves the timeline with a fresh
    /// empty one.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn detach_node(&mut self, id: NodeId) {
        self.validate(id);
        self.detach(id.idx);
    }

    // -- Property getters --

    /// Returns the node's name.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.validate(id);
        &self.name[id.idx as usize]
    }

    /// Returns the node's metadata.
    #[must_use]
    pub fn metadata(&self, id: NodeId) -> &Metadata {
        self.validate(id);
        &self.metadata[id.idx as usize]
    }

    /// Returns the node's kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.validate(id);
        self.data[id.idx as usize].kind()
    }

    /// Returns the node's schema identifier.
    #[must_use]
    pub fn schema(&self, id: NodeId) -> Schema {
        self.kind(id).schema()
    }

    /// Returns the node's payload.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        self.validate(id);
        &self.data[id.idx as usize]
    }

    /// Returns the clip payload.
    pub fn clip(&self, id: NodeId) -> Result<&Clip> {
        match self.data(id) {
            NodeData::Clip(c) => Ok(c),
            other => Err(mismatch("clip", other.kind())),
        }
    }

    /// Returns the track payload.
    pub fn track(&self, id: NodeId) -> Result<&Track> {
        match self.data(id) {
            NodeData::Track(t) => Ok(t),
            other => Err(mismatch("track", other.kind())),
        }
    }

    /// Returns the transition payload.
    pub fn transition(&self, id: NodeId) -> Result<&Transition> {
        match self.data(id) {
            NodeData::Transition(t) => Ok(t),
            other => Err(mismatch("transition", other.kind())),
        }
    }

    /// Returns the timeline payload.
    pub fn timeline(&self, id: NodeId) -> Result<&Timeline> {
        match self.data(id) {
            NodeData::Timeline(t) => Ok(t),
            other => Err(mismatch("timeline", other.kind())),
        }
    }

    /// Returns the item fields of a clip, gap, track or stack.
    pub fn item(&self, id: NodeId) -> Result<&ItemFields> {
        let data = self.data(id);
        data.item().ok_or_else(|| mismatch("item", data.kind()))
    }

    /// Returns the explicit trim of an item.
    pub fn source_range(&self, id: NodeId) -> Result<Option<TimeRange>> {
        Ok(self.item(id)?.source_range)
    }

    /// Returns `false` for transitions, which occupy no time of their own.
    #[must_use]
    pub fn visible(&self, id: NodeId) -> bool {
        self.kind(id) != NodeKind::Transition
    }

    /// Returns `true` for transitions, which overlap their neighbors.
    #[must_use]
    pub fn overlapping(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Transition
    }

    /// Returns the item's enabled flag; nodes without item fields are
    /// always enabled.
    #[must_use]
    pub fn enabled(&self, id: NodeId) -> bool {
        self.data(id).item().is_none_or(|item| item.enabled)
    }

    // -- Mutation API --

    /// Renames a node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) {
        self.validate(id);
        self.name[id.idx as usize] = name.into();
    }

    /// Returns the node's metadata mutably.
    pub fn metadata_mut(&mut self, id: NodeId) -> &mut Metadata {
        self.validate(id);
        &mut self.metadata[id.idx as usize]
    }

    /// Returns the clip payload mutably.
    pub fn clip_mut(&mut self, id: NodeId) -> Result<&mut Clip> {
        self.validate(id);
        match &mut self.data[id.idx as usize] {
            NodeData::Clip(c) => Ok(c),
            other => Err(mismatch("clip", other.kind())),
        }
    }

    /// Returns the track payload mutably.
    pub fn track_mut(&mut self, id: NodeId) -> Result<&mut Track> {
        self.validate(id);
        match &mut self.data[id.idx as usize] {
            NodeData::Track(t) => Ok(t),
            other => Err(mismatch("track", other.kind())),
        }
    }

    /// Returns the transition payload mutably.
    pub fn transition_mut(&mut self, id: NodeId) -> Result<&mut Transition> {
        self.validate(id);
        match &mut self.data[id.idx as usize] {
            NodeData::Transition(t) => Ok(t),
            other => Err(mismatch("transition", other.kind())),
        }
    }

    /// Returns the timeline payload mutably.
    pub fn timeline_mut(&mut self, id: NodeId) -> Result<&mut Timeline> {
        self.validate(id);
        match &mut self.data[id.idx as usize] {
            NodeData::Timeline(t) => Ok(t),
            other => Err(mismatch("timeline", other.kind())),
        }
    }

    /// Returns the item fields mutably.
    pub fn item_mut(&mut self, id: NodeId) -> Result<&mut ItemFields> {
        self.validate(id);
        let data = &mut self.data[id.idx as usize];
        let kind = data.kind();
        data.item_mut().ok_or_else(|| mismatch("item", kind))
    }

    /// Sets or clears an item's explicit trim.
    pub fn set_source_range(&mut self, id: NodeId, range: Option<TimeRange>) -> Result<()> {
        self.item_mut(id)?.source_range = range;
        Ok(())
    }

    /// Enables or disables an item.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        self.item_mut(id)?.enabled = enabled;
        Ok(())
    }

    // -- Edit journal --

    /// Returns the journaled edits not yet taken.
    #[must_use]
    pub fn edits(&self) -> &[EditEvent] {
        &self.edits
    }

    /// Drains the journaled edits.
    ///
    /// Only populated when [`StoreConfig::record_edits`] is set.
    pub fn take_edits(&mut self) -> Vec<EditEvent> {
        core::mem::take(&mut self.edits)
    }

    // -- Internal helpers --

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            id.idx < self.len && self.generation[id.idx as usize] == id.generation,
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Builds a handle for a live slot.
    #[inline]
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    #[inline]
    pub(crate) fn kind_at(&self, idx: u32) -> NodeKind {
        self.data[idx as usize].kind()
    }

    pub(crate) fn record(&mut self, event: EditEvent) {
        if self.config.record_edits {
            self.edits.push(event);
        }
    }

    /// Allocates a detached slot.
    pub(crate) fn alloc(&mut self, name: String, data: NodeData) -> u32 {
        let kind = data.kind();
        let idx = if let Some(idx) = self.free_list.pop() {
            // Reuse a freed slot; its generation was bumped on destroy.
            self.owner[idx as usize] = INVALID;
            self.children[idx as usize].clear();
            self.name[idx as usize] = name;
            self.metadata[idx as usize] = Metadata::new();
            self.data[idx as usize] = data;
            idx
        } else {
            let idx = self.len;
            self.len += 1;
            self.owner.push(INVALID);
            self.children.push(Vec::new());
            self.name.push(name);
            self.metadata.push(Metadata::new());
            self.data.push(data);
            self.generation.push(0);
            idx
        };
        let node = self.id_at(idx);
        self.record(EditEvent::Created(NodeCreatedEvent { node, kind }));
        idx
    }

    /// Returns `true` if `candidate` is `idx` or one of its owners.
    pub(crate) fn owns_or_is(&self, candidate: u32, idx: u32) -> bool {
        let mut cur = idx;
        while cur != INVALID {
            if cur == candidate {
                return true;
            }
            cur = self.owner[cur as usize];
        }
        false
    }

    /// Fails with [`Error::Cycle`] if `child` is `owner` or owns it.
    pub(crate) fn check_cycle(&self, owner: u32, child: u32) -> Result<()> {
        if self.owns_or_is(child, owner) {
            Err(Error::Cycle)
        } else {
            Ok(())
        }
    }

    /// Inserts `child` into `owner`'s child list. `child` must be detached.
    pub(crate) fn link(&mut self, owner: u32, child: u32, index: usize) {
        debug_assert!(self.owner[child as usize] == INVALID, "child already owned");
        let list = &mut self.children[owner as usize];
        let index = index.min(list.len());
        list.insert(index, child);
        self.owner[child as usize] = owner;
        let event = ChildAttachedEvent {
            owner: self.id_at(owner),
            child: self.id_at(child),
            index: index_u32(index),
        };
        self.record(EditEvent::Attached(event));
    }

    /// Removes `child` from its owner's list without repairing timelines.
    ///
    /// Returns the former owner and position.
    pub(crate) fn unlink(&mut self, child: u32) -> Option<(u32, usize)> {
        let owner = self.owner[child as usize];
        if owner == INVALID {
            return None;
        }
        let list = &mut self.children[owner as usize];
        let index = list.iter().position(|&c| c == child)?;
        list.remove(index);
        self.owner[child as usize] = INVALID;
        let event = ChildDetachedEvent {
            owner: self.id_at(owner),
            child: self.id_at(child),
            index: index_u32(index),
        };
        self.record(EditEvent::Detached(event));
        Some((owner, index))
    }

    /// Detaches `child` from its owner, giving a timeline a replacement
    /// tracks stack if `child` was its tracks.
    pub(crate) fn detach(&mut self, child: u32) -> Option<(u32, usize)> {
        let (owner, index) = self.unlink(child)?;
        if self.kind_at(owner) == NodeKind::Timeline {
            let tracks = self.alloc(String::from("tracks"), NodeData::Stack(Stack::new()));
            self.link(owner, tracks, 0);
        }
        Some((owner, index))
    }

    /// Detaches `child` and inserts it at `index` in `owner`'s list.
    ///
    /// When `child` moves within the same owner, `index` refers to the list
    /// as it was before the move.
    pub(crate) fn attach(&mut self, owner: u32, child: u32, index: usize) {
        let index = match self.detach(child) {
            Some((prev, pos)) if prev == owner && pos < index => index - 1,
            _ => index,
        };
        self.link(owner, child, index);
    }
}

/// Builds a [`Error::TypeMismatch`].
pub(crate) const fn mismatch(expected: &'static str, found: NodeKind) -> Error {
    Error::TypeMismatch { expected, found }
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}

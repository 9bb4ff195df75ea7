// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node kinds and their payloads.
//!
//! Each node in a [`NodeStore`](super::NodeStore) carries a [`NodeData`]
//! payload. Child links are kept by the store, not by the payload, so a
//! payload can be cloned or inspected without touching the tree.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::color::Color;
use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::marker::Marker;
use crate::media::MediaReference;
use crate::range::TimeRange;
use crate::schema::{self, Schema};
use crate::time::RationalTime;

/// Key under which a clip stores its media reference unless told otherwise.
pub const DEFAULT_MEDIA_KEY: &str = "DEFAULT_MEDIA";

/// Discriminant of a [`NodeData`] payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A media-bearing leaf.
    Clip,
    /// An empty spacer leaf.
    Gap,
    /// A blend between two neighbors; occupies no time of its own.
    Transition,
    /// Sequential composition.
    Track,
    /// Overlay composition.
    Stack,
    /// Root wrapping one [`Stack`] of tracks.
    Timeline,
    /// An untimed bag of nodes.
    SerializableCollection,
}

impl NodeKind {
    /// Returns `true` for kinds that can sit in a track or stack.
    #[inline]
    #[must_use]
    pub const fn is_composable(self) -> bool {
        matches!(
            self,
            Self::Clip | Self::Gap | Self::Transition | Self::Track | Self::Stack
        )
    }

    /// Returns `true` for kinds with [`ItemFields`].
    #[inline]
    #[must_use]
    pub const fn is_item(self) -> bool {
        matches!(self, Self::Clip | Self::Gap | Self::Track | Self::Stack)
    }

    /// Returns `true` for [`Track`] and [`Stack`].
    #[inline]
    #[must_use]
    pub const fn is_composition(self) -> bool {
        matches!(self, Self::Track | Self::Stack)
    }

    /// Returns the schema for this kind.
    #[must_use]
    pub const fn schema(self) -> Schema {
        match self {
            Self::Clip => schema::CLIP,
            Self::Gap => schema::GAP,
            Self::Transition => schema::TRANSITION,
            Self::Track => schema::TRACK,
            Self::Stack => schema::STACK,
            Self::Timeline => schema::TIMELINE,
            Self::SerializableCollection => schema::SERIALIZABLE_COLLECTION,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema().name)
    }
}

/// Whether a track carries pictures or sound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TrackKind {
    /// `"Video"`.
    #[default]
    Video,
    /// `"Audio"`.
    Audio,
}

impl TrackKind {
    /// Returns the interchange name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
        }
    }
}

/// The kind of blend a [`Transition`] performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransitionType {
    /// `"SMPTE_Dissolve"`.
    #[default]
    SmpteDissolve,
    /// `"Custom_Transition"`.
    Custom,
}

impl TransitionType {
    /// Returns the interchange name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SmpteDissolve => "SMPTE_Dissolve",
            Self::Custom => "Custom_Transition",
        }
    }
}

// -- Payloads --

/// Fields shared by every item kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemFields {
    /// Explicit trim; overrides the computed range when set.
    pub source_range: Option<TimeRange>,
    /// Attached effects, in order.
    pub effects: Vec<Effect>,
    /// Attached markers, in order.
    pub markers: Vec<Marker>,
    /// Disabled items are skipped by flattening.
    pub enabled: bool,
    /// Display color.
    pub color: Option<Color>,
}

impl Default for ItemFields {
    fn default() -> Self {
        Self {
            source_range: None,
            effects: Vec::new(),
            markers: Vec::new(),
            enabled: true,
            color: None,
        }
    }
}

impl ItemFields {
    /// Creates fields with the given trim.
    #[must_use]
    pub fn with_source_range(source_range: TimeRange) -> Self {
        Self {
            source_range: Some(source_range),
            ..Self::default()
        }
    }
}

/// A leaf referencing media.
///
/// A clip holds one or more media references by key; the active one is
/// authoritative for range queries.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    /// Item fields.
    pub item: ItemFields,
    media_references: BTreeMap<String, MediaReference>,
    active_media_reference_key: String,
}

impl Default for Clip {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Clip {
    /// Creates a clip. `None` stores a missing-media placeholder.
    #[must_use]
    pub fn new(media_reference: Option<MediaReference>) -> Self {
        let mut media_references = BTreeMap::new();
        media_references.insert(
            String::from(DEFAULT_MEDIA_KEY),
            media_reference.unwrap_or_default(),
        );
        Self {
            item: ItemFields::default(),
            media_references,
            active_media_reference_key: String::from(DEFAULT_MEDIA_KEY),
        }
    }

    /// Sets the trim and returns the clip.
    #[must_use]
    pub fn with_source_range(mut self, source_range: TimeRange) -> Self {
        self.item.source_range = Some(source_range);
        self
    }

    /// Returns the active media reference.
    #[must_use]
    pub fn media_reference(&self) -> &MediaReference {
        // `set_media_references` and `set_active_media_reference_key` only
        // accept keys present in the map.
        &self.media_references[&self.active_media_reference_key]
    }

    /// Returns the active media reference mutably.
    pub fn media_reference_mut(&mut self) -> &mut MediaReference {
        self.media_references
            .entry(self.active_media_reference_key.clone())
            .or_default()
    }

    /// Replaces the active media reference. `None` stores a placeholder.
    pub fn set_media_reference(&mut self, media_reference: Option<MediaReference>) {
        *self.media_reference_mut() = media_reference.unwrap_or_default();
    }

    /// Returns all media references by key.
    #[must_use]
    pub fn media_references(&self) -> &BTreeMap<String, MediaReference> {
        &self.media_references
    }

    /// Replaces all media references and selects the active one.
    ///
    /// Fails with [`Error::MediaReferenceNotFound`] if `active_key` is not
    /// in `references`; the clip is left unchanged.
    pub fn set_media_references(
        &mut self,
        references: BTreeMap<String, MediaReference>,
        active_key: &str,
    ) -> Result<()> {
        if !references.contains_key(active_key) {
            return Err(Error::MediaReferenceNotFound(active_key.into()));
        }
        self.media_references = references;
        self.active_media_reference_key = active_key.into();
        Ok(())
    }

    /// Returns the key of the active media reference.
    #[must_use]
    pub fn active_media_reference_key(&self) -> &str {
        &self.active_media_reference_key
    }

    /// Selects a different media reference as active.
    pub fn set_active_media_reference_key(&mut self, key: &str) -> Result<()> {
        if !self.media_references.contains_key(key) {
            return Err(Error::MediaReferenceNotFound(key.into()));
        }
        self.active_media_reference_key = key.into();
        Ok(())
    }
}

/// An empty spacer. Its length is its source range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gap {
    /// Item fields.
    pub item: ItemFields,
}

impl Gap {
    /// Creates a gap of `duration`, starting at zero in the duration's rate.
    #[must_use]
    pub fn with_duration(duration: RationalTime) -> Self {
        Self {
            item: ItemFields::with_source_range(TimeRange::new(
                RationalTime::new(0.0, duration.rate()),
                duration,
            )),
        }
    }
}

/// A blend between the items on either side of it in a track.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transition {
    /// Blend type.
    pub transition_type: TransitionType,
    /// Portion of the blend before the cut.
    pub in_offset: RationalTime,
    /// Portion of the blend after the cut.
    pub out_offset: RationalTime,
}

impl Transition {
    /// Creates a transition.
    #[must_use]
    pub const fn new(
        transition_type: TransitionType,
        in_offset: RationalTime,
        out_offset: RationalTime,
    ) -> Self {
        Self {
            transition_type,
            in_offset,
            out_offset,
        }
    }

    /// Returns `in_offset + out_offset`.
    #[must_use]
    pub fn duration(&self) -> RationalTime {
        self.in_offset + self.out_offset
    }
}

/// Sequential composition payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    /// Item fields.
    pub item: ItemFields,
    /// Picture or sound.
    pub kind: TrackKind,
}

impl Track {
    /// Creates an untrimmed track.
    #[must_use]
    pub fn new(kind: TrackKind) -> Self {
        Self {
            item: ItemFields::default(),
            kind,
        }
    }
}

/// Overlay composition payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    /// Item fields.
    pub item: ItemFields,
}

impl Stack {
    /// Creates an untrimmed stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Timeline payload. The tracks stack is the node's single owned child.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Timeline {
    /// Time of the first frame, for display.
    pub global_start_time: Option<RationalTime>,
}

/// Untimed collection payload. Entries are the node's owned children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializableCollection;

/// A node payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    /// See [`Clip`].
    Clip(Clip),
    /// See [`Gap`].
    Gap(Gap),
    /// See [`Transition`].
    Transition(Transition),
    /// See [`Track`].
    Track(Track),
    /// See [`Stack`].
    Stack(Stack),
    /// See [`Timeline`].
    Timeline(Timeline),
    /// See [`SerializableCollection`].
    SerializableCollection(SerializableCollection),
}

impl NodeData {
    /// Returns the kind tag.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Clip(_) => NodeKind::Clip,
            Self::Gap(_) => NodeKind::Gap,
            Self::Transition(_) => NodeKind::Transition,
            Self::Track(_) => NodeKind::Track,
            Self::Stack(_) => NodeKind::Stack,
            Self::Timeline(_) => NodeKind::Timeline,
            Self::SerializableCollection(_) => NodeKind::SerializableCollection,
        }
    }

    /// Returns the item fields, if this kind has them.
    #[must_use]
    pub const fn item(&self) -> Option<&ItemFields> {
        match self {
            Self::Clip(c) => Some(&c.item),
            Self::Gap(g) => Some(&g.item),
            Self::Track(t) => Some(&t.item),
            Self::Stack(s) => Some(&s.item),
            Self::Transition(_) | Self::Timeline(_) | Self::SerializableCollection(_) => None,
        }
    }

    /// Returns the item fields mutably, if this kind has them.
    pub const fn item_mut(&mut self) -> Option<&mut ItemFields> {
        match self {
            Self::Clip(c) => Some(&mut c.item),
            Self::Gap(g) => Some(&mut g.item),
            Self::Track(t) => Some(&mut t.item),
            Self::Stack(s) => Some(&mut s.item),
            Self::Transition(_) | Self::Timeline(_) | Self::SerializableCollection(_) => None,
        }
    }
}

impl From<Clip> for NodeData {
    fn from(v: Clip) -> Self {
        Self::Clip(v)
    }
}

impl From<Gap> for NodeData {
    fn from(v: Gap) -> Self {
        Self::Gap(v)
    }
}

impl From<Transition> for NodeData {
    fn from(v: Transition) -> Self {
        Self::Transition(v)
    }
}

impl From<Track> for NodeData {
    fn from(v: Track) -> Self {
        Self::Track(v)
    }
}

impl From<Stack> for NodeData {
    fn from(v: Stack) -> Self {
        Self::Stack(v)
    }
}

impl From<Timeline> for NodeData {
    fn from(v: Timeline) -> Self {
        Self::Timeline(v)
    }
}

impl From<SerializableCollection> for NodeData {
    fn from(v: SerializableCollection) -> Self {
        Self::SerializableCollection(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn capability_flags() {
        assert!(NodeKind::Transition.is_composable(), "transition");
        assert!(!NodeKind::Transition.is_item(), "transition has no item fields");
        assert!(NodeKind::Stack.is_composition(), "stack");
        assert!(!NodeKind::Timeline.is_composable(), "timeline");
        assert_eq!(format!("{}", NodeKind::SerializableCollection), "SerializableCollection");
    }

    #[test]
    fn clip_defaults_to_missing_media() {
        let clip = Clip::default();
        assert_eq!(clip.active_media_reference_key(), DEFAULT_MEDIA_KEY);
        assert!(clip.media_reference().is_missing_reference(), "placeholder");
    }

    #[test]
    fn clip_rejects_unknown_media_key() {
        let mut clip = Clip::new(Some(MediaReference::external("a.mov")));
        let err = clip.set_active_media_reference_key("proxy");
        assert_eq!(err, Err(Error::MediaReferenceNotFound("proxy".into())));

        let mut refs = BTreeMap::new();
        refs.insert(String::from("proxy"), MediaReference::external("p.mov"));
        assert!(clip.set_media_references(refs.clone(), "high").is_err(), "missing key");
        assert_eq!(clip.media_reference().target_url(), Some("a.mov"));

        clip.set_media_references(refs, "proxy").unwrap();
        assert_eq!(clip.media_reference().target_url(), Some("p.mov"));
        clip.set_media_reference(None);
        assert!(clip.media_reference().is_missing_reference(), "cleared");
    }

    #[test]
    fn gap_duration_starts_at_zero() {
        let gap = Gap::with_duration(RationalTime::new(10.0, 24.0));
        let range = gap.item.source_range.unwrap();
        assert!(range.start_time().strictly_equal(RationalTime::new(0.0, 24.0)), "start");
        assert_eq!(range.duration().value(), 10.0);
    }

    #[test]
    fn transition_duration_sums_offsets() {
        let t = Transition::new(
            TransitionType::SmpteDissolve,
            RationalTime::new(6.0, 24.0),
            RationalTime::new(4.0, 24.0),
        );
        assert_eq!(t.duration().value(), 10.0);
        assert_eq!(TransitionType::Custom.as_str(), "Custom_Transition");
    }
}

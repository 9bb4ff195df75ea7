// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Media references: where a clip's content comes from.
//!
//! A [`MediaReference`] carries the fields shared by every reference (name,
//! metadata, available range and image bounds) plus a [`MediaKind`] holding
//! the variant-specific data.

use alloc::format;
use alloc::string::String;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Rect;

use crate::error::{Error, Result};
use crate::metadata::Metadata;
use crate::range::TimeRange;
use crate::schema::{self, Schema};
use crate::time::RationalTime;

/// What to do when a frame of an image sequence is missing on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MissingFramePolicy {
    /// Report an error.
    #[default]
    Error,
    /// Repeat the previous existing frame.
    Hold,
    /// Substitute a black frame.
    Black,
}

impl MissingFramePolicy {
    /// Returns the interchange name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Hold => "hold",
            Self::Black => "black",
        }
    }
}

/// A numbered sequence of image files.
///
/// Image `n` lives at `target_url_base + name_prefix + n + name_suffix`, with
/// `n` zero-padded to `frame_zero_padding` digits.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSequence {
    /// Directory or URL prefix, usually ending in `/`.
    pub target_url_base: String,
    /// File name before the frame number.
    pub name_prefix: String,
    /// File name after the frame number, e.g. `".exr"`.
    pub name_suffix: String,
    /// Number of the first image.
    pub start_frame: i64,
    /// Increment between consecutive image numbers. Never zero.
    pub frame_step: i64,
    /// Playback rate of the sequence.
    pub rate: f64,
    /// Minimum number of digits in an image number.
    pub frame_zero_padding: usize,
    /// Handling of gaps in the sequence.
    pub missing_frame_policy: MissingFramePolicy,
}

impl Default for ImageSequence {
    fn default() -> Self {
        Self {
            target_url_base: String::new(),
            name_prefix: String::new(),
            name_suffix: String::new(),
            start_frame: 1,
            frame_step: 1,
            rate: 1.0,
            frame_zero_padding: 0,
            missing_frame_policy: MissingFramePolicy::Error,
        }
    }
}

impl ImageSequence {
    /// Creates a sequence. A zero `frame_step` is treated as one.
    #[must_use]
    pub fn new(
        target_url_base: impl Into<String>,
        name_prefix: impl Into<String>,
        name_suffix: impl Into<String>,
        start_frame: i64,
        frame_step: i64,
        rate: f64,
        frame_zero_padding: usize,
    ) -> Self {
        Self {
            target_url_base: target_url_base.into(),
            name_prefix: name_prefix.into(),
            name_suffix: name_suffix.into(),
            start_frame,
            frame_step: if frame_step == 0 { 1 } else { frame_step },
            rate,
            frame_zero_padding,
            missing_frame_policy: MissingFramePolicy::Error,
        }
    }

    /// Returns the URL of image number `image_number`.
    #[must_use]
    pub fn target_url_for_image_number(&self, image_number: i64) -> String {
        format!(
            "{}{}{:0width$}{}",
            self.target_url_base,
            self.name_prefix,
            image_number,
            self.name_suffix,
            width = self.frame_zero_padding
        )
    }

    /// Returns the image number shown at `time`, measured from the start of
    /// the sequence.
    pub fn frame_for_time(&self, time: RationalTime) -> Result<i64> {
        if self.rate <= 0.0 || time.is_invalid() {
            return Err(Error::InvalidTime);
        }
        let index = time.value_rescaled_to(self.rate).floor();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "image indices are far below i64::MAX"
        )]
        let index = index as i64;
        Ok(self.start_frame + index * self.frame_step)
    }

    /// Returns the number of images covered by `available_range`.
    #[must_use]
    pub fn number_of_images(&self, available_range: Option<TimeRange>) -> i64 {
        let Some(range) = available_range else {
            return 0;
        };
        if self.rate <= 0.0 {
            return 0;
        }
        let count = range.duration().value_rescaled_to(self.rate).floor();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "image counts are far below i64::MAX"
        )]
        let count = count as i64;
        count.max(0)
    }

    /// Returns the number of the last image covered by `available_range`.
    #[must_use]
    pub fn end_frame(&self, available_range: Option<TimeRange>) -> i64 {
        let count = self.number_of_images(available_range);
        if count == 0 {
            return self.start_frame;
        }
        self.start_frame + (count - 1) * self.frame_step
    }
}

/// Variant-specific media reference data.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaKind {
    /// A single file or stream.
    External {
        /// Location of the media.
        target_url: String,
    },
    /// Placeholder for media that could not be found.
    Missing,
    /// Procedurally generated content such as bars or solids.
    Generator {
        /// Generator identifier, e.g. `"SMPTEBars"`.
        generator_kind: String,
        /// Generator parameters.
        parameters: Metadata,
    },
    /// A numbered sequence of images.
    ImageSequence(ImageSequence),
}

/// A media reference with its shared fields.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaReference {
    /// Display name.
    pub name: String,
    /// Free-form metadata.
    pub metadata: Metadata,
    /// Extent of the available media, if known.
    pub available_range: Option<TimeRange>,
    /// Spatial extent of the media, if known.
    pub available_image_bounds: Option<Rect>,
    /// Variant-specific data.
    pub kind: MediaKind,
}

impl Default for MediaReference {
    fn default() -> Self {
        Self::missing()
    }
}

impl MediaReference {
    /// Creates a reference of the given kind with no range or bounds.
    #[must_use]
    pub fn with_kind(kind: MediaKind) -> Self {
        Self {
            name: String::new(),
            metadata: Metadata::new(),
            available_range: None,
            available_image_bounds: None,
            kind,
        }
    }

    /// Creates an external reference.
    #[must_use]
    pub fn external(target_url: impl Into<String>) -> Self {
        Self::with_kind(MediaKind::External {
            target_url: target_url.into(),
        })
    }

    /// Creates a missing-media placeholder.
    #[must_use]
    pub fn missing() -> Self {
        Self::with_kind(MediaKind::Missing)
    }

    /// Creates a generator reference with no parameters.
    #[must_use]
    pub fn generator(generator_kind: impl Into<String>) -> Self {
        Self::with_kind(MediaKind::Generator {
            generator_kind: generator_kind.into(),
            parameters: Metadata::new(),
        })
    }

    /// Creates an image sequence reference.
    #[must_use]
    pub fn image_sequence(sequence: ImageSequence) -> Self {
        Self::with_kind(MediaKind::ImageSequence(sequence))
    }

    /// Sets the available range.
    #[must_use]
    pub fn with_available_range(mut self, range: TimeRange) -> Self {
        self.available_range = Some(range);
        self
    }

    /// Sets the available image bounds.
    #[must_use]
    pub fn with_image_bounds(mut self, bounds: Rect) -> Self {
        self.available_image_bounds = Some(bounds);
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Returns `true` for [`MediaKind::Missing`].
    #[inline]
    #[must_use]
    pub const fn is_missing_reference(&self) -> bool {
        matches!(self.kind, MediaKind::Missing)
    }

    /// Returns the target URL of an external reference.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        match &self.kind {
            MediaKind::External { target_url } => Some(target_url),
            _ => None,
        }
    }

    /// Returns the image sequence data, if this is one.
    #[must_use]
    pub const fn as_image_sequence(&self) -> Option<&ImageSequence> {
        match &self.kind {
            MediaKind::ImageSequence(seq) => Some(seq),
            _ => None,
        }
    }

    /// Returns the schema for this reference's kind.
    #[must_use]
    pub const fn schema(&self) -> Schema {
        match self.kind {
            MediaKind::External { .. } => schema::EXTERNAL_REFERENCE,
            MediaKind::Missing => schema::MISSING_REFERENCE,
            MediaKind::Generator { .. } => schema::GENERATOR_REFERENCE,
            MediaKind::ImageSequence(_) => schema::IMAGE_SEQUENCE_REFERENCE,
        }
    }

    /// Structural equality.
    ///
    /// Metadata is ignored except on missing references, where it records
    /// why the media is missing.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.kind, &other.kind) {
            (MediaKind::External { target_url: a }, MediaKind::External { target_url: b }) => {
                a == b
            }
            (MediaKind::Missing, MediaKind::Missing) => self.metadata == other.metadata,
            (
                MediaKind::Generator {
                    generator_kind: a, ..
                },
                MediaKind::Generator {
                    generator_kind: b, ..
                },
            ) => a == b,
            (MediaKind::ImageSequence(a), MediaKind::ImageSequence(b)) => {
                a.target_url_base == b.target_url_base
                    && a.name_prefix == b.name_prefix
                    && a.name_suffix == b.name_suffix
                    && a.start_frame == b.start_frame
                    && a.frame_step == b.frame_step
                    && a.rate == b.rate
            }
            _ => false,
        }
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Markers: annotated ranges attached to an item.

use alloc::string::String;
use core::fmt;

use crate::color::Color;
use crate::metadata::Metadata;
use crate::range::TimeRange;
use crate::schema::{self, Schema};

/// Named marker colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MarkerColor {
    /// `PINK`.
    Pink,
    /// `RED`.
    Red,
    /// `ORANGE`.
    Orange,
    /// `YELLOW`.
    Yellow,
    /// `GREEN`.
    #[default]
    Green,
    /// `CYAN`.
    Cyan,
    /// `BLUE`.
    Blue,
    /// `PURPLE`.
    Purple,
    /// `MAGENTA`.
    Magenta,
    /// `BLACK`.
    Black,
    /// `WHITE`.
    White,
}

impl MarkerColor {
    /// Every marker color, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Pink,
        Self::Red,
        Self::Orange,
        Self::Yellow,
        Self::Green,
        Self::Cyan,
        Self::Blue,
        Self::Purple,
        Self::Magenta,
        Self::Black,
        Self::White,
    ];

    /// Returns the interchange name, e.g. `"GREEN"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pink => "PINK",
            Self::Red => "RED",
            Self::Orange => "ORANGE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Cyan => "CYAN",
            Self::Blue => "BLUE",
            Self::Purple => "PURPLE",
            Self::Magenta => "MAGENTA",
            Self::Black => "BLACK",
            Self::White => "WHITE",
        }
    }

    /// Parses an interchange name. Unknown names map to the default, green.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .unwrap_or_default()
    }

    /// Returns the preset RGBA value for this color.
    #[must_use]
    pub const fn to_color(self) -> Color {
        match self {
            Self::Pink => Color::PINK,
            Self::Red => Color::RED,
            Self::Orange => Color::ORANGE,
            Self::Yellow => Color::YELLOW,
            Self::Green => Color::GREEN,
            Self::Cyan => Color::CYAN,
            Self::Blue => Color::BLUE,
            Self::Purple => Color::PURPLE,
            Self::Magenta => Color::MAGENTA,
            Self::Black => Color::BLACK,
            Self::White => Color::WHITE,
        }
    }
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<MarkerColor> for Color {
    fn from(c: MarkerColor) -> Self {
        c.to_color()
    }
}

/// A colored, commented range in its item's coordinate space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Marker {
    /// Display name.
    pub name: String,
    /// Free-form metadata.
    pub metadata: Metadata,
    /// Marked span, in the owning item's internal time.
    pub marked_range: TimeRange,
    /// Marker color.
    pub color: MarkerColor,
    /// User comment.
    pub comment: String,
}

impl Marker {
    /// Creates a marker with empty metadata and comment.
    #[must_use]
    pub fn new(name: impl Into<String>, marked_range: TimeRange, color: MarkerColor) -> Self {
        Self {
            name: name.into(),
            marked_range,
            color,
            ..Self::default()
        }
    }

    /// Returns [`schema::MARKER`].
    #[inline]
    #[must_use]
    pub const fn schema(&self) -> Schema {
        schema::MARKER
    }

    /// Structural equality ignoring metadata.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.name == other.name
            && self.marked_range == other.marked_range
            && self.color == other.color
            && self.comment == other.comment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Value;

    #[test]
    fn names_round_trip() {
        for c in MarkerColor::ALL {
            assert_eq!(MarkerColor::from_name(c.as_str()), c, "{c}");
        }
        assert_eq!(MarkerColor::from_name("TEAL"), MarkerColor::Green);
    }

    #[test]
    fn presets_match_colors() {
        assert_eq!(Color::from(MarkerColor::Red), Color::RED);
        assert_eq!(MarkerColor::default().to_color(), Color::GREEN);
    }

    #[test]
    fn equivalence_ignores_metadata() {
        let range = TimeRange::from_values(0.0, 10.0, 24.0);
        let a = Marker::new("cue", range, MarkerColor::Blue);
        let mut b = a.clone();
        b.metadata.insert("note".into(), Value::from("x"));
        assert!(a.is_equivalent_to(&b), "metadata is ignored");
        b.comment = "changed".into();
        assert!(!a.is_equivalent_to(&b), "comment is compared");
    }
}

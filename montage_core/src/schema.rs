// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Schema identifiers for serialisable kinds.
//!
//! Every node, marker, effect and media reference reports a [`Schema`]: a
//! name plus integer version that an interchange layer uses as its dispatch
//! key. The `Display` form is `Name.Version`, e.g. `Clip.2`.

use core::fmt;

/// A schema name and version pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Schema {
    /// Schema name, e.g. `"Track"`.
    pub name: &'static str,
    /// Schema version.
    pub version: u32,
}

impl Schema {
    /// Creates a schema identifier.
    #[inline]
    #[must_use]
    pub const fn new(name: &'static str, version: u32) -> Self {
        Self { name, version }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.version)
    }
}

// -- Node kinds --

/// `Clip.2`.
pub const CLIP: Schema = Schema::new("Clip", 2);
/// `Gap.1`.
pub const GAP: Schema = Schema::new("Gap", 1);
/// `Transition.1`.
pub const TRANSITION: Schema = Schema::new("Transition", 1);
/// `Track.1`.
pub const TRACK: Schema = Schema::new("Track", 1);
/// `Stack.1`.
pub const STACK: Schema = Schema::new("Stack", 1);
/// `Timeline.1`.
pub const TIMELINE: Schema = Schema::new("Timeline", 1);
/// `SerializableCollection.1`.
pub const SERIALIZABLE_COLLECTION: Schema = Schema::new("SerializableCollection", 1);

// -- Attached leaves --

/// `Marker.2`.
pub const MARKER: Schema = Schema::new("Marker", 2);
/// `Effect.1`.
pub const EFFECT: Schema = Schema::new("Effect", 1);
/// `TimeEffect.1`.
pub const TIME_EFFECT: Schema = Schema::new("TimeEffect", 1);
/// `LinearTimeWarp.1`.
pub const LINEAR_TIME_WARP: Schema = Schema::new("LinearTimeWarp", 1);
/// `FreezeFrame.1`.
pub const FREEZE_FRAME: Schema = Schema::new("FreezeFrame", 1);

// -- Media references --

/// `ExternalReference.1`.
pub const EXTERNAL_REFERENCE: Schema = Schema::new("ExternalReference", 1);
/// `MissingReference.1`.
pub const MISSING_REFERENCE: Schema = Schema::new("MissingReference", 1);
/// `GeneratorReference.1`.
pub const GENERATOR_REFERENCE: Schema = Schema::new("GeneratorReference", 1);
/// `ImageSequenceReference.1`.
pub const IMAGE_SEQUENCE_REFERENCE: Schema = Schema::new("ImageSequenceReference", 1);

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn display_joins_name_and_version() {
        assert_eq!(format!("{CLIP}"), "Clip.2");
        assert_eq!(format!("{SERIALIZABLE_COLLECTION}"), "SerializableCollection.1");
    }
}

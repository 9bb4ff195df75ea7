// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Effects attached to items.
//!
//! Effects do not change how the composition algorithms compute ranges; they
//! are carried for interchange and for downstream renderers.

use alloc::string::String;

use crate::metadata::Metadata;
use crate::schema::{self, Schema};

/// Effect name used for freeze frames.
pub const FREEZE_FRAME_NAME: &str = "FreezeFrame";

/// The closed set of effect variants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    /// An opaque, renderer-defined effect.
    Generic,
    /// An opaque effect that alters time.
    TimeEffect,
    /// Plays source media at `time_scalar` times normal speed.
    LinearTimeWarp {
        /// Speed multiplier. Never zero.
        time_scalar: f64,
    },
    /// Holds a single frame for the item's duration.
    FreezeFrame,
}

impl EffectKind {
    /// Returns `true` for effects that remap time.
    #[must_use]
    pub const fn is_time_effect(self) -> bool {
        !matches!(self, Self::Generic)
    }

    /// Returns the playback speed multiplier, if this kind defines one.
    #[must_use]
    pub const fn time_scalar(self) -> Option<f64> {
        match self {
            Self::LinearTimeWarp { time_scalar } => Some(time_scalar),
            Self::FreezeFrame => Some(0.0),
            Self::Generic | Self::TimeEffect => None,
        }
    }
}

/// A named effect with metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    /// Display name.
    pub name: String,
    /// Identifier understood by renderers.
    pub effect_name: String,
    /// Free-form metadata.
    pub metadata: Metadata,
    /// Variant-specific data.
    pub kind: EffectKind,
}

impl Effect {
    /// Creates a generic effect.
    #[must_use]
    pub fn new(name: impl Into<String>, effect_name: impl Into<String>) -> Self {
        Self::with_kind(name, effect_name, EffectKind::Generic)
    }

    /// Creates an effect of a given kind.
    #[must_use]
    pub fn with_kind(
        name: impl Into<String>,
        effect_name: impl Into<String>,
        kind: EffectKind,
    ) -> Self {
        Self {
            name: name.into(),
            effect_name: effect_name.into(),
            metadata: Metadata::new(),
            kind,
        }
    }

    /// Creates an opaque time effect.
    #[must_use]
    pub fn time_effect(name: impl Into<String>, effect_name: impl Into<String>) -> Self {
        Self::with_kind(name, effect_name, EffectKind::TimeEffect)
    }

    /// Creates a linear time warp. A zero scalar is treated as normal speed.
    #[must_use]
    pub fn linear_time_warp(
        name: impl Into<String>,
        effect_name: impl Into<String>,
        time_scalar: f64,
    ) -> Self {
        let time_scalar = if time_scalar == 0.0 { 1.0 } else { time_scalar };
        Self::with_kind(name, effect_name, EffectKind::LinearTimeWarp { time_scalar })
    }

    /// Creates a freeze frame.
    #[must_use]
    pub fn freeze_frame(name: impl Into<String>) -> Self {
        Self::with_kind(name, FREEZE_FRAME_NAME, EffectKind::FreezeFrame)
    }

    /// Returns the schema for this effect's kind.
    #[must_use]
    pub const fn schema(&self) -> Schema {
        match self.kind {
            EffectKind::Generic => schema::EFFECT,
            EffectKind::TimeEffect => schema::TIME_EFFECT,
            EffectKind::LinearTimeWarp { .. } => schema::LINEAR_TIME_WARP,
            EffectKind::FreezeFrame => schema::FREEZE_FRAME,
        }
    }

    /// Structural equality ignoring metadata.
    #[must_use]
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.name == other.name && self.effect_name == other.effect_name && self.kind == other.kind
    }
}

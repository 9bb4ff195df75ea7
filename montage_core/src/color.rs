// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA display colors for items and markers.

/// A straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
    /// Alpha.
    pub a: f64,
}

impl Color {
    /// Preset pink.
    pub const PINK: Self = Self::rgb(1.0, 0.42, 0.78);
    /// Preset red.
    pub const RED: Self = Self::rgb(1.0, 0.13, 0.13);
    /// Preset orange.
    pub const ORANGE: Self = Self::rgb(1.0, 0.55, 0.13);
    /// Preset yellow.
    pub const YELLOW: Self = Self::rgb(1.0, 0.87, 0.13);
    /// Preset green.
    pub const GREEN: Self = Self::rgb(0.13, 0.87, 0.13);
    /// Preset cyan.
    pub const CYAN: Self = Self::rgb(0.13, 0.87, 0.87);
    /// Preset blue.
    pub const BLUE: Self = Self::rgb(0.13, 0.55, 1.0);
    /// Preset purple.
    pub const PURPLE: Self = Self::rgb(0.55, 0.13, 1.0);
    /// Preset magenta.
    pub const MAGENTA: Self = Self::rgb(0.87, 0.13, 0.87);
    /// Preset black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Preset white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    /// Creates a color from all four components.
    #[inline]
    #[must_use]
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine time mapping.
//!
//! A [`TimeTransform`] scales a time's value, adds an offset, and optionally
//! forces the result onto a fixed rate. Transforms compose with
//! [`applied_to_transform`](TimeTransform::applied_to_transform) and can be
//! multiplied with `*` the same way.

use core::fmt;
use core::ops::Mul;

use crate::range::TimeRange;
use crate::time::RationalTime;

/// `offset + value * scale`, rescaled to `rate` when `rate > 0`.
#[derive(Clone, Copy)]
pub struct TimeTransform {
    offset: RationalTime,
    scale: f64,
    rate: f64,
}

impl TimeTransform {
    /// The transform that leaves every time unchanged.
    pub const IDENTITY: Self = Self::new(RationalTime::ZERO, 1.0, -1.0);

    /// Creates a transform.
    ///
    /// A non-positive `rate` keeps each input's own rate.
    #[inline]
    #[must_use]
    pub const fn new(offset: RationalTime, scale: f64, rate: f64) -> Self {
        Self {
            offset,
            scale,
            rate,
        }
    }

    /// Creates a pure offset.
    #[inline]
    #[must_use]
    pub const fn from_offset(offset: RationalTime) -> Self {
        Self::new(offset, 1.0, -1.0)
    }

    /// Returns the offset.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> RationalTime {
        self.offset
    }

    /// Returns the value scale.
    #[inline]
    #[must_use]
    pub const fn scale(self) -> f64 {
        self.scale
    }

    /// Returns the output rate, non-positive if the input rate is kept.
    #[inline]
    #[must_use]
    pub const fn rate(self) -> f64 {
        self.rate
    }

    /// Maps a single time.
    #[must_use]
    pub fn applied_to_time(self, time: RationalTime) -> RationalTime {
        let scaled = RationalTime::new(time.value() * self.scale, time.rate());
        let result = scaled + self.offset;
        if self.rate > 0.0 {
            result.rescaled_to(self.rate)
        } else {
            result
        }
    }

    /// Maps both ends of a range.
    #[must_use]
    pub fn applied_to_range(self, range: TimeRange) -> TimeRange {
        TimeRange::from_start_end_time(
            self.applied_to_time(range.start_time()),
            self.applied_to_time(range.end_time_exclusive()),
        )
    }

    /// Composes two transforms: offsets add and scales multiply.
    #[must_use]
    pub fn applied_to_transform(self, other: Self) -> Self {
        let rate = if self.rate > 0.0 {
            self.rate
        } else {
            other.rate
        };
        Self::new(self.offset + other.offset, self.scale * other.scale, rate)
    }
}

impl Default for TimeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for TimeTransform {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.applied_to_transform(rhs)
    }
}

impl PartialEq for TimeTransform {
    fn eq(&self, other: &Self) -> bool {
        self.offset.strictly_equal(other.offset)
            && self.scale == other.scale
            && self.rate == other.rate
    }
}

impl fmt::Debug for TimeTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimeTransform({:?}, {}, {})",
            self.offset, self.scale, self.rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_keeps_time() {
        let t = RationalTime::new(12.0, 25.0);
        let out = TimeTransform::IDENTITY.applied_to_time(t);
        assert!(out.strictly_equal(t), "{out:?}");
    }

    #[test]
    fn offset_and_scale() {
        let tx = TimeTransform::new(RationalTime::new(10.0, 24.0), 2.0, -1.0);
        let out = tx.applied_to_time(RationalTime::new(5.0, 24.0));
        assert!(out.strictly_equal(RationalTime::new(20.0, 24.0)), "{out:?}");
    }

    #[test]
    fn fixed_rate_rescales_output() {
        let tx = TimeTransform::new(RationalTime::ZERO, 1.0, 48.0);
        let out = tx.applied_to_time(RationalTime::new(24.0, 24.0));
        assert_eq!(out.rate(), 48.0);
        assert_eq!(out.value(), 48.0);
    }

    #[test]
    fn unset_rate_keeps_the_sum_rate() {
        let tx = TimeTransform::from_offset(RationalTime::new(1.0, 48.0));
        let out = tx.applied_to_time(RationalTime::new(24.0, 24.0));
        assert!(out.strictly_equal(RationalTime::new(49.0, 48.0)), "{out:?}");

        let from_unset = tx.applied_to_time(RationalTime::new(3.0, 0.0));
        assert!(
            from_unset.strictly_equal(RationalTime::new(1.0, 48.0)),
            "rateless input is dropped by the sum, not rescaled to 0: {from_unset:?}"
        );
    }

    #[test]
    fn range_endpoints_move_together() {
        let tx = TimeTransform::from_offset(RationalTime::new(100.0, 24.0));
        let r = tx.applied_to_range(TimeRange::from_values(0.0, 10.0, 24.0));
        assert_eq!(r, TimeRange::from_values(100.0, 10.0, 24.0));
    }

    #[test]
    fn composition_adds_offsets_and_multiplies_scales() {
        let a = TimeTransform::new(RationalTime::new(1.0, 24.0), 2.0, -1.0);
        let b = TimeTransform::new(RationalTime::new(3.0, 24.0), 3.0, 30.0);
        let c = a * b;
        assert!(c.offset().strictly_equal(RationalTime::new(4.0, 24.0)), "offset");
        assert_eq!(c.scale(), 6.0);
        assert_eq!(c.rate(), 30.0, "rate falls back to the inner transform");
        assert_eq!(a.applied_to_transform(b), c);
    }
}

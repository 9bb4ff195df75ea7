// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Half-open time ranges.
//!
//! A [`TimeRange`] covers `[start, start + duration)`. Boundary predicates
//! ([`intersects`](TimeRange::intersects), [`meets`](TimeRange::meets), …)
//! compare in seconds against a caller-supplied tolerance so that ranges
//! computed at different rates do not register spurious overlaps at shared
//! edges. [`DEFAULT_EPSILON`] is finer than one sample at 192 kHz.

use core::fmt;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::time::RationalTime;

/// Default boundary tolerance in seconds: half a sample at 192 kHz.
pub const DEFAULT_EPSILON: f64 = 1.0 / (2.0 * 192_000.0);

/// `lhs` exceeds `rhs` by at least `epsilon`.
#[inline]
fn greater_than(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    lhs - rhs >= epsilon
}

/// `lhs` is below `rhs` by at least `epsilon`.
#[inline]
fn less_than(lhs: f64, rhs: f64, epsilon: f64) -> bool {
    rhs - lhs >= epsilon
}

/// A `(start, duration)` pair covering `[start, start + duration)`.
///
/// Equality is approximate: two ranges are equal when their starts and
/// durations each differ by less than [`DEFAULT_EPSILON`] seconds.
#[derive(Clone, Copy, Default)]
pub struct TimeRange {
    start: RationalTime,
    duration: RationalTime,
}

impl TimeRange {
    /// Creates a range from a start time and duration.
    #[inline]
    #[must_use]
    pub const fn new(start: RationalTime, duration: RationalTime) -> Self {
        Self { start, duration }
    }

    /// Creates a zero-length range at `start`.
    #[inline]
    #[must_use]
    pub const fn from_start_time(start: RationalTime) -> Self {
        Self::new(start, RationalTime::new(0.0, start.rate()))
    }

    /// Creates a range with start and duration sharing one rate.
    #[inline]
    #[must_use]
    pub const fn from_values(start: f64, duration: f64, rate: f64) -> Self {
        Self::new(RationalTime::new(start, rate), RationalTime::new(duration, rate))
    }

    /// Creates the range between `start` and an exclusive `end`.
    #[must_use]
    pub fn from_start_end_time(start: RationalTime, end_exclusive: RationalTime) -> Self {
        Self::new(
            start,
            RationalTime::duration_from_start_end_time(start, end_exclusive),
        )
    }

    /// Creates the range between `start` and an inclusive `end`.
    #[must_use]
    pub fn from_start_end_time_inclusive(start: RationalTime, end_inclusive: RationalTime) -> Self {
        Self::new(
            start,
            RationalTime::duration_from_start_end_time_inclusive(start, end_inclusive),
        )
    }

    /// Returns the start time.
    #[inline]
    #[must_use]
    pub const fn start_time(self) -> RationalTime {
        self.start
    }

    /// Returns the duration.
    #[inline]
    #[must_use]
    pub const fn duration(self) -> RationalTime {
        self.duration
    }

    /// Returns `true` if both times are valid and the duration is non-negative.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.start.is_valid() && self.duration.is_valid() && self.duration.value() >= 0.0
    }

    // -- End points --

    /// Returns the first instant after the range, at the duration's rate.
    #[must_use]
    pub fn end_time_exclusive(self) -> RationalTime {
        self.duration + self.start.rescaled_to(self.duration.rate())
    }

    /// Returns the last whole unit inside the range.
    ///
    /// Ranges no longer than one unit report their start.
    #[must_use]
    pub fn end_time_inclusive(self) -> RationalTime {
        let end = self.end_time_exclusive();
        let rate = self.duration.rate();
        if (end - self.start.rescaled_to(rate)).value() > 1.0 {
            if self.duration.value() != self.duration.value().floor() {
                end.floor()
            } else {
                end - RationalTime::new(1.0, rate)
            }
        } else {
            self.start
        }
    }

    // -- Derived ranges --

    /// Returns this range with `other` added to its duration.
    #[must_use]
    pub fn duration_extended_by(self, other: RationalTime) -> Self {
        Self::new(self.start, self.duration + other)
    }

    /// Returns the smallest range covering both `self` and `other`.
    #[must_use]
    pub fn extended_by(self, other: Self) -> Self {
        let start = if other.start < self.start {
            other.start
        } else {
            self.start
        };
        let this_end = self.end_time_exclusive();
        let other_end = other.end_time_exclusive();
        let end = if other_end > this_end {
            other_end
        } else {
            this_end
        };
        Self::from_start_end_time(start, end)
    }

    /// Clamps `time` into `[start, end_time_inclusive]`.
    #[must_use]
    pub fn clamped_time(self, time: RationalTime) -> RationalTime {
        let mut result = time;
        if result < self.start {
            result = self.start;
        }
        let end = self.end_time_inclusive();
        if result > end {
            result = end;
        }
        result
    }

    /// Clamps `other` so that it lies within this range.
    #[must_use]
    pub fn clamped_range(self, other: Self) -> Self {
        let start = if self.start > other.start {
            self.start
        } else {
            other.start
        };
        let shifted_end = Self::new(start, other.duration).end_time_exclusive();
        let this_end = self.end_time_exclusive();
        let end = if this_end < shifted_end {
            this_end
        } else {
            shifted_end
        };
        Self::new(start, end - start)
    }

    // -- Predicates --

    /// Returns `true` if `time` lies in `[start, end_time_exclusive)`.
    #[must_use]
    pub fn contains(self, time: RationalTime) -> bool {
        self.start <= time && time < self.end_time_exclusive()
    }

    /// Returns `true` if `other` starts after and ends before this range.
    #[must_use]
    pub fn contains_range(self, other: Self, epsilon: f64) -> bool {
        let (this_start, this_end) = self.seconds();
        let (other_start, other_end) = other.seconds();
        greater_than(other_start, this_start, epsilon) && less_than(other_end, this_end, epsilon)
    }

    /// Returns `true` if this range starts before `other` and ends inside it.
    #[must_use]
    pub fn overlaps_range(self, other: Self, epsilon: f64) -> bool {
        let (this_start, this_end) = self.seconds();
        let (other_start, other_end) = other.seconds();
        less_than(this_start, other_start, epsilon)
            && greater_than(this_end, other_start, epsilon)
            && greater_than(other_end, this_end, epsilon)
    }

    /// Returns `true` if this range ends strictly before `other` starts.
    #[must_use]
    pub fn before(self, other: Self, epsilon: f64) -> bool {
        greater_than(other.start.to_seconds(), self.end_seconds(), epsilon)
    }

    /// Returns `true` if this range ends strictly before `time`.
    #[must_use]
    pub fn before_time(self, time: RationalTime, epsilon: f64) -> bool {
        less_than(self.end_seconds(), time.to_seconds(), epsilon)
    }

    /// Returns `true` if `other` starts within `epsilon` after this range ends.
    #[must_use]
    pub fn meets(self, other: Self, epsilon: f64) -> bool {
        let gap = other.start.to_seconds() - self.end_seconds();
        (0.0..=epsilon).contains(&gap)
    }

    /// Returns `true` if both ranges start together and this one ends first.
    #[must_use]
    pub fn begins(self, other: Self, epsilon: f64) -> bool {
        let (this_start, this_end) = self.seconds();
        let (other_start, other_end) = other.seconds();
        (other_start - this_start).abs() <= epsilon && less_than(this_end, other_end, epsilon)
    }

    /// Returns `true` if this range starts at `time`.
    #[must_use]
    pub fn begins_at(self, time: RationalTime, epsilon: f64) -> bool {
        (time.to_seconds() - self.start.to_seconds()).abs() <= epsilon
    }

    /// Returns `true` if both ranges end together and this one starts later.
    #[must_use]
    pub fn finishes(self, other: Self, epsilon: f64) -> bool {
        let (this_start, this_end) = self.seconds();
        let (other_start, other_end) = other.seconds();
        (this_end - other_end).abs() <= epsilon && greater_than(this_start, other_start, epsilon)
    }

    /// Returns `true` if this range ends at `time`.
    #[must_use]
    pub fn finishes_at(self, time: RationalTime, epsilon: f64) -> bool {
        (self.end_seconds() - time.to_seconds()).abs() <= epsilon
    }

    /// Returns `true` if the ranges share more than `epsilon` seconds.
    #[must_use]
    pub fn intersects(self, other: Self, epsilon: f64) -> bool {
        let (this_start, this_end) = self.seconds();
        let (other_start, other_end) = other.seconds();
        less_than(this_start, other_end, epsilon) && greater_than(this_end, other_start, epsilon)
    }

    /// Returns the overlap of two ranges, or `None` if they do not intersect.
    #[must_use]
    pub fn intersection(self, other: Self, epsilon: f64) -> Option<Self> {
        if !self.intersects(other, epsilon) {
            return None;
        }
        let start = if self.start > other.start {
            self.start
        } else {
            other.start
        };
        let this_end = self.end_time_exclusive();
        let other_end = other.end_time_exclusive();
        let end = if this_end < other_end {
            this_end
        } else {
            other_end
        };
        Some(Self::from_start_end_time(start, end))
    }

    fn end_seconds(self) -> f64 {
        self.end_time_exclusive().to_seconds()
    }

    fn seconds(self) -> (f64, f64) {
        (self.start.to_seconds(), self.end_seconds())
    }
}

impl PartialEq for TimeRange {
    fn eq(&self, other: &Self) -> bool {
        let start = self.start - other.start;
        let duration = self.duration - other.duration;
        start.to_seconds().abs() < DEFAULT_EPSILON && duration.to_seconds().abs() < DEFAULT_EPSILON
    }
}

impl fmt::Debug for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeRange({:?}, {:?})", self.start, self.duration)
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rational time values.
//!
//! [`RationalTime`] is a `value / rate` pair measured in seconds. It can
//! represent either an instant or a duration; which one is up to the caller.
//!
//! Values with a non-positive rate or a NaN field are *invalid*. Invalid
//! values are never rejected by arithmetic: they propagate until a consumer
//! that needs validity (timecode formatting, range construction) reports an
//! [`Error`](crate::Error).
//!
//! Mixed-rate arithmetic resolves to the higher of the two rates so that no
//! resolution is lost.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Frame rates that have a standard SMPTE timecode representation.
pub const SMPTE_TIMECODE_RATES: [f64; 8] = [23.976, 24.0, 25.0, 29.97, 30.0, 50.0, 59.94, 60.0];

/// Tolerance used when matching a rate against [`SMPTE_TIMECODE_RATES`].
const RATE_TOLERANCE: f64 = 0.01;

/// A point in time or a duration, expressed as `value / rate` seconds.
///
/// Equality and ordering are rate-independent: `24@24 == 48@48`. Use
/// [`strictly_equal`](Self::strictly_equal) to compare both fields verbatim.
#[derive(Clone, Copy)]
pub struct RationalTime {
    value: f64,
    rate: f64,
}

impl RationalTime {
    /// Zero at rate 1.
    pub const ZERO: Self = Self::new(0.0, 1.0);

    /// Creates a time from a value and rate.
    #[inline]
    #[must_use]
    pub const fn new(value: f64, rate: f64) -> Self {
        Self { value, rate }
    }

    /// Returns the value in units of `1 / rate` seconds.
    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.value
    }

    /// Returns the rate in units per second.
    #[inline]
    #[must_use]
    pub const fn rate(self) -> f64 {
        self.rate
    }

    /// Returns `true` if the rate is positive and neither field is NaN.
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        !self.value.is_nan() && !self.rate.is_nan() && self.rate > 0.0
    }

    /// Returns `true` if this time cannot be used for computation.
    #[inline]
    #[must_use]
    pub const fn is_invalid(self) -> bool {
        !self.is_valid()
    }

    // -- Rescaling --

    /// Returns the value expressed at `new_rate`.
    ///
    /// Exact when the rates already match.
    #[inline]
    #[must_use]
    pub fn value_rescaled_to(self, new_rate: f64) -> f64 {
        if new_rate == self.rate {
            self.value
        } else {
            (self.value * new_rate) / self.rate
        }
    }

    /// Returns the same instant expressed at `new_rate`.
    #[inline]
    #[must_use]
    pub fn rescaled_to(self, new_rate: f64) -> Self {
        Self::new(self.value_rescaled_to(new_rate), new_rate)
    }

    /// Returns the same instant expressed at `other`'s rate.
    #[inline]
    #[must_use]
    pub fn rescaled_to_rate_of(self, other: Self) -> Self {
        self.rescaled_to(other.rate)
    }

    // -- Comparison --

    /// Compares both fields verbatim, without rescaling.
    #[inline]
    #[must_use]
    pub fn strictly_equal(self, other: Self) -> bool {
        self.value == other.value && self.rate == other.rate
    }

    /// Returns `true` if the values differ by at most `delta` at `other`'s rate.
    #[inline]
    #[must_use]
    pub fn almost_equal(self, other: Self, delta: f64) -> bool {
        (self.value_rescaled_to(other.rate) - other.value).abs() <= delta
    }

    // -- Rounding --

    /// Rounds the value down, keeping the rate.
    #[inline]
    #[must_use]
    pub fn floor(self) -> Self {
        Self::new(self.value.floor(), self.rate)
    }

    /// Rounds the value up, keeping the rate.
    #[inline]
    #[must_use]
    pub fn ceil(self) -> Self {
        Self::new(self.value.ceil(), self.rate)
    }

    /// Rounds the value to the nearest integer, keeping the rate.
    #[inline]
    #[must_use]
    pub fn round(self) -> Self {
        Self::new(self.value.round(), self.rate)
    }

    // -- Conversions --

    /// Creates a time from a frame number, discarding any fractional part.
    #[inline]
    #[must_use]
    pub fn from_frames(frame: f64, rate: f64) -> Self {
        Self::new(trunc(frame), rate)
    }

    /// Creates a time from seconds, expressed at `rate`.
    #[inline]
    #[must_use]
    pub fn from_seconds(seconds: f64, rate: f64) -> Self {
        Self::new(seconds, 1.0).rescaled_to(rate)
    }

    /// Returns the whole number of frames at the time's own rate.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "frame counts are truncated toward zero by definition"
    )]
    pub fn to_frames(self) -> i64 {
        self.value as i64
    }

    /// Returns the whole number of frames at `rate`.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "frame counts are truncated toward zero by definition"
    )]
    pub fn to_frames_at(self, rate: f64) -> i64 {
        self.value_rescaled_to(rate) as i64
    }

    /// Returns the time in seconds.
    #[inline]
    #[must_use]
    pub fn to_seconds(self) -> f64 {
        self.value_rescaled_to(1.0)
    }

    // -- Durations --

    /// Returns the duration between `start` and an exclusive `end`, at `start`'s rate.
    #[must_use]
    pub fn duration_from_start_end_time(start: Self, end_exclusive: Self) -> Self {
        Self::new(end_exclusive.value_rescaled_to(start.rate) - start.value, start.rate)
    }

    /// Returns the duration between `start` and an inclusive `end`, at `start`'s rate.
    ///
    /// One unit longer than [`duration_from_start_end_time`](Self::duration_from_start_end_time).
    #[must_use]
    pub fn duration_from_start_end_time_inclusive(start: Self, end_inclusive: Self) -> Self {
        Self::new(
            end_inclusive.value_rescaled_to(start.rate) - start.value + 1.0,
            start.rate,
        )
    }

    // -- SMPTE rates --

    /// Returns `true` if `rate` is within 0.01 of a standard SMPTE timecode rate.
    #[must_use]
    pub fn is_smpte_timecode_rate(rate: f64) -> bool {
        SMPTE_TIMECODE_RATES
            .iter()
            .any(|r| (rate - r).abs() < RATE_TOLERANCE)
    }

    /// Returns the SMPTE timecode rate closest to `rate`.
    #[must_use]
    pub fn nearest_smpte_timecode_rate(rate: f64) -> f64 {
        let mut nearest = SMPTE_TIMECODE_RATES[0];
        let mut min_diff = (rate - nearest).abs();
        for &r in &SMPTE_TIMECODE_RATES[1..] {
            let diff = (rate - r).abs();
            if diff < min_diff {
                min_diff = diff;
                nearest = r;
            }
        }
        nearest
    }
}

/// Truncates toward zero using only `floor`/`ceil`.
fn trunc(x: f64) -> f64 {
    if x < 0.0 { x.ceil() } else { x.floor() }
}

impl Default for RationalTime {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for RationalTime {
    fn eq(&self, other: &Self) -> bool {
        self.value_rescaled_to(other.rate) == other.value
    }
}

impl PartialOrd for RationalTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (self.value / self.rate).partial_cmp(&(other.value / other.rate))
    }
}

impl Add for RationalTime {
    type Output = Self;

    /// Adds at the higher of the two rates.
    ///
    /// An operand with a non-positive rate is ignored and the other operand
    /// is returned unchanged.
    fn add(self, rhs: Self) -> Self {
        if self.rate <= 0.0 {
            return rhs;
        }
        if rhs.rate <= 0.0 {
            return self;
        }
        if self.rate < rhs.rate {
            Self::new(self.value_rescaled_to(rhs.rate) + rhs.value, rhs.rate)
        } else {
            Self::new(self.value + rhs.value_rescaled_to(self.rate), self.rate)
        }
    }
}

impl Sub for RationalTime {
    type Output = Self;

    /// Subtracts at the higher of the two rates.
    fn sub(self, rhs: Self) -> Self {
        if self.rate < rhs.rate {
            Self::new(self.value_rescaled_to(rhs.rate) - rhs.value, rhs.rate)
        } else {
            Self::new(self.value - rhs.value_rescaled_to(self.rate), self.rate)
        }
    }
}

impl AddAssign for RationalTime {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for RationalTime {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for RationalTime {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.value, self.rate)
    }
}

impl fmt::Debug for RationalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RationalTime({}@{})", self.value, self.rate)
    }
}

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! SMPTE timecode and clock-style time strings.
//!
//! Timecode is `HH:MM:SS:FF` for non-drop rates and `HH:MM:SS;FF` for
//! drop-frame rates (29.97 and 59.94). Drop-frame labels skip frame numbers
//! `00` and `01` (or `00`..`03` at 59.94) at the start of every minute
//! except each tenth minute, so that the label tracks wall-clock time.
//!
//! Time strings are `[-]HH:MM:SS[.frac]` with no frame component.

use alloc::format;
use alloc::string::String;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::{Error, Result};
use crate::time::RationalTime;

/// Whether a timecode uses drop-frame numbering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DropFramePolicy {
    /// Never drop frames.
    ForceNo,
    /// Always drop frames.
    ForceYes,
    /// Drop frames at 29.97 and 59.94 only.
    #[default]
    InferFromRate,
}

impl DropFramePolicy {
    /// Resolves the policy for a concrete rate.
    #[must_use]
    pub fn is_drop_frame(self, rate: f64) -> bool {
        match self {
            Self::ForceNo => false,
            Self::ForceYes => true,
            Self::InferFromRate => is_drop_frame_rate(rate),
        }
    }
}

/// Returns `true` for the NTSC rates that conventionally use drop-frame timecode.
#[must_use]
pub fn is_drop_frame_rate(rate: f64) -> bool {
    (rate - 29.97).abs() < 0.01 || (rate - 59.94).abs() < 0.01
}

/// Frame-dropping parameters for a nominal (integer) rate.
#[derive(Clone, Copy, Debug)]
struct DropPattern {
    /// Labels skipped at the top of each non-tenth minute.
    dropped: i64,
    /// Real frames in a minute that drops labels.
    per_minute: i64,
    /// Real frames in a ten-minute block.
    per_ten_minutes: i64,
}

impl DropPattern {
    /// Returns `None` if the nominal rate is too large to count minutes in.
    fn for_nominal(nominal: i64) -> Option<Self> {
        let dropped = if nominal >= 60 { 4 } else { 2 };
        let per_minute = nominal.checked_mul(60)? - dropped;
        Some(Self {
            dropped,
            per_minute,
            per_ten_minutes: per_minute.checked_mul(10)?.checked_add(dropped)?,
        })
    }

    /// Maps a real frame count to the label-space frame count.
    fn frames_to_labels(self, frames: i64) -> Option<i64> {
        let blocks = frames / self.per_ten_minutes;
        let rem = frames % self.per_ten_minutes;
        let skipped_minutes = if rem > self.dropped {
            (rem - self.dropped) / self.per_minute
        } else {
            0
        };
        let per_block = (9 * self.dropped).checked_mul(blocks)?;
        frames
            .checked_add(per_block)?
            .checked_add(self.dropped * skipped_minutes)
    }

    /// Maps a label-space position back to a real frame count.
    fn labels_to_frames(self, total_minutes: i64, labels: i64) -> Option<i64> {
        let skipped = self
            .dropped
            .checked_mul(total_minutes - total_minutes / 10)?;
        labels.checked_sub(skipped)
    }
}

/// 2^63, the first value past the `i64` frame count range.
const FRAME_LIMIT: f64 = 9.223_372_036_854_776e18;

fn overflow() -> Error {
    Error::InvalidTimecode(String::from("frame count out of range"))
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "nominal rates are small positive integers"
)]
fn nominal_rate(rate: f64) -> Result<i64> {
    if rate.is_nan() || rate <= 0.0 {
        return Err(Error::InvalidTimecode(format!("invalid rate {rate}")));
    }
    let nominal = rate.round() as i64;
    if nominal < 1 {
        return Err(Error::InvalidTimecode(format!("rate {rate} too low for timecode")));
    }
    Ok(nominal)
}

impl RationalTime {
    /// Formats this time as SMPTE timecode at `rate`.
    ///
    /// The time is rescaled to `rate` and rounded to a whole frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTime`] for an invalid time and
    /// [`Error::InvalidTimecode`] for a negative frame count or unusable rate.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "the rounded frame count is range-checked against i64 first"
    )]
    pub fn to_timecode(self, rate: f64, policy: DropFramePolicy) -> Result<String> {
        if self.is_invalid() {
            return Err(Error::InvalidTime);
        }
        let nominal = nominal_rate(rate)?;
        let scaled = self.value_rescaled_to(rate).round();
        if !scaled.is_finite() || scaled.abs() >= FRAME_LIMIT {
            return Err(overflow());
        }
        let total = scaled as i64;
        if total < 0 {
            return Err(Error::InvalidTimecode(format!(
                "negative timecode ({total} frames)"
            )));
        }

        let (labels, separator) = if policy.is_drop_frame(rate) {
            let labels = DropPattern::for_nominal(nominal)
                .and_then(|pattern| pattern.frames_to_labels(total))
                .ok_or_else(overflow)?;
            (labels, ';')
        } else {
            (total, ':')
        };

        let frames = labels % nominal;
        let seconds = (labels / nominal) % 60;
        let minutes = (labels / nominal / 60) % 60;
        let hours = labels / nominal / 3600;
        Ok(format!(
            "{hours:02}:{minutes:02}:{seconds:02}{separator}{frames:02}"
        ))
    }

    /// Formats this time as timecode at its own rate, inferring drop-frame.
    ///
    /// # Errors
    ///
    /// See [`to_timecode`](Self::to_timecode).
    pub fn to_timecode_auto(self) -> Result<String> {
        self.to_timecode(self.rate(), DropFramePolicy::InferFromRate)
    }

    /// Rounds to the nearest frame before formatting.
    ///
    /// # Errors
    ///
    /// See [`to_timecode`](Self::to_timecode).
    pub fn to_nearest_timecode(self, rate: f64, policy: DropFramePolicy) -> Result<String> {
        self.round().to_timecode(rate, policy)
    }

    /// Parses `[-]H:MM:SS:FF` or `[-]H:MM:SS;FF` at `rate`.
    ///
    /// A `;` before the frame field selects drop-frame decoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimecode`] if the string is malformed or the
    /// rate is unusable.
    pub fn from_timecode(timecode: &str, rate: f64) -> Result<Self> {
        let malformed = || Error::InvalidTimecode(format!("malformed timecode {timecode:?}"));
        let (negative, body) = split_sign(timecode);
        let mut fields = body.splitn(3, ':');
        let hours = fields.next().and_then(|s| digits(s, 1, 2)).ok_or_else(malformed)?;
        let minutes = fields.next().and_then(|s| digits(s, 2, 2)).ok_or_else(malformed)?;
        let tail = fields.next().ok_or_else(malformed)?;
        if tail.len() < 5 || !tail.is_char_boundary(2) || !tail.is_char_boundary(3) {
            return Err(malformed());
        }
        let seconds = digits(&tail[..2], 2, 2).ok_or_else(malformed)?;
        let drop_frame = match &tail[2..3] {
            ";" => true,
            ":" => false,
            _ => return Err(malformed()),
        };
        let frames = digits(&tail[3..], 2, usize::MAX).ok_or_else(malformed)?;

        let nominal = nominal_rate(rate)?;
        let total_minutes = hours * 60 + minutes;
        let labels = (total_minutes * 60 + seconds)
            .checked_mul(nominal)
            .and_then(|l| l.checked_add(frames))
            .ok_or_else(overflow)?;
        let total = if drop_frame {
            DropPattern::for_nominal(nominal)
                .and_then(|pattern| pattern.labels_to_frames(total_minutes, labels))
                .ok_or_else(overflow)?
        } else {
            labels
        };

        let value = total as f64;
        Ok(Self::new(if negative { -value } else { value }, rate))
    }

    /// Formats this time as `[-]HH:MM:SS.frac` with microsecond precision.
    ///
    /// Trailing zeros of the fraction are dropped; a whole second prints `.0`.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "microsecond counts saturate at i64 bounds"
    )]
    pub fn to_time_string(self) -> String {
        let seconds = self.to_seconds();
        let negative = seconds < 0.0;
        let micros = (seconds.abs() * 1_000_000.0).round() as i64;

        let whole = micros / 1_000_000;
        let frac = micros % 1_000_000;
        let hours = whole / 3600;
        let minutes = (whole / 60) % 60;
        let secs = whole % 60;

        let mut frac_str = format!("{frac:06}");
        while frac_str.len() > 1 && frac_str.ends_with('0') {
            frac_str.pop();
        }
        let sign = if negative { "-" } else { "" };
        format!("{sign}{hours:02}:{minutes:02}:{secs:02}.{frac_str}")
    }

    /// Parses `[-]H:MM:SS[.frac]` into a time at `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimecode`] if the string is malformed.
    pub fn from_time_string(time_string: &str, rate: f64) -> Result<Self> {
        let malformed = || Error::InvalidTimecode(format!("malformed time string {time_string:?}"));
        let (negative, body) = split_sign(time_string);
        let mut fields = body.splitn(3, ':');
        let hours = fields
            .next()
            .and_then(|s| digits(s, 1, usize::MAX))
            .ok_or_else(malformed)?;
        let minutes = fields.next().and_then(|s| digits(s, 2, 2)).ok_or_else(malformed)?;
        let seconds = fields.next().and_then(decimal_seconds).ok_or_else(malformed)?;

        let total = hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds;
        Ok(Self::from_seconds(if negative { -total } else { total }, rate))
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

/// Parses an all-digit field whose length lies in `min..=max`.
fn digits(s: &str, min: usize, max: usize) -> Option<i64> {
    if s.len() < min || s.len() > max || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses `SS` or `SS.fff` with at least one digit on each side of the point.
fn decimal_seconds(s: &str) -> Option<f64> {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || frac_part.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_drop_round_trip() {
        let t = RationalTime::new(86400.0, 24.0);
        let tc = t.to_timecode(24.0, DropFramePolicy::ForceNo).unwrap();
        assert_eq!(tc, "01:00:00:00");
        let back = RationalTime::from_timecode(&tc, 24.0).unwrap();
        assert!(back.strictly_equal(t), "got {back:?}");
    }

    #[test]
    fn drop_frame_skips_labels_at_minute_boundaries() {
        let t = RationalTime::new(1800.0, 29.97);
        let tc = t.to_timecode(29.97, DropFramePolicy::InferFromRate).unwrap();
        assert_eq!(tc, "00:01:00;02");
        assert_eq!(
            RationalTime::new(1799.0, 29.97)
                .to_timecode(29.97, DropFramePolicy::InferFromRate)
                .unwrap(),
            "00:00:59;29"
        );
        assert_eq!(
            RationalTime::new(17982.0, 29.97)
                .to_timecode(29.97, DropFramePolicy::ForceYes)
                .unwrap(),
            "00:10:00;00",
            "tenth minute keeps its first labels"
        );
        let back = RationalTime::from_timecode("00:01:00;02", 29.97).unwrap();
        assert_eq!(back.value(), 1800.0);
    }

    #[test]
    fn drop_frame_round_trips_over_an_hour() {
        for rate in [29.97, 59.94] {
            let mut frame = 0.0;
            while frame < 240_000.0 {
                let t = RationalTime::new(frame, rate);
                let tc = t.to_timecode(rate, DropFramePolicy::InferFromRate).unwrap();
                assert!(tc.contains(';'), "{tc} should be drop-frame");
                let back = RationalTime::from_timecode(&tc, rate).unwrap();
                assert_eq!(back.value(), frame, "{tc} at {rate}");
                frame += 997.0;
            }
        }
    }

    #[test]
    fn infer_policy_only_drops_ntsc_rates() {
        let t = RationalTime::new(30.0, 30.0);
        let tc = t.to_timecode(30.0, DropFramePolicy::InferFromRate).unwrap();
        assert_eq!(tc, "00:00:01:00");
        assert!(DropFramePolicy::InferFromRate.is_drop_frame(59.94), "59.94");
        assert!(!DropFramePolicy::InferFromRate.is_drop_frame(25.0), "25");
    }

    #[test]
    fn negative_frame_counts_are_rejected() {
        let t = RationalTime::new(-10.0, 24.0);
        assert!(matches!(
            t.to_timecode(24.0, DropFramePolicy::ForceNo),
            Err(Error::InvalidTimecode(_))
        ));
        assert!(matches!(
            t.to_timecode(29.97, DropFramePolicy::ForceYes),
            Err(Error::InvalidTimecode(_))
        ));
    }

    #[test]
    fn invalid_time_and_rate_are_rejected() {
        let bad = RationalTime::new(1.0, 0.0);
        assert_eq!(bad.to_timecode_auto(), Err(Error::InvalidTime));
        let ok = RationalTime::new(1.0, 24.0);
        assert!(matches!(
            ok.to_timecode(0.0, DropFramePolicy::ForceNo),
            Err(Error::InvalidTimecode(_))
        ));
    }

    #[test]
    fn frame_counts_beyond_i64_are_rejected() {
        for (rate, policy) in [
            (29.97, DropFramePolicy::InferFromRate),
            (59.94, DropFramePolicy::ForceYes),
            (24.0, DropFramePolicy::ForceNo),
        ] {
            let huge = RationalTime::new(1e30, rate);
            assert!(
                matches!(huge.to_timecode(rate, policy), Err(Error::InvalidTimecode(_))),
                "1e30 frames at {rate}"
            );
            let inf = RationalTime::new(f64::INFINITY, rate);
            assert!(
                matches!(inf.to_timecode(rate, policy), Err(Error::InvalidTimecode(_))),
                "infinite frames at {rate}"
            );
        }
    }

    #[test]
    fn drop_frame_labels_near_i64_limit_are_rejected() {
        // Fits in i64 as a frame count, but the skipped labels push it over.
        let t = RationalTime::new(9.22e18, 29.97);
        assert!(
            matches!(
                t.to_timecode(29.97, DropFramePolicy::ForceYes),
                Err(Error::InvalidTimecode(_))
            ),
            "label count overflows"
        );
        let ok = RationalTime::new(9.22e18, 24.0).to_timecode(24.0, DropFramePolicy::ForceNo);
        assert!(ok.is_ok(), "non-drop still fits: {ok:?}");
    }

    #[test]
    fn unusable_rates_are_rejected() {
        let t = RationalTime::new(10.0, 24.0);
        for rate in [0.0, -24.0, f64::NAN, 0.4, f64::INFINITY] {
            assert!(
                matches!(
                    t.to_timecode(rate, DropFramePolicy::ForceYes),
                    Err(Error::InvalidTimecode(_))
                ),
                "formatting at {rate}"
            );
            assert!(
                matches!(
                    RationalTime::from_timecode("00:00:01;00", rate),
                    Err(Error::InvalidTimecode(_))
                ),
                "parsing at {rate}"
            );
        }
    }

    #[test]
    fn oversized_fields_are_rejected() {
        for tc in [
            "00:00:00:99999999999999999999",
            "99:59:59:9223372036854775807",
            "99:59:59;9223372036854775807",
        ] {
            assert!(
                RationalTime::from_timecode(tc, 29.97).is_err(),
                "{tc:?} should not parse"
            );
        }
        let huge_rate = RationalTime::from_timecode("01:00:00:00", 1e18);
        assert!(huge_rate.is_err(), "label count at 1e18 fps overflows");
    }

    #[test]
    fn parse_rejects_malformed_timecode() {
        for tc in ["", "1:2:3:4", "00:00:00", "00:00:00-00", "000:00:00:00", "00:00:00:0", "aa:00:00:00"] {
            assert!(
                RationalTime::from_timecode(tc, 24.0).is_err(),
                "{tc:?} should not parse"
            );
        }
    }

    #[test]
    fn parse_honours_sign() {
        let t = RationalTime::from_timecode("-00:00:01:12", 24.0).unwrap();
        assert_eq!(t.value(), -36.0);
    }

    #[test]
    fn nearest_timecode_rounds_first() {
        let t = RationalTime::new(23.6, 24.0);
        assert_eq!(
            t.to_nearest_timecode(24.0, DropFramePolicy::ForceNo).unwrap(),
            "00:00:01:00"
        );
    }

    #[test]
    fn time_strings() {
        assert_eq!(RationalTime::new(36.0, 24.0).to_time_string(), "00:00:01.5");
        assert_eq!(RationalTime::new(86400.0, 24.0).to_time_string(), "01:00:00.0");
        assert_eq!(RationalTime::new(-12.0, 24.0).to_time_string(), "-00:00:00.5");

        let t = RationalTime::from_time_string("01:00:02.5", 24.0).unwrap();
        assert_eq!(t.value(), 86460.0);
        let t = RationalTime::from_time_string("-0:00:01", 24.0).unwrap();
        assert_eq!(t.value(), -24.0);
        assert!(RationalTime::from_time_string("1:2:3", 24.0).is_err(), "short minutes");
        assert!(RationalTime::from_time_string("1:00:03.", 24.0).is_err(), "empty fraction");
    }
}

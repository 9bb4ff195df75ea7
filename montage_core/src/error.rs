// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recoverable error conditions.
//!
//! Time arithmetic never fails eagerly: malformed values propagate as invalid
//! [`RationalTime`](crate::time::RationalTime)s and only surface here at the
//! points that require validity (timecode conversion, range queries). Stale
//! [`NodeId`](crate::node::NodeId) handles are programming errors and panic
//! instead.

use alloc::string::String;

use crate::node::NodeKind;

/// Result type for `montage_core` operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error conditions reported by the time model and the node store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A time value was NaN or had a non-positive rate where a valid time is required.
    #[error("invalid time")]
    InvalidTime,

    /// A timecode or time string could not be produced or parsed.
    #[error("invalid timecode: {0}")]
    InvalidTimecode(String),

    /// A child index was outside `0..size`.
    #[error("index {index} out of range for composition with {size} children")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of children at the time of the call.
        size: usize,
    },

    /// The node is not a child of the queried container.
    #[error("child not found in composition")]
    NotFound,

    /// The node has neither a source range nor any way to derive an available range.
    #[error("cannot compute available range")]
    CannotComputeRange,

    /// A node of the wrong capability was supplied.
    #[error("type mismatch: expected {expected}, found {found:?}")]
    TypeMismatch {
        /// Description of the accepted capability.
        expected: &'static str,
        /// Kind of the node actually supplied.
        found: NodeKind,
    },

    /// The requested media reference key does not exist on the clip.
    #[error("media reference not found: {0}")]
    MediaReferenceNotFound(String),

    /// Attaching the node would make it its own ancestor.
    #[error("attaching node would create a cycle")]
    Cycle,

    /// An edit needed an item at a time where the composition has none.
    #[error("no item at the requested time")]
    NoItemAtTime,

    /// A fill edit targeted something other than a gap.
    #[error("expected a gap, found {0:?}")]
    NotAGap(NodeKind),

    /// An edit would leave an item with zero or negative duration.
    #[error("edit would leave a non-positive duration")]
    NonPositiveDuration,

    /// A cut landed inside a transition that the edit may not remove.
    #[error("cannot cut through a transition")]
    CutThroughTransition,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_offending_values() {
        let e = Error::IndexOutOfRange { index: 4, size: 2 };
        assert_eq!(
            e.to_string(),
            "index 4 out of range for composition with 2 children"
        );
        let e = Error::TypeMismatch {
            expected: "composable",
            found: NodeKind::Timeline,
        };
        assert_eq!(e.to_string(), "type mismatch: expected composable, found Timeline");
        assert_eq!(
            Error::NotAGap(NodeKind::Clip).to_string(),
            "expected a gap, found Clip"
        );
    }
}

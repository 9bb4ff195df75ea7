// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay layout. Every child of a stack starts at zero.

use crate::error::Result;
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::id::NodeId;
use super::store::NodeStore;

impl NodeStore {
    pub(crate) fn stack_range_of_child(&self, child: NodeId) -> Result<TimeRange> {
        let duration = self.duration(child)?;
        Ok(TimeRange::new(
            RationalTime::new(0.0, duration.rate()),
            duration,
        ))
    }

    /// Longest child, compared in seconds.
    pub(crate) fn stack_available_range(&self, stack: NodeId) -> Result<TimeRange> {
        let mut longest: Option<RationalTime> = None;
        for child in self.children(stack) {
            let duration = self.duration(child)?;
            if longest.is_none_or(|l| duration.to_seconds() > l.to_seconds()) {
                longest = Some(duration);
            }
        }
        let longest = longest.unwrap_or(RationalTime::ZERO);
        Ok(TimeRange::new(
            RationalTime::new(0.0, longest.rate()),
            longest,
        ))
    }
}

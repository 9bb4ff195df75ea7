// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rational time and composable timeline trees for editorial interchange.
//!
//! `montage_core` models an edit the way interchange formats describe one:
//! clips, gaps and transitions laid out on tracks, tracks layered in stacks,
//! and a timeline at the root. It is `no_std` compatible (with `alloc`) and
//! keeps every node in a struct-of-arrays arena addressed by generational
//! handles.
//!
//! # Architecture
//!
//! Time values flow from leaf media up through the tree, and queries map
//! them back down:
//!
//! ```text
//!   MediaReference::available_range
//!       │
//!       ▼
//!   Clip ──► Track (back to back) ──► Stack (layered) ──► Timeline
//!                     │
//!                     ▼
//!   range_of_child / trimmed_range_in_parent / transformed_time
//! ```
//!
//! **[`time`]**: [`RationalTime`](time::RationalTime), a value counted at a
//! rate, with arithmetic that rescales to the finer operand.
//!
//! **[`timecode`]**: SMPTE timecode and time-string conversion, including
//! drop-frame rates.
//!
//! **[`range`]**: [`TimeRange`](range::TimeRange), a start and duration with
//! epsilon-aware interval predicates.
//!
//! **[`transform`]**: [`TimeTransform`](transform::TimeTransform), an offset
//! plus scale applied to times and ranges.
//!
//! **[`node`]**: The composition tree: [`NodeStore`](node::NodeStore),
//! node kinds, child management, range computation and cross-node time
//! mapping.
//!
//! **[`algorithms`]**: Trimming, transition expansion, flattening and
//! filtering that build new subtrees, plus in-place editorial operations
//! (overwrite, insert, slice, slip, slide, trim, ripple, roll, fill, remove).
//!
//! **[`media`]**, **[`effect`]**, **[`marker`]**, **[`color`]**: The value
//! types carried by items.
//!
//! **[`metadata`]**: Free-form JSON metadata attached to every node.
//!
//! **[`schema`]**: Serialization schema names and versions.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! structural edits, with a zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates per-step
//!   events from cross-node time mapping.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod algorithms;
pub mod color;
pub mod effect;
pub mod error;
pub mod marker;
pub mod media;
pub mod metadata;
pub mod node;
pub mod range;
pub mod schema;
pub mod time;
pub mod timecode;
pub mod trace;
pub mod transform;

pub use error::{Error, Result};

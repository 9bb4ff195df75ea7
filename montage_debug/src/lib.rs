// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, JSON export and tree dumps for montage
//! diagnostics.
//!
//! This crate provides [`TraceSink`](montage_core::trace::TraceSink)
//! implementations and store inspection helpers for development and
//! post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`json::export`]: writes recorded bytes as a JSON array.
//! - [`outline::write_outline`] and [`outline::to_json`]: dump a subtree with
//!   names, kinds and ranges.

pub mod json;
pub mod outline;
pub mod pretty;
pub mod recorder;

// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-place editorial operations on a composition.
//!
//! Unlike the rest of [`algorithms`](super), these edit the composition they
//! are given. Items passed in to be placed are copied, never moved, and
//! every node an edit takes out of the tree is destroyed.
//!
//! | Edit | Moves later items | Changes neighbors |
//! | --- | --- | --- |
//! | [`overwrite`] | only past the end | splits the items it lands on |
//! | [`insert`] | yes | splits the item it lands in |
//! | [`slice`] | no | splits one item in two |
//! | [`slip`] | no | no |
//! | [`slide`] | yes | resizes the previous item |
//! | [`trim`] | no | resizes or fills around the item |
//! | [`ripple`] | yes | no |
//! | [`roll`] | no | moves the cut between two items |
//! | [`fill`] | depends on [`ReferencePoint`] | replaces one gap |
//! | [`remove`], [`remove_range`] | unless filling | splits at the range edges |
//!
//! An edit that fails before touching the tree leaves it unchanged.

use alloc::vec::Vec;
use core::fmt;

use crate::effect::Effect;
use crate::error::{Error, Result};
use crate::node::{Gap, NodeId, NodeKind, NodeStore};
use crate::range::TimeRange;
use crate::time::RationalTime;

use super::{clone_showing, clone_with_source};

/// Settings shared by the edits that add or remove material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditOptions {
    /// Remove transitions that the edit cuts through. When unset,
    /// [`slice`] refuses to cut through one and [`overwrite`] and [`insert`]
    /// leave them in place.
    pub remove_transitions: bool,
    /// Leave a gap where [`remove`] and [`remove_range`] take material out.
    pub fill: bool,
    /// Gap to copy wherever an edit adds filler. Ignored unless it is a gap.
    pub fill_template: Option<NodeId>,
}

impl EditOptions {
    /// Remove transitions, fill with plain gaps.
    pub const DEFAULT: Self = Self {
        remove_transitions: true,
        fill: true,
        fill_template: None,
    };

    /// Returns these options with `template` as the filler gap.
    #[must_use]
    pub const fn with_fill_template(self, template: NodeId) -> Self {
        Self {
            fill_template: Some(template),
            ..self
        }
    }
}

impl Default for EditOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How [`fill`] fits an item into a gap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReferencePoint {
    /// Keep the item's own length, overwriting from the gap's start.
    #[default]
    Source,
    /// Cut the item to the gap; a shorter item leaves the rest as gap.
    Sequence,
    /// Keep the whole item and attach a linear time warp that fits it to
    /// the gap.
    Fit,
}

impl fmt::Display for ReferencePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Source => "Source",
            Self::Sequence => "Sequence",
            Self::Fit => "Fit",
        })
    }
}

/// Replaces whatever lies in `range` of `composition` with a copy of `item`.
///
/// A copy without a source range is cut to `range`'s duration from the
/// start of its available range. Items straddling either end of `range` keep
/// their outside parts. A range past the end is reached with a filler gap;
/// a range ending before zero is placed first, followed by filler.
///
/// # Errors
///
/// [`Error::TypeMismatch`] if `composition` is not a track or stack or
/// `item` is not an item, and any range error from the children.
pub fn overwrite(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    range: TimeRange,
    options: &EditOptions,
) -> Result<()> {
    store.require_composition(composition)?;
    store.item(item)?;
    let duration = content_duration(store, composition)?;
    let start = range.start_time();

    let copy = match store.source_range(item)? {
        Some(_) => store.clone_subtree(item),
        None => match store.available_range(item) {
            Ok(available) => clone_with_source(
                store,
                item,
                TimeRange::new(available.start_time(), range.duration()),
            )?,
            Err(_) => store.clone_subtree(item),
        },
    };

    if store.child_count(composition) == 0 || duration.value() == 0.0 {
        return append_after_filler(store, composition, copy, start, options.fill_template);
    }
    if options.remove_transitions {
        let removed = remove_transitions_in(store, composition, range);
        or_discard(store, &[copy], removed)?;
    }
    let end = content_duration(store, composition);
    let end = or_discard(store, &[copy], end)?;

    if start >= end {
        return append_after_filler(store, composition, copy, start - end, options.fill_template);
    }
    let range_end = range.end_time_exclusive();
    let zero = zero_at(range_end.rate());
    if range_end <= zero {
        let lead = zero - range_end;
        if lead.value() > 0.0 {
            let filler = filler_gap(store, lead, options.fill_template);
            let filler = or_discard(store, &[copy], filler)?;
            return splice(store, composition, 0, &[], &[copy, filler]);
        }
        return splice(store, composition, 0, &[], &[copy]);
    }

    let placed = items_in(store, composition, range);
    let placed = or_discard(store, &[copy], placed)?;
    replace_span(store, composition, &placed, range, Some(copy))
}

/// Inserts a copy of `item` at `time`, pushing later material back.
///
/// An item under `time` is split around the insertion. Times at or before
/// zero prepend; times at or past the end append after a filler gap.
///
/// # Errors
///
/// [`Error::TypeMismatch`] if `composition` is not a track or stack or
/// `item` is not an item.
pub fn insert(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    time: RationalTime,
    options: &EditOptions,
) -> Result<()> {
    store.require_composition(composition)?;
    store.item(item)?;
    let duration = content_duration(store, composition)?;

    if store.child_count(composition) == 0 || duration.value() == 0.0 {
        let copy = store.clone_subtree(item);
        return append_after_filler(store, composition, copy, time, options.fill_template);
    }
    if time <= zero_at(time.rate()) {
        let copy = store.clone_subtree(item);
        return splice(store, composition, 0, &[], &[copy]);
    }
    if time >= duration {
        let copy = store.clone_subtree(item);
        return append_after_filler(
            store,
            composition,
            copy,
            time - duration,
            options.fill_template,
        );
    }

    if options.remove_transitions {
        remove_transitions_in(store, composition, instant(time))?;
    }
    let Some(target) = item_at(store, composition, time)? else {
        let copy = store.clone_subtree(item);
        let end = store.child_count(composition);
        return splice(store, composition, end, &[], &[copy]);
    };
    if time == target.range.start_time() {
        let copy = store.clone_subtree(item);
        return splice(store, composition, target.index, &[], &[copy]);
    }

    let head = clone_showing(store, target.item, target.range, target.before(time))?;
    let copy = store.clone_subtree(item);
    let tail = clone_showing(store, target.item, target.range, target.after(time));
    let tail = or_discard(store, &[head, copy], tail)?;
    splice(
        store,
        composition,
        target.index,
        &[target.index],
        &[head, copy, tail],
    )
}

/// Cuts the item under `time` in two. The composition keeps its length.
///
/// Cutting at zero, at or past the end, at an item boundary, or where no
/// item lies does nothing.
///
/// # Errors
///
/// [`Error::CutThroughTransition`] if a transition spans `time` and
/// `options.remove_transitions` is unset.
pub fn slice(
    store: &mut NodeStore,
    composition: NodeId,
    time: RationalTime,
    options: &EditOptions,
) -> Result<()> {
    store.require_composition(composition)?;
    let duration = content_duration(store, composition)?;
    if time <= zero_at(time.rate()) || time >= duration {
        return Ok(());
    }

    let at = instant(time);
    if options.remove_transitions {
        remove_transitions_in(store, composition, at)?;
    } else if !transitions_in(store, composition, at)?.is_empty() {
        return Err(Error::CutThroughTransition);
    }

    let Some(target) = item_at(store, composition, time)? else {
        return Ok(());
    };
    if time == target.range.start_time() || time == target.range.end_time_exclusive() {
        return Ok(());
    }
    let head = clone_showing(store, target.item, target.range, target.before(time))?;
    let tail = clone_showing(store, target.item, target.range, target.after(time));
    let tail = or_discard(store, &[head], tail)?;
    splice(store, composition, target.index, &[target.index], &[head, tail])
}

/// Shifts which part of its media `item` shows by `delta`, keeping its
/// length and position.
///
/// The result is clamped to the item's available range when it has one.
pub fn slip(store: &mut NodeStore, item: NodeId, delta: RationalTime) -> Result<()> {
    if delta.value() == 0.0 {
        return Ok(());
    }
    let source = store.trimmed_range(item)?;
    let duration = source.duration();
    let mut start = source.start_time() + delta;
    if let Ok(available) = store.available_range(item) {
        let (first, end) = (available.start_time(), available.end_time_exclusive());
        if start < first {
            start = first;
        }
        if start + duration > end {
            start = end - duration;
            if start < first {
                start = first;
            }
        }
    }
    store.set_source_range(item, Some(TimeRange::new(start, duration)))
}

/// Moves `item` by `delta` by lengthening or shortening the item before it.
///
/// The previous item never drops below zero length nor grows past its
/// available range. The first item of a composition cannot slide.
///
/// # Errors
///
/// [`Error::NotFound`] if `item` is not a child of `composition`.
pub fn slide(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    delta: RationalTime,
) -> Result<()> {
    if delta.value() == 0.0 {
        return Ok(());
    }
    let index = store.index_of_child(composition, item)?;
    let Some(prev) = previous_item(store, composition, index) else {
        return Ok(());
    };
    let prev_range = store.trimmed_range(prev)?;
    let mut duration = prev_range.duration() + delta;
    if duration.value() <= 0.0 {
        duration = zero_at(prev_range.duration().rate());
    } else if delta.value() > 0.0 {
        if let Ok(available) = store.available_range(prev) {
            if duration > available.duration() {
                duration = available.duration();
            }
        }
    }
    store.set_source_range(prev, Some(TimeRange::new(prev_range.start_time(), duration)))
}

/// Moves the in and out points of `item` by `delta_in` and `delta_out`
/// without changing the composition's length.
///
/// The neighbors absorb the change: the previous item grows or shrinks with
/// the in point and the next item with the out point. With no neighbor on
/// that side, a filler gap covers the opened space. A next gap that would
/// shrink to nothing is removed. The in point is clamped to the start of the
/// item's available range and the out point to its end.
///
/// # Errors
///
/// [`Error::NotFound`] if `item` is not a child of `composition`, and
/// [`Error::NonPositiveDuration`] if either delta would consume the item.
/// Nothing changes on error.
pub fn trim(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    delta_in: RationalTime,
    delta_out: RationalTime,
    options: &EditOptions,
) -> Result<()> {
    if delta_in.value() == 0.0 && delta_out.value() == 0.0 {
        return Ok(());
    }
    let index = store.index_of_child(composition, item)?;
    let source = store.trimmed_range(item)?;
    let available = store.available_range(item).ok();
    let mut start = source.start_time();
    let mut duration = source.duration();
    let mut updates: Vec<(NodeId, TimeRange)> = Vec::new();
    let mut head_filler = None;
    let mut tail_filler = None;
    let mut doomed_gap = None;

    if delta_in.value() != 0.0 {
        let mut new_start = start + delta_in;
        let mut new_duration = duration - delta_in;
        if new_duration.value() <= 0.0 {
            return Err(Error::NonPositiveDuration);
        }
        if let Some(available) = available {
            if new_start < available.start_time() {
                new_duration -= available.start_time() - new_start;
                new_start = available.start_time();
            }
        }
        let applied = new_start - start;
        start = new_start;
        duration = new_duration;
        if let Some(prev) = previous_item(store, composition, index) {
            let prev_range = store.trimmed_range(prev)?;
            let prev_duration = non_negative(prev_range.duration() + applied);
            updates.push((prev, TimeRange::new(prev_range.start_time(), prev_duration)));
        } else if applied.value() < 0.0 {
            head_filler = Some(-applied);
        }
    }

    if delta_out.value() != 0.0 {
        let mut new_duration = duration + delta_out;
        if new_duration.value() <= 0.0 {
            return Err(Error::NonPositiveDuration);
        }
        if let Some(available) = available {
            let longest = available.end_time_exclusive() - start;
            if new_duration > longest {
                new_duration = longest;
            }
        }
        duration = new_duration;
        if let Some(next) = next_item(store, composition, index) {
            let next_range = store.trimmed_range(next)?;
            let next_duration = next_range.duration() - delta_out;
            if store.kind(next) == NodeKind::Gap && next_duration.value() <= 0.0 {
                doomed_gap = Some(index + 1);
            } else {
                updates.push((
                    next,
                    TimeRange::new(
                        next_range.start_time() + delta_out,
                        non_negative(next_duration),
                    ),
                ));
            }
        } else if delta_out.value() < 0.0 {
            tail_filler = Some(-delta_out);
        }
    }

    updates.push((item, TimeRange::new(start, duration)));
    for (id, range) in updates {
        store.set_source_range(id, Some(range))?;
    }
    if let Some(gap_index) = doomed_gap {
        discard_child(store, composition, gap_index)?;
    }
    if let Some(length) = tail_filler {
        let filler = filler_gap(store, length, options.fill_template)?;
        splice(store, composition, index + 1, &[], &[filler])?;
    }
    if let Some(length) = head_filler {
        let filler = filler_gap(store, length, options.fill_template)?;
        splice(store, composition, index, &[], &[filler])?;
    }
    Ok(())
}

/// Moves the in and out points of `item` within its media, leaving the
/// neighbors alone, so the composition's length changes by the same amount.
///
/// Both points are clamped to the available range when there is one, and
/// the item keeps at least one frame.
pub fn ripple(
    store: &mut NodeStore,
    item: NodeId,
    delta_in: RationalTime,
    delta_out: RationalTime,
) -> Result<()> {
    if delta_in.value() == 0.0 && delta_out.value() == 0.0 {
        return Ok(());
    }
    let source = store.trimmed_range(item)?;
    let available = store.available_range(item).ok();
    let mut start = source.start_time();
    let mut end = source.end_time_exclusive();

    if delta_in.value() != 0.0 {
        start += delta_in;
        if let Some(available) = available {
            if start < available.start_time() {
                start = available.start_time();
            }
        }
        if start >= end {
            start = end - one_frame(end);
        }
    }
    if delta_out.value() != 0.0 {
        end += delta_out;
        if let Some(available) = available {
            if end > available.end_time_exclusive() {
                end = available.end_time_exclusive();
            }
        }
        if end <= start {
            end = start + one_frame(start);
        }
    }

    let duration = end - start;
    if duration.value() <= 0.0 {
        return Err(Error::NonPositiveDuration);
    }
    store.set_source_range(item, Some(TimeRange::new(start, duration)))
}

/// Moves the cuts on either side of `item`: `delta_in` shifts the cut with
/// the previous item and `delta_out` the cut with the next one. The
/// composition keeps its length.
///
/// A cut moves no further than the neighbor it eats into. Rolling the in
/// point left stops at the start of the item's available range. With no
/// neighbor on a side, only trimming the head or extending the tail applies.
///
/// # Errors
///
/// [`Error::NotFound`] if `item` is not a child of `composition`, and
/// [`Error::NonPositiveDuration`] if the item would be consumed. Nothing
/// changes on error.
pub fn roll(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    delta_in: RationalTime,
    delta_out: RationalTime,
) -> Result<()> {
    if delta_in.value() == 0.0 && delta_out.value() == 0.0 {
        return Ok(());
    }
    let index = store.index_of_child(composition, item)?;
    let source = store.trimmed_range(item)?;
    let available = store.available_range(item).ok();
    let mut start = source.start_time();
    let mut duration = source.duration();
    let mut updates: Vec<(NodeId, TimeRange)> = Vec::new();

    if delta_in.value() != 0.0 {
        match previous_item(store, composition, index) {
            None if delta_in.value() > 0.0 => {
                start += delta_in;
                duration -= delta_in;
            }
            None => {}
            Some(prev) => {
                let prev_range = store.trimmed_range(prev)?;
                let mut delta = delta_in;
                if delta.value() < 0.0 {
                    if let Some(available) = available {
                        if start + delta < available.start_time() {
                            delta = available.start_time() - start;
                        }
                    }
                    if (prev_range.duration() + delta).value() < 0.0 {
                        delta = -prev_range.duration();
                    }
                }
                start += delta;
                duration -= delta;
                updates.push((
                    prev,
                    TimeRange::new(prev_range.start_time(), prev_range.duration() + delta),
                ));
            }
        }
        if duration.value() <= 0.0 {
            return Err(Error::NonPositiveDuration);
        }
    }

    if delta_out.value() != 0.0 {
        match next_item(store, composition, index) {
            None if delta_out.value() > 0.0 => {
                let mut end = start + duration + delta_out;
                if let Some(available) = available {
                    if end > available.end_time_exclusive() {
                        end = available.end_time_exclusive();
                    }
                }
                duration = end - start;
            }
            None => {}
            Some(next) => {
                let next_range = store.trimmed_range(next)?;
                let mut delta = delta_out;
                if delta.value() > 0.0 && next_range.duration() < delta {
                    delta = next_range.duration();
                }
                if delta.value() < 0.0 && (duration + delta).value() <= 0.0 {
                    delta = one_frame(duration) - duration;
                }
                duration += delta;
                updates.push((
                    next,
                    TimeRange::new(
                        next_range.start_time() + delta,
                        non_negative(next_range.duration() - delta),
                    ),
                ));
            }
        }
        if duration.value() <= 0.0 {
            return Err(Error::NonPositiveDuration);
        }
    }

    updates.push((item, TimeRange::new(start, duration)));
    for (id, range) in updates {
        store.set_source_range(id, Some(range))?;
    }
    Ok(())
}

/// Places a copy of `item` into the gap at `time`, fitted per `reference`.
///
/// # Errors
///
/// [`Error::NoItemAtTime`] if nothing lies at `time`, [`Error::NotAGap`] if
/// something other than a gap does, and [`Error::NonPositiveDuration`] when
/// fitting an item of zero length.
pub fn fill(
    store: &mut NodeStore,
    item: NodeId,
    composition: NodeId,
    time: RationalTime,
    reference: ReferencePoint,
) -> Result<()> {
    store.require_composition(composition)?;
    let shown = store.trimmed_range(item)?;
    let target = item_at(store, composition, time)?.ok_or(Error::NoItemAtTime)?;
    let kind = store.kind(target.item);
    if kind != NodeKind::Gap {
        return Err(Error::NotAGap(kind));
    }
    let gap_duration = store.duration(target.item)?;
    let item_duration = shown.duration();

    match reference {
        ReferencePoint::Source => overwrite(
            store,
            item,
            composition,
            TimeRange::new(target.range.start_time(), item_duration),
            &EditOptions::DEFAULT,
        ),
        ReferencePoint::Sequence => {
            let length = if item_duration > gap_duration {
                gap_duration
            } else {
                item_duration
            };
            let copy = clone_with_source(store, item, TimeRange::new(shown.start_time(), length))?;
            let mut replacements = alloc::vec![copy];
            if item_duration < gap_duration {
                let rest = store.create("", Gap::with_duration(gap_duration - item_duration));
                replacements.push(rest);
            }
            splice(store, composition, target.index, &[target.index], &replacements)
        }
        ReferencePoint::Fit => {
            if item_duration.value() == 0.0 {
                return Err(Error::NonPositiveDuration);
            }
            let scalar = item_duration.to_seconds() / gap_duration.to_seconds();
            let copy = clone_with_source(store, item, shown)?;
            if let Ok(fields) = store.item_mut(copy) {
                fields
                    .effects
                    .push(Effect::linear_time_warp("time_fit", "LinearTimeWarp", scalar));
            }
            splice(store, composition, target.index, &[target.index], &[copy])
        }
    }
}

/// Removes the item at `time`, leaving a gap of its length if
/// `options.fill` is set.
///
/// # Errors
///
/// [`Error::NoItemAtTime`] if nothing lies at `time`.
pub fn remove(
    store: &mut NodeStore,
    composition: NodeId,
    time: RationalTime,
    options: &EditOptions,
) -> Result<()> {
    store.require_composition(composition)?;
    let target = item_at(store, composition, time)?.ok_or(Error::NoItemAtTime)?;
    let duration = store.duration(target.item)?;
    let filler = if options.fill {
        Some(filler_gap(store, duration, options.fill_template)?)
    } else {
        None
    };
    splice(
        store,
        composition,
        target.index,
        &[target.index],
        filler.as_slice(),
    )
}

/// Removes everything in `range`, splitting items that straddle its ends.
///
/// With `options.fill` a single gap as long as `range` takes the removed
/// material's place. A range that touches no item does nothing.
pub fn remove_range(
    store: &mut NodeStore,
    composition: NodeId,
    range: TimeRange,
    options: &EditOptions,
) -> Result<()> {
    store.require_composition(composition)?;
    let placed = items_in(store, composition, range)?;
    if placed.is_empty() {
        return Ok(());
    }
    let filler = if options.fill {
        Some(filler_gap(store, range.duration(), options.fill_template)?)
    } else {
        None
    };
    replace_span(store, composition, &placed, range, filler)
}

/// A child item and where it sits in its composition.
#[derive(Clone, Copy, Debug)]
struct Placed {
    index: usize,
    item: NodeId,
    range: TimeRange,
}

impl Placed {
    fn before(self, time: RationalTime) -> TimeRange {
        TimeRange::from_start_end_time(self.range.start_time(), time)
    }

    fn after(self, time: RationalTime) -> TimeRange {
        TimeRange::from_start_end_time(time, self.range.end_time_exclusive())
    }
}

fn zero_at(rate: f64) -> RationalTime {
    RationalTime::new(0.0, rate)
}

fn one_frame(at: RationalTime) -> RationalTime {
    RationalTime::new(1.0, at.rate())
}

fn non_negative(duration: RationalTime) -> RationalTime {
    if duration.value() < 0.0 {
        zero_at(duration.rate())
    } else {
        duration
    }
}

/// A zero-length range at `time`.
fn instant(time: RationalTime) -> TimeRange {
    TimeRange::new(time, zero_at(time.rate()))
}

/// Sum of the visible children, ignoring the composition's own trim.
fn content_duration(store: &NodeStore, composition: NodeId) -> Result<RationalTime> {
    let mut total: Option<RationalTime> = None;
    for child in store.children(composition) {
        if store.visible(child) {
            let duration = store.duration(child)?;
            total = Some(total.map_or(duration, |t| t + duration));
        }
    }
    Ok(total.unwrap_or(RationalTime::ZERO))
}

fn placed_children(store: &NodeStore, composition: NodeId) -> Result<Vec<Placed>> {
    Ok(store
        .range_of_all_children(composition)?
        .into_iter()
        .enumerate()
        .map(|(index, (item, range))| Placed { index, item, range })
        .collect())
}

/// The first item whose range contains `time`.
fn item_at(store: &NodeStore, composition: NodeId, time: RationalTime) -> Result<Option<Placed>> {
    Ok(placed_children(store, composition)?
        .into_iter()
        .find(|p| p.range.contains(time) && store.kind(p.item).is_item()))
}

/// Every item whose range intersects `range`, in order.
fn items_in(store: &NodeStore, composition: NodeId, range: TimeRange) -> Result<Vec<Placed>> {
    let epsilon = store.config().epsilon_s;
    let mut placed = placed_children(store, composition)?;
    placed.retain(|p| range.intersects(p.range, epsilon) && store.kind(p.item).is_item());
    Ok(placed)
}

/// Indices of the transitions whose ranges intersect `range`.
fn transitions_in(store: &NodeStore, composition: NodeId, range: TimeRange) -> Result<Vec<usize>> {
    let epsilon = store.config().epsilon_s;
    Ok(placed_children(store, composition)?
        .into_iter()
        .filter(|p| {
            store.kind(p.item) == NodeKind::Transition && range.intersects(p.range, epsilon)
        })
        .map(|p| p.index)
        .collect())
}

fn remove_transitions_in(store: &mut NodeStore, composition: NodeId, range: TimeRange) -> Result<()> {
    for index in transitions_in(store, composition, range)?.into_iter().rev() {
        discard_child(store, composition, index)?;
    }
    Ok(())
}

fn previous_item(store: &NodeStore, composition: NodeId, index: usize) -> Option<NodeId> {
    let prev = store.children(composition).nth(index.checked_sub(1)?)?;
    store.kind(prev).is_item().then_some(prev)
}

fn next_item(store: &NodeStore, composition: NodeId, index: usize) -> Option<NodeId> {
    let next = store.children(composition).nth(index + 1)?;
    store.kind(next).is_item().then_some(next)
}

/// A gap of `duration`, copied from `template` when that is a gap.
fn filler_gap(
    store: &mut NodeStore,
    duration: RationalTime,
    template: Option<NodeId>,
) -> Result<NodeId> {
    match template {
        Some(template) if store.kind(template) == NodeKind::Gap => clone_with_source(
            store,
            template,
            TimeRange::new(zero_at(duration.rate()), duration),
        ),
        _ => Ok(store.create("", Gap::with_duration(duration))),
    }
}

/// Replaces the items in `placed` with `middle`, keeping the parts of the
/// first and last items that stick out of `range`.
fn replace_span(
    store: &mut NodeStore,
    composition: NodeId,
    placed: &[Placed],
    range: TimeRange,
    middle: Option<NodeId>,
) -> Result<()> {
    let (Some(&first), Some(&last)) = (placed.first(), placed.last()) else {
        let end = store.child_count(composition);
        return splice(store, composition, end, &[], middle.as_slice());
    };
    let start = range.start_time();
    let end = range.end_time_exclusive();

    let mut replacements: Vec<NodeId> = Vec::with_capacity(3);
    if start > first.range.start_time() {
        let head = clone_showing(store, first.item, first.range, first.before(start));
        let head = or_discard(store, middle.as_slice(), head)?;
        replacements.push(head);
    }
    replacements.extend(middle);
    if end < last.range.end_time_exclusive() {
        let tail = clone_showing(store, last.item, last.range, last.after(end));
        let tail = or_discard(store, &replacements, tail)?;
        replacements.push(tail);
    }
    let indices: Vec<usize> = placed.iter().map(|p| p.index).collect();
    splice(store, composition, first.index, &indices, &replacements)
}

/// Appends `lead` of filler, if positive, and then `node`.
fn append_after_filler(
    store: &mut NodeStore,
    composition: NodeId,
    node: NodeId,
    lead: RationalTime,
    template: Option<NodeId>,
) -> Result<()> {
    let end = store.child_count(composition);
    if lead.value() > 0.0 {
        let filler = filler_gap(store, lead, template);
        let filler = or_discard(store, &[node], filler)?;
        return splice(store, composition, end, &[], &[filler, node]);
    }
    splice(store, composition, end, &[], &[node])
}

/// Destroys the children at `remove` (ascending) and inserts the detached
/// `insert` nodes starting at `at`.
///
/// Nodes from `insert` that could not be placed are destroyed.
fn splice(
    store: &mut NodeStore,
    composition: NodeId,
    at: usize,
    remove: &[usize],
    insert: &[NodeId],
) -> Result<()> {
    for &index in remove.iter().rev() {
        if let Err(e) = discard_child(store, composition, index) {
            destroy_all(store, insert);
            return Err(e);
        }
    }
    for (offset, &node) in insert.iter().enumerate() {
        if let Err(e) = store.insert_child(composition, at + offset, node) {
            destroy_all(store, &insert[offset..]);
            return Err(e);
        }
    }
    Ok(())
}

fn discard_child(store: &mut NodeStore, composition: NodeId, index: usize) -> Result<()> {
    let child = store.remove_child(composition, index)?;
    store.destroy(child);
    Ok(())
}

fn destroy_all(store: &mut NodeStore, nodes: &[NodeId]) {
    for &node in nodes {
        store.destroy(node);
    }
}

/// Destroys the detached `made` nodes if `result` failed.
fn or_discard<T>(store: &mut NodeStore, made: &[NodeId], result: Result<T>) -> Result<T> {
    if result.is_err() {
        destroy_all(store, made);
    }
    result
}

//! Canonicalization of selections.
//!
//! These functions are stateless. They find the root ranges of a selection
//! (ranges that do not lie below another range of the same selection), sort
//! and merge ranges into a canonical form, and compute where a new entry
//! belongs in a depth-first ordered list of indices.

use std::cmp::Ordering;
use std::collections::VecDeque;

use super::index::ModelIndex;
use super::item_selection::{ItemSelection, SelectionRange};

/// Returns `true` if a strict ancestor of `index` lies inside `range`.
pub fn is_descendant_of_range(range: &SelectionRange, index: &ModelIndex) -> bool {
    index.ancestors().iter().any(|ancestor| range.contains(ancestor))
}

/// Returns `true` if a strict ancestor of `index` lies inside any of `ranges`.
///
/// `index` itself being selected does not count.
pub fn is_descendant_of<'a, I>(ranges: I, index: &ModelIndex) -> bool
where
    I: IntoIterator<Item = &'a SelectionRange>,
{
    let ancestors = index.ancestors();
    if ancestors.is_empty() {
        return false;
    }
    ranges
        .into_iter()
        .any(|range| ancestors.iter().any(|ancestor| range.contains(ancestor)))
}

/// Returns `true` if a strict ancestor of `index` is in `list`.
pub fn is_descendant_of_list(list: &[ModelIndex], index: &ModelIndex) -> bool {
    index.ancestors().iter().any(|ancestor| list.contains(ancestor))
}

/// Keeps only the ranges that are not below another range of `selection`.
///
/// Top-level ranges are always roots. Each remaining range is checked both
/// against the roots found so far and against the ranges not yet processed,
/// since descendants may appear before their ancestors.
pub fn get_root_ranges(selection: &ItemSelection) -> ItemSelection {
    let (mut roots, rest): (Vec<_>, Vec<_>) = selection
        .iter()
        .cloned()
        .partition(|range| !range.top_left().has_parent());

    let mut remaining: VecDeque<SelectionRange> = rest.into();
    while let Some(range) = remaining.pop_front() {
        let index = range.top_left();
        if !is_descendant_of(&roots, index) && !is_descendant_of(&remaining, index) {
            roots.push(range);
        }
    }
    roots.into()
}

/// Total order used to sort ranges before merging.
///
/// Ranges are ordered by parent position in the tree, then parent identity,
/// then top, left, bottom and right.
pub fn range_less_than(a: &SelectionRange, b: &SelectionRange) -> Ordering {
    let (pa, pb) = (a.parent(), b.parent());
    pa.row_path()
        .cmp(&pb.row_path())
        .then(pa.internal_id().cmp(&pb.internal_id()))
        .then(a.top().cmp(&b.top()))
        .then(a.left().cmp(&b.left()))
        .then(a.bottom().cmp(&b.bottom()))
        .then(a.right().cmp(&b.right()))
}

/// Merges vertically adjacent ranges of an already sorted selection.
///
/// Two neighbouring ranges merge when they share a parent and columns and the
/// second starts at most one row after the first ends. Order is preserved.
pub fn stable_normalize_selection(selection: &ItemSelection) -> ItemSelection {
    let mut merged: Vec<SelectionRange> = Vec::with_capacity(selection.len());
    for range in selection {
        if let Some(last) = merged.last_mut()
            && last.left() == range.left()
            && last.right() == range.right()
            && range.top() <= last.bottom() + 1
            && last.parent() == range.parent()
        {
            if range.bottom() > last.bottom() {
                *last = SelectionRange::new(last.top_left().clone(), range.bottom_right().clone());
            }
            continue;
        }
        merged.push(range.clone());
    }
    merged.into()
}

/// Sorts `selection` with [`range_less_than`] and merges adjacent ranges.
pub fn k_normalize_selection(selection: &ItemSelection) -> ItemSelection {
    let mut ranges = selection.ranges().to_vec();
    ranges.sort_by(range_less_than);
    stable_normalize_selection(&ranges.into())
}

/// Returns the position at which `index` belongs in `list`.
///
/// `list` is kept in depth-first pre-order: entries are compared by the rows
/// along their ancestor chains, level by level, and an ancestor orders before
/// its descendants. The result is the position of the first entry ordering
/// after `index`.
pub fn get_root_list_row(list: &[ModelIndex], index: &ModelIndex) -> usize {
    let path = index.row_path();
    list.iter()
        .position(|entry| entry.row_path() > path)
        .unwrap_or(list.len())
}

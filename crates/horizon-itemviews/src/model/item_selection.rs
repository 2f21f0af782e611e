//! Rectangular selection ranges and collections of them.

use std::slice;

use super::index::ModelIndex;
use super::traits::ItemModel;

/// A rectangular block of sibling items sharing one parent.
///
/// The range covers rows `top..=bottom` and columns `left..=right` below
/// `parent()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    top_left: ModelIndex,
    bottom_right: ModelIndex,
}

impl SelectionRange {
    /// Creates a range spanning two corner indices of the same parent.
    ///
    /// The corners may be given in any order; the stored corners are the
    /// upper-left and lower-right cells of the rectangle they span.
    pub fn new(top_left: ModelIndex, bottom_right: ModelIndex) -> Self {
        debug_assert!(
            top_left.parent() == bottom_right.parent(),
            "selection range corners must share a parent"
        );
        let ordered =
            top_left.row() <= bottom_right.row() && top_left.column() <= bottom_right.column();
        if ordered || !top_left.is_valid() || !bottom_right.is_valid() {
            return Self {
                top_left,
                bottom_right,
            };
        }

        // Sibling cells of one row share the row's internal id.
        let (upper, lower) = if top_left.row() <= bottom_right.row() {
            (top_left, bottom_right)
        } else {
            (bottom_right, top_left)
        };
        let left = upper.column().min(lower.column());
        let right = upper.column().max(lower.column());
        let parent = upper.parent();
        Self {
            top_left: ModelIndex::with_internal_id(
                upper.row(),
                left,
                parent.clone(),
                upper.internal_id(),
            ),
            bottom_right: ModelIndex::with_internal_id(
                lower.row(),
                right,
                parent,
                lower.internal_id(),
            ),
        }
    }

    /// Creates a single-cell range.
    pub fn from_index(index: ModelIndex) -> Self {
        Self {
            top_left: index.clone(),
            bottom_right: index,
        }
    }

    pub fn top_left(&self) -> &ModelIndex {
        &self.top_left
    }

    pub fn bottom_right(&self) -> &ModelIndex {
        &self.bottom_right
    }

    pub fn top(&self) -> usize {
        self.top_left.row()
    }

    pub fn bottom(&self) -> usize {
        self.bottom_right.row()
    }

    pub fn left(&self) -> usize {
        self.top_left.column()
    }

    pub fn right(&self) -> usize {
        self.bottom_right.column()
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        (self.bottom() + 1).saturating_sub(self.top())
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        (self.right() + 1).saturating_sub(self.left())
    }

    /// The common parent of all items in the range.
    pub fn parent(&self) -> ModelIndex {
        self.top_left.parent()
    }

    /// Returns `true` if both corners are valid and correctly ordered.
    pub fn is_valid(&self) -> bool {
        self.top_left.is_valid()
            && self.bottom_right.is_valid()
            && self.top() <= self.bottom()
            && self.left() <= self.right()
            && self.top_left.parent() == self.bottom_right.parent()
    }

    /// Returns `true` if `index` lies inside the range.
    pub fn contains(&self, index: &ModelIndex) -> bool {
        index.is_valid()
            && (self.top()..=self.bottom()).contains(&index.row())
            && (self.left()..=self.right()).contains(&index.column())
            && index.parent() == self.parent()
    }

    /// Resolves every item of the range against `model`, row by row.
    pub fn indexes(&self, model: &dyn ItemModel) -> Vec<ModelIndex> {
        let parent = self.parent();
        let mut result = Vec::with_capacity(self.height() * self.width());
        for row in self.top()..=self.bottom() {
            for column in self.left()..=self.right() {
                let index = model.index(row, column, &parent);
                if index.is_valid() {
                    result.push(index);
                }
            }
        }
        result
    }
}

/// An ordered list of [`SelectionRange`]s.
///
/// Ranges may overlap or sit under different parents; use the functions of
/// [`selection_normalizer`](super::selection_normalizer) to bring a selection
/// into canonical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSelection {
    ranges: Vec<SelectionRange>,
}

impl ItemSelection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a selection holding one range between two corners.
    pub fn from_corners(top_left: ModelIndex, bottom_right: ModelIndex) -> Self {
        Self {
            ranges: vec![SelectionRange::new(top_left, bottom_right)],
        }
    }

    /// Appends a range between two corners.
    pub fn select(&mut self, top_left: ModelIndex, bottom_right: ModelIndex) {
        self.ranges.push(SelectionRange::new(top_left, bottom_right));
    }

    pub fn push(&mut self, range: SelectionRange) {
        self.ranges.push(range);
    }

    pub fn extend(&mut self, other: ItemSelection) {
        self.ranges.extend(other.ranges);
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn iter(&self) -> slice::Iter<'_, SelectionRange> {
        self.ranges.iter()
    }

    /// Returns `true` if any range contains `index`.
    pub fn contains(&self, index: &ModelIndex) -> bool {
        self.ranges.iter().any(|range| range.contains(index))
    }

    /// Resolves every item of every range against `model`.
    pub fn indexes(&self, model: &dyn ItemModel) -> Vec<ModelIndex> {
        self.ranges
            .iter()
            .flat_map(|range| range.indexes(model))
            .collect()
    }
}

impl From<Vec<SelectionRange>> for ItemSelection {
    fn from(ranges: Vec<SelectionRange>) -> Self {
        Self { ranges }
    }
}

impl FromIterator<SelectionRange> for ItemSelection {
    fn from_iter<I: IntoIterator<Item = SelectionRange>>(iter: I) -> Self {
        Self {
            ranges: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ItemSelection {
    type Item = SelectionRange;
    type IntoIter = std::vec::IntoIter<SelectionRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

impl<'a> IntoIterator for &'a ItemSelection {
    type Item = &'a SelectionRange;
    type IntoIter = slice::Iter<'a, SelectionRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeModel;

    fn idx(row: usize, column: usize, parent: &ModelIndex, id: u64) -> ModelIndex {
        ModelIndex::with_internal_id(row, column, parent.clone(), id)
    }

    #[test]
    fn test_range_geometry() {
        let root = ModelIndex::invalid();
        let range = SelectionRange::new(idx(1, 0, &root, 2), idx(3, 1, &root, 4));
        assert!(range.is_valid());
        assert_eq!((range.top(), range.bottom()), (1, 3));
        assert_eq!((range.left(), range.right()), (0, 1));
        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 2);
        assert!(!range.parent().is_valid());
    }

    #[test]
    fn test_range_contains() {
        let root = ModelIndex::invalid();
        let parent = idx(0, 0, &root, 1);
        let range = SelectionRange::new(idx(0, 0, &parent, 2), idx(2, 0, &parent, 4));

        assert!(range.contains(&idx(1, 0, &parent, 3)));
        assert!(!range.contains(&idx(3, 0, &parent, 5)));
        assert!(!range.contains(&idx(1, 1, &parent, 3)));
        // Same row under a different parent
        assert!(!range.contains(&idx(1, 0, &root, 9)));
        assert!(!range.contains(&ModelIndex::invalid()));
    }

    #[test]
    fn test_selection_indexes() {
        let model = TreeModel::<String>::new();
        for name in ["a", "b", "c"] {
            model.add_root(name.to_string());
        }
        let top = ModelIndex::invalid();
        let selection = ItemSelection::from_corners(model.index(0, 0, &top), model.index(1, 0, &top));
        let rows: Vec<_> = selection.indexes(&model).iter().map(|i| i.row()).collect();
        assert_eq!(rows, vec![0, 1]);
        assert!(selection.contains(&model.index(1, 0, &top)));
        assert!(!selection.contains(&model.index(2, 0, &top)));
    }

    #[test]
    fn test_reversed_corners_are_ordered() {
        let root = ModelIndex::invalid();
        let range = SelectionRange::new(idx(3, 1, &root, 4), idx(1, 0, &root, 2));
        assert!(range.is_valid());
        assert_eq!(*range.top_left(), idx(1, 0, &root, 2));
        assert_eq!(*range.bottom_right(), idx(3, 1, &root, 4));
        assert_eq!(range.height(), 3);
        assert_eq!(range.width(), 2);

        // Rows ascending but columns descending
        let range = SelectionRange::new(idx(1, 2, &root, 2), idx(3, 0, &root, 4));
        assert_eq!(*range.top_left(), idx(1, 0, &root, 2));
        assert_eq!(*range.bottom_right(), idx(3, 2, &root, 4));
        assert!(range.contains(&idx(2, 1, &root, 3)));
    }

    #[test]
    fn test_reversed_corners_resolve_every_row() {
        let model = TreeModel::<String>::new();
        for name in ["a", "b", "c"] {
            model.add_root(name.to_string());
        }
        let top = ModelIndex::invalid();
        let selection = ItemSelection::from_corners(model.index(2, 0, &top), model.index(0, 0, &top));
        let rows: Vec<_> = selection.indexes(&model).iter().map(|i| i.row()).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert!(selection.contains(&model.index(1, 0, &top)));
    }
}

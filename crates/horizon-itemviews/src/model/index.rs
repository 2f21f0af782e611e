//! Model index for addressing items in hierarchical models.
//!
//! The `ModelIndex` type is the fundamental way to reference items within
//! an `ItemModel`. It contains row, column, and parent information to
//! uniquely identify any item in a hierarchical data structure.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Represents a position within an `ItemModel`.
///
/// `ModelIndex` is used by views, selection models and proxies to locate
/// items within a model. Each index contains:
/// - Row and column within the parent
/// - A copy of the parent index chain (for hierarchical models)
/// - An internal ID for model-specific identification
///
/// # Index Validity
///
/// Model indices should be used immediately and not stored long-term.
/// After model modifications (insertions, deletions, moves), previously
/// obtained indices may describe stale positions. Models whose internal IDs
/// are stable can re-resolve an ID through
/// [`ItemModel::index_for_internal_id`](super::ItemModel::index_for_internal_id).
///
/// # Example
///
/// ```ignore
/// use horizon_itemviews::model::ModelIndex;
///
/// // Get a root-level item
/// let index = model.index(0, 0, &ModelIndex::invalid());
///
/// // Get a child item
/// let child = model.index(0, 0, &index);
/// assert!(child.is_descendant_of(&index));
/// ```
#[derive(Clone)]
pub struct ModelIndex {
    /// The row within the parent.
    row: usize,
    /// The column within the parent.
    column: usize,
    /// The parent index. `None` indicates a root-level item.
    parent: Option<Box<ModelIndex>>,
    /// An internal ID that models can use for their own purposes.
    internal_id: u64,
    /// Whether this index is valid.
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// An invalid index is used to represent:
    /// - The root of the model (as a parent reference)
    /// - A non-existent or out-of-bounds item
    /// - An item that is not part of a projection
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            parent: None,
            internal_id: 0,
            valid: false,
        }
    }

    /// Creates a new valid model index with a model-specific internal ID.
    ///
    /// Models use the internal ID to find their internal data again. Tree
    /// models store a node ID; proxies store an opaque parent handle.
    ///
    /// # Arguments
    ///
    /// * `row` - The row within the parent
    /// * `column` - The column within the parent
    /// * `parent` - The parent index, or `ModelIndex::invalid()` for root items
    /// * `internal_id` - Model-specific identifier
    #[inline]
    pub fn with_internal_id(
        row: usize,
        column: usize,
        parent: ModelIndex,
        internal_id: u64,
    ) -> Self {
        Self {
            row,
            column,
            parent: if parent.is_valid() {
                Some(Box::new(parent))
            } else {
                None
            },
            internal_id,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index within its parent.
    ///
    /// Returns 0 for invalid indices.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the parent index, or an invalid index if this is a root item.
    #[inline]
    pub fn parent(&self) -> ModelIndex {
        match &self.parent {
            Some(parent) => (**parent).clone(),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns `true` if this index has a valid parent.
    ///
    /// Root-level items have no parent.
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the internal ID associated with this index.
    ///
    /// The meaning of this ID is model-specific.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// Returns `true` if both indices are valid and carry the same internal ID.
    ///
    /// For models with per-node IDs (such as `TreeModel`) this tests whether
    /// two indices refer to the same node, regardless of column or of how
    /// fresh the row information is.
    #[inline]
    pub fn same_node(&self, other: &ModelIndex) -> bool {
        self.valid && other.valid && self.internal_id == other.internal_id
    }

    /// Returns the depth of this index in the tree hierarchy.
    ///
    /// Root-level items have depth 0. Returns 0 for invalid indices.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(index) = current {
            depth += 1;
            current = index.parent.as_deref();
        }
        depth
    }

    /// Returns the chain of ancestors from this index up to (but not including) the root.
    ///
    /// The first element is the immediate parent, and the last is the
    /// top-level ancestor.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while current.is_valid() {
            ancestors.push(current.clone());
            current = current.parent();
        }
        ancestors
    }

    /// Returns the rows leading from the top level down to this index.
    ///
    /// A top-level item at row 3 yields `[3]`; its second child yields
    /// `[3, 1]`. Invalid indices yield an empty path.
    pub fn row_path(&self) -> Vec<usize> {
        if !self.valid {
            return Vec::new();
        }
        let mut path = vec![self.row];
        let mut current = self.parent.as_deref();
        while let Some(index) = current {
            path.push(index.row);
            current = index.parent.as_deref();
        }
        path.reverse();
        path
    }

    /// Checks if this index is a descendant of the given ancestor.
    ///
    /// Returns `false` if either index is invalid or if `ancestor` is not
    /// a strict ancestor of this index.
    pub fn is_descendant_of(&self, ancestor: &ModelIndex) -> bool {
        if !self.is_valid() || !ancestor.is_valid() {
            return false;
        }
        let mut current = self.parent.as_deref();
        while let Some(index) = current {
            if index == ancestor {
                return true;
            }
            current = index.parent.as_deref();
        }
        false
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("depth", &self.depth())
                .field("internal_id", &self.internal_id)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        // Two invalid indices are equal
        if !self.is_valid() && !other.is_valid() {
            return true;
        }
        // One valid, one invalid are not equal
        if self.is_valid() != other.is_valid() {
            return false;
        }
        // Both valid: compare position and parent
        self.row == other.row
            && self.column == other.column
            && self.internal_id == other.internal_id
            && self.parent == other.parent
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.row.hash(state);
            self.column.hash(state);
            self.internal_id.hash(state);
        }
    }
}

impl PartialOrd for ModelIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelIndex {
    /// Orders indices the way a depth-first walk of the model visits them.
    ///
    /// Invalid indices sort first, an ancestor sorts before its descendants,
    /// and siblings sort by row, then column.
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => Ordering::Equal,
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => self
                .row_path()
                .cmp(&other.row_path())
                .then(self.column.cmp(&other.column))
                .then(self.internal_id.cmp(&other.internal_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idx(row: usize, column: usize, parent: &ModelIndex, id: u64) -> ModelIndex {
        ModelIndex::with_internal_id(row, column, parent.clone(), id)
    }

    #[test]
    fn test_invalid_index() {
        let index = ModelIndex::invalid();
        assert!(!index.is_valid());
        assert_eq!(index.row(), 0);
        assert_eq!(index.column(), 0);
        assert!(!index.has_parent());
        assert!(index.row_path().is_empty());
    }

    #[test]
    fn test_hierarchical_index() {
        let root = ModelIndex::invalid();
        let parent = idx(0, 0, &root, 1);
        let child = idx(2, 1, &parent, 2);

        assert!(child.is_valid());
        assert!(child.has_parent());
        assert_eq!(child.parent().row(), 0);
        assert_eq!(child.parent().column(), 0);
        assert_eq!(child.depth(), 1);
        assert_eq!(child.row_path(), vec![0, 2]);
    }

    #[test]
    fn test_equality() {
        // Two invalid indices are equal
        assert_eq!(ModelIndex::invalid(), ModelIndex::invalid());

        let root = ModelIndex::invalid();
        let idx1 = idx(1, 0, &root, 100);
        let idx2 = idx(1, 0, &root, 100);
        assert_eq!(idx1, idx2);

        // Same node, different column
        let idx3 = idx(1, 2, &root, 100);
        assert_ne!(idx1, idx3);
        assert!(idx1.same_node(&idx3));
        assert!(!idx1.same_node(&ModelIndex::invalid()));
    }

    #[test]
    fn test_ancestors() {
        let root = ModelIndex::invalid();
        let level1 = idx(0, 0, &root, 1);
        let level2 = idx(1, 0, &level1, 2);
        let level3 = idx(2, 0, &level2, 3);

        let ancestors = level3.ancestors();
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[0], level2);
        assert_eq!(ancestors[1], level1);
    }

    #[test]
    fn test_is_descendant_of() {
        let root = ModelIndex::invalid();
        let level1 = idx(0, 0, &root, 1);
        let level2 = idx(1, 0, &level1, 2);
        let level3 = idx(2, 0, &level2, 3);

        assert!(level3.is_descendant_of(&level2));
        assert!(level3.is_descendant_of(&level1));
        assert!(!level1.is_descendant_of(&level3));
        assert!(!level1.is_descendant_of(&level2));
        // An index is not its own descendant
        assert!(!level2.is_descendant_of(&level2));
    }

    #[test]
    fn test_ordering_is_depth_first() {
        let root = ModelIndex::invalid();
        let a = idx(0, 0, &root, 1);
        let a_child = idx(5, 0, &a, 2);
        let b = idx(1, 0, &root, 3);
        let a_col1 = idx(0, 1, &root, 1);

        assert!(a < a_child); // Ancestor first
        assert!(a_child < b); // Whole subtree before the next sibling
        assert!(a < a_col1); // Same row, column 0 < column 1
        assert!(ModelIndex::invalid() < a); // Invalid < Valid

        let mut sorted = vec![b.clone(), a_child.clone(), a.clone()];
        sorted.sort();
        assert_eq!(sorted, vec![a, a_child, b]);
    }
}

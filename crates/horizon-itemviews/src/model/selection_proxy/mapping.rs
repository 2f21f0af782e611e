//! Translation of indices between the source and the projection.
//!
//! Projected indices carry a [`ParentSlot`] in their internal ID. Parent ids
//! are handed out lazily: mapping a node below the top level first makes sure
//! every projected ancestor has one.

use super::state::{NodeKey, ParentSlot, ProxyState};
use crate::model::identity_allocator::ParentId;
use crate::model::index::ModelIndex;
use crate::model::traits::ItemModel;

/// The column-0 sibling of `index`.
pub(super) fn column_zero(source: &dyn ItemModel, index: &ModelIndex) -> ModelIndex {
    if !index.is_valid() || index.column() == 0 {
        index.clone()
    } else {
        source.index(index.row(), 0, &index.parent())
    }
}

impl ProxyState {
    /// Returns the parent id under which the children of `source_parent`
    /// are projected, handing out ids as needed.
    ///
    /// Walks up from `source_parent` to the nearest ancestor that is either
    /// already mapped or a top-level row, then assigns ids from there down.
    /// Returns `None` if the node's children are not part of the projection.
    pub(super) fn ensure_mappable(
        &mut self,
        source: &dyn ItemModel,
        source_parent: &ModelIndex,
    ) -> Option<ParentId> {
        if !self.behavior.is_hierarchical() || !source_parent.is_valid() {
            return None;
        }
        let parent = column_zero(source, source_parent);
        if let Some(&id) = self.mapped_parents.left_to_right(&parent.internal_id()) {
            return Some(id);
        }

        let mut chain: Vec<NodeKey> = Vec::new();
        let mut current = parent.clone();
        loop {
            let key = current.internal_id();
            if self.mapped_parents.contains_left(&key) {
                break;
            }
            chain.push(key);
            if self.is_top_visible(&current) {
                break;
            }
            current = current.parent();
            if !current.is_valid() {
                return None;
            }
        }

        for key in chain.into_iter().rev() {
            let id = self.allocator.create_id();
            self.mapped_parents.insert(key, id);
        }
        self.mapped_parents
            .left_to_right(&parent.internal_id())
            .copied()
    }

    /// Maps a source index into the projection.
    ///
    /// Returns an invalid index if the node is not part of the projection.
    pub(super) fn map_from_source(
        &mut self,
        source: &dyn ItemModel,
        source_index: &ModelIndex,
    ) -> ModelIndex {
        if !source_index.is_valid() {
            return ModelIndex::invalid();
        }
        let column = source_index.column();
        let source_parent = source_index.parent();

        if self.behavior.start_with_child_trees() {
            if source_parent.is_valid() && self.root_list.contains(&source_parent.internal_id()) {
                let first_child = source.index(0, 0, &source_parent);
                return match self.first_child_rows.left_to_right(&first_child.internal_id()) {
                    Some(&offset) => ModelIndex::with_internal_id(
                        offset + source_index.row(),
                        column,
                        ModelIndex::invalid(),
                        ParentSlot::Top.internal_id(),
                    ),
                    None => ModelIndex::invalid(),
                };
            }
        } else if let Some(row) = self.root_position(source_index.internal_id()) {
            return ModelIndex::with_internal_id(
                row,
                column,
                ModelIndex::invalid(),
                ParentSlot::Top.internal_id(),
            );
        }

        if !self.behavior.is_hierarchical() || !source_parent.is_valid() {
            return ModelIndex::invalid();
        }
        let Some(id) = self.ensure_mappable(source, &source_parent) else {
            return ModelIndex::invalid();
        };
        let proxy_parent = self.map_from_source(source, &column_zero(source, &source_parent));
        if !proxy_parent.is_valid() {
            return ModelIndex::invalid();
        }
        ModelIndex::with_internal_id(
            source_index.row(),
            column,
            proxy_parent,
            ParentSlot::Child(id).internal_id(),
        )
    }

    /// Maps a projected index back to the source.
    ///
    /// Returns an invalid index for stale or foreign indices.
    pub(super) fn map_to_source(&self, source: &dyn ItemModel, proxy_index: &ModelIndex) -> ModelIndex {
        if !proxy_index.is_valid() {
            return ModelIndex::invalid();
        }
        let row = proxy_index.row();
        let column = proxy_index.column();

        match ParentSlot::of(proxy_index) {
            ParentSlot::Top if self.behavior.start_with_child_trees() => {
                let Some((&offset, &first_child)) = self.first_child_rows.right_predecessor(&row) else {
                    return ModelIndex::invalid();
                };
                let first_child = self.resolve(source, first_child);
                if !first_child.is_valid() {
                    return ModelIndex::invalid();
                }
                let root = first_child.parent();
                let source_row = row - offset;
                if source_row >= source.row_count(&root) {
                    return ModelIndex::invalid();
                }
                source.index(source_row, column, &root)
            }
            ParentSlot::Top => {
                let Some(&key) = self.root_list.get(row) else {
                    return ModelIndex::invalid();
                };
                let node = self.resolve(source, key);
                if column == 0 || !node.is_valid() {
                    node
                } else {
                    source.index(node.row(), column, &node.parent())
                }
            }
            ParentSlot::Child(id) => {
                if !self.allocator.is_live(id) {
                    return ModelIndex::invalid();
                }
                let Some(&key) = self.mapped_parents.right_to_left(&id) else {
                    return ModelIndex::invalid();
                };
                let parent = self.resolve(source, key);
                if !parent.is_valid() {
                    return ModelIndex::invalid();
                }
                source.index(row, column, &parent)
            }
        }
    }

    /// Number of projected rows below `proxy_parent`.
    pub(super) fn row_count(&self, source: &dyn ItemModel, proxy_parent: &ModelIndex) -> usize {
        if !proxy_parent.is_valid() {
            return self.top_level_rows(source);
        }
        if proxy_parent.column() != 0 || !self.behavior.is_hierarchical() {
            return 0;
        }
        let source_parent = self.map_to_source(source, proxy_parent);
        if !source_parent.is_valid() {
            return 0;
        }
        source.row_count(&source_parent)
    }

    /// Number of projected columns below `proxy_parent`.
    pub(super) fn column_count(&self, source: &dyn ItemModel, proxy_parent: &ModelIndex) -> usize {
        if proxy_parent.is_valid() {
            let source_parent = self.map_to_source(source, proxy_parent);
            if !source_parent.is_valid() {
                return 0;
            }
            return source.column_count(&source_parent);
        }
        // Top-level rows share the columns of the first root's level.
        match self.root_list.first() {
            Some(&key) => {
                let root = self.resolve(source, key);
                if self.behavior.start_with_child_trees() {
                    source.column_count(&root)
                } else {
                    source.column_count(&root.parent())
                }
            }
            None => source.column_count(&ModelIndex::invalid()),
        }
    }

    /// Creates the projected index at `row`, `column` below `proxy_parent`.
    pub(super) fn index(
        &mut self,
        source: &dyn ItemModel,
        row: usize,
        column: usize,
        proxy_parent: &ModelIndex,
    ) -> ModelIndex {
        if row >= self.row_count(source, proxy_parent)
            || column >= self.column_count(source, proxy_parent)
        {
            return ModelIndex::invalid();
        }
        if !proxy_parent.is_valid() {
            return ModelIndex::with_internal_id(
                row,
                column,
                ModelIndex::invalid(),
                ParentSlot::Top.internal_id(),
            );
        }
        let source_parent = self.map_to_source(source, proxy_parent);
        match self.ensure_mappable(source, &source_parent) {
            Some(id) => ModelIndex::with_internal_id(
                row,
                column,
                proxy_parent.clone(),
                ParentSlot::Child(id).internal_id(),
            ),
            None => ModelIndex::invalid(),
        }
    }

    /// Projected parent of `proxy_index`.
    pub(super) fn parent(&mut self, source: &dyn ItemModel, proxy_index: &ModelIndex) -> ModelIndex {
        if !proxy_index.is_valid() {
            return ModelIndex::invalid();
        }
        match ParentSlot::of(proxy_index) {
            ParentSlot::Top => ModelIndex::invalid(),
            ParentSlot::Child(id) => {
                if !self.allocator.is_live(id) {
                    return ModelIndex::invalid();
                }
                let Some(&key) = self.mapped_parents.right_to_left(&id) else {
                    return ModelIndex::invalid();
                };
                let source_parent = self.resolve(source, key);
                self.map_from_source(source, &source_parent)
            }
        }
    }
}

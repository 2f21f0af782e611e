//! Hierarchical tree model implementation.
//!
//! `TreeModel` stores parent-child data and announces every structural change
//! through [`ModelSignals`], bracketing each change with the matching
//! "about to" and "done" notifications. Node IDs double as the internal IDs of
//! the indices it hands out, so observers can track a node across changes.

use parking_lot::RwLock;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_itemviews_core::logging::targets;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{ItemFlags, ItemModel, ModelSignals};

/// Identifier of a node in a [`TreeModel`]. Never zero.
pub type NodeId = u64;

/// Trait for tree node data that provides its own display information.
///
/// Implement this trait for types that should be directly usable as tree nodes.
pub trait TreeNodeData: Send + Sync {
    /// Returns the primary display text for this node.
    fn display(&self) -> ItemData;

    /// Returns the tooltip text for this node.
    fn tooltip(&self) -> ItemData {
        ItemData::None
    }

    /// Returns data for any other role in column 0.
    fn data(&self, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Returns data for columns after the first.
    fn column_data(&self, _column: usize, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Stores a new value for the given role.
    ///
    /// Returns `false` if the role is read-only for this node.
    fn set_data(&mut self, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for this node.
    fn flags(&self) -> ItemFlags {
        ItemFlags::new()
    }
}

impl TreeNodeData for String {
    fn display(&self) -> ItemData {
        ItemData::from(self.as_str())
    }

    fn set_data(&mut self, value: ItemData, role: ItemRole) -> bool {
        match (role, value) {
            (ItemRole::Display | ItemRole::Edit, ItemData::String(text)) => {
                *self = text;
                true
            }
            _ => false,
        }
    }

    fn flags(&self) -> ItemFlags {
        ItemFlags::new().with_editable(true)
    }
}

/// A node in the tree structure.
struct TreeNode<T> {
    data: T,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

/// Internal storage for tree nodes.
struct TreeStorage<T> {
    nodes: HashMap<NodeId, TreeNode<T>>,
    root_children: Vec<NodeId>,
}

impl<T> TreeStorage<T> {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            root_children: Vec::new(),
        }
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    fn children_of(&self, parent_id: Option<NodeId>) -> &[NodeId] {
        match parent_id {
            None => &self.root_children,
            Some(id) => self
                .nodes
                .get(&id)
                .map(|n| n.children.as_slice())
                .unwrap_or(&[]),
        }
    }

    fn children_of_mut(&mut self, parent_id: Option<NodeId>) -> Option<&mut Vec<NodeId>> {
        match parent_id {
            None => Some(&mut self.root_children),
            Some(id) => self.nodes.get_mut(&id).map(|n| &mut n.children),
        }
    }

    fn child_at(&self, parent_id: Option<NodeId>, index: usize) -> Option<NodeId> {
        self.children_of(parent_id).get(index).copied()
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    fn row_of(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        let siblings = self.children_of(self.parent_of(id));
        siblings.iter().position(|&child_id| child_id == id)
    }

    /// Returns `true` if `id` is `ancestor` or lies below it.
    fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent_of(node);
        }
        false
    }

    fn insert(&mut self, id: NodeId, parent_id: Option<NodeId>, row: usize, data: T) {
        let node = TreeNode {
            data,
            children: Vec::new(),
            parent: parent_id,
        };
        self.nodes.insert(id, node);
        if let Some(siblings) = self.children_of_mut(parent_id) {
            siblings.insert(row, id);
        }
    }

    fn remove_node(&mut self, id: NodeId) -> Option<T> {
        let parent_id = self.parent_of(id);
        if let Some(siblings) = self.children_of_mut(parent_id) {
            siblings.retain(|&child_id| child_id != id);
        }
        self.remove_subtree(id)
    }

    fn remove_subtree(&mut self, id: NodeId) -> Option<T> {
        let node = self.nodes.remove(&id)?;
        for child_id in node.children {
            self.remove_subtree(child_id);
        }
        Some(node.data)
    }

    /// Builds a column-0 index for a node, with its full parent chain.
    fn index_for(&self, id: NodeId) -> Option<ModelIndex> {
        let row = self.row_of(id)?;
        let parent_index = match self.parent_of(id) {
            Some(pid) => self.index_for(pid)?,
            None => ModelIndex::invalid(),
        };
        Some(ModelIndex::with_internal_id(row, 0, parent_index, id))
    }

    fn parent_index_for(&self, parent_id: Option<NodeId>) -> Option<ModelIndex> {
        match parent_id {
            Some(pid) => self.index_for(pid),
            None => Some(ModelIndex::invalid()),
        }
    }
}

/// Type alias for a tree data extractor function.
pub type TreeDataExtractor<T> = Arc<dyn Fn(&T, usize, ItemRole) -> ItemData + Send + Sync>;

/// A hierarchical tree model for displaying parent-child data.
///
/// `TreeModel` stores data in a tree structure where each node can have
/// multiple children. It supports both trait-based and closure-based
/// approaches for data extraction.
///
/// Signals are always emitted with the internal lock released, so connected
/// slots may query the model freely. The model emits `destroyed` when it is
/// dropped.
///
/// # Example
///
/// ```
/// use horizon_itemviews::model::{ItemModel, ModelIndex, TreeModel};
///
/// let model = TreeModel::<String>::new();
/// let docs = model.add_root("Documents".to_string());
/// model.add_child(docs, "notes.txt".to_string());
///
/// let docs_index = model.index(0, 0, &ModelIndex::invalid());
/// assert_eq!(model.row_count(&docs_index), 1);
/// ```
pub struct TreeModel<T> {
    storage: RwLock<TreeStorage<T>>,
    next_id: AtomicU64,
    column_count: usize,
    extractor: Option<TreeDataExtractor<T>>,
    signals: ModelSignals,
}

impl<T: TreeNodeData + 'static> TreeModel<T> {
    /// Creates a new empty tree model.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a new tree model with a custom data extractor.
    ///
    /// The extractor receives the node data, the column and the role, and
    /// replaces the [`TreeNodeData`] accessors for reading.
    pub fn with_extractor<F>(extractor: F) -> Self
    where
        F: Fn(&T, usize, ItemRole) -> ItemData + Send + Sync + 'static,
    {
        Self::build(Some(Arc::new(extractor)))
    }
}

impl<T: TreeNodeData + 'static> Default for TreeModel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync + 'static> TreeModel<T> {
    fn build(extractor: Option<TreeDataExtractor<T>>) -> Self {
        Self {
            storage: RwLock::new(TreeStorage::new()),
            next_id: AtomicU64::new(1),
            column_count: 1,
            extractor,
            signals: ModelSignals::new(),
        }
    }

    /// Sets the number of columns.
    pub fn set_column_count(&mut self, count: usize) {
        self.column_count = count.max(1);
    }

    /// Builder-style variant of [`set_column_count`](Self::set_column_count).
    pub fn with_column_count(mut self, count: usize) -> Self {
        self.set_column_count(count);
        self
    }

    fn allocate_id(&self) -> NodeId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Adds a root-level node after the existing ones and returns its ID.
    pub fn add_root(&self, data: T) -> NodeId {
        let row = self.root_count();
        // The top level always exists.
        self.insert_node(None, row, data).unwrap_or_default()
    }

    /// Adds a child node after the parent's existing children and returns its ID.
    ///
    /// Returns `None` if the parent doesn't exist.
    pub fn add_child(&self, parent_id: NodeId, data: T) -> Option<NodeId> {
        let row = self.storage.read().nodes.get(&parent_id)?.children.len();
        self.insert_node(Some(parent_id), row, data)
    }

    /// Inserts a node at `row` under `parent_id` (`None` for the top level).
    ///
    /// Returns `None` if the parent doesn't exist or `row` is past the end.
    pub fn insert_node(&self, parent_id: Option<NodeId>, row: usize, data: T) -> Option<NodeId> {
        let parent_index = {
            let storage = self.storage.read();
            if let Some(pid) = parent_id
                && !storage.contains(pid)
            {
                return None;
            }
            if row > storage.children_of(parent_id).len() {
                return None;
            }
            storage.parent_index_for(parent_id)?
        };

        let id = self.allocate_id();
        self.signals
            .rows_about_to_be_inserted
            .emit((parent_index.clone(), row, row));
        self.storage.write().insert(id, parent_id, row, data);
        tracing::trace!(target: targets::MODEL, id, row, "node inserted");
        self.signals.rows_inserted.emit((parent_index, row, row));
        Some(id)
    }

    /// Removes a node and all its descendants.
    ///
    /// Returns the removed node's data, or `None` if the node doesn't exist.
    pub fn remove(&self, id: NodeId) -> Option<T> {
        let (row, parent_index) = {
            let storage = self.storage.read();
            let row = storage.row_of(id)?;
            (row, storage.parent_index_for(storage.parent_of(id))?)
        };

        self.signals
            .rows_about_to_be_removed
            .emit((parent_index.clone(), row, row));
        let result = self.storage.write().remove_node(id);
        tracing::trace!(target: targets::MODEL, id, row, "node removed");
        self.signals.rows_removed.emit((parent_index, row, row));
        result
    }

    /// Moves a node (with its subtree) under a new parent.
    ///
    /// `dest_row` is the position among the destination's children *before*
    /// the move, so moving a node one step down within the same parent uses
    /// `row + 2`. Returns `false` if the move is impossible (unknown node,
    /// destination inside the moved subtree, row out of range) or would leave
    /// the tree unchanged.
    pub fn move_node(&self, id: NodeId, new_parent: Option<NodeId>, dest_row: usize) -> bool {
        let (src_row, src_parent_id, src_parent, dst_parent) = {
            let storage = self.storage.read();
            let Some(src_row) = storage.row_of(id) else {
                return false;
            };
            if let Some(pid) = new_parent
                && (!storage.contains(pid) || storage.is_within(pid, id))
            {
                return false;
            }
            if dest_row > storage.children_of(new_parent).len() {
                return false;
            }
            let src_parent_id = storage.parent_of(id);
            if src_parent_id == new_parent && (dest_row == src_row || dest_row == src_row + 1) {
                return false;
            }
            let (Some(src_parent), Some(dst_parent)) = (
                storage.parent_index_for(src_parent_id),
                storage.parent_index_for(new_parent),
            ) else {
                return false;
            };
            (src_row, src_parent_id, src_parent, dst_parent)
        };

        self.signals.rows_about_to_be_moved.emit((
            src_parent.clone(),
            src_row,
            src_row,
            dst_parent.clone(),
            dest_row,
        ));
        {
            let mut storage = self.storage.write();
            if let Some(siblings) = storage.children_of_mut(src_parent_id) {
                siblings.remove(src_row);
            }
            let insert_at = if src_parent_id == new_parent && dest_row > src_row {
                dest_row - 1
            } else {
                dest_row
            };
            if let Some(siblings) = storage.children_of_mut(new_parent) {
                siblings.insert(insert_at, id);
            }
            if let Some(node) = storage.nodes.get_mut(&id) {
                node.parent = new_parent;
            }
        }
        tracing::trace!(target: targets::MODEL, id, src_row, dest_row, "node moved");
        self.signals
            .rows_moved
            .emit((src_parent, src_row, src_row, dst_parent, dest_row));
        true
    }

    /// Reorders the children of `parent_id` (`None` for the top level).
    ///
    /// Emits `layout_about_to_change` / `layout_changed` around the sort.
    pub fn sort_children<F>(&self, parent_id: Option<NodeId>, mut compare: F)
    where
        F: FnMut(&T, &T) -> CmpOrdering,
    {
        self.signals.emit_layout_changed(|| {
            let mut storage = self.storage.write();
            let mut children = storage.children_of(parent_id).to_vec();
            children.sort_by(|a, b| match (storage.nodes.get(a), storage.nodes.get(b)) {
                (Some(a), Some(b)) => compare(&a.data, &b.data),
                _ => CmpOrdering::Equal,
            });
            if let Some(siblings) = storage.children_of_mut(parent_id) {
                *siblings = children;
            }
        });
    }

    /// Clears all nodes from the tree.
    pub fn clear(&self) {
        self.signals.emit_reset(|| {
            let mut storage = self.storage.write();
            storage.nodes.clear();
            storage.root_children.clear();
        });
    }

    /// Returns the number of root-level nodes.
    pub fn root_count(&self) -> usize {
        self.storage.read().root_children.len()
    }

    /// Returns `true` if the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.read().root_children.is_empty()
    }

    /// Returns `true` if a node with this ID is in the tree.
    pub fn contains(&self, id: NodeId) -> bool {
        self.storage.read().contains(id)
    }

    /// Returns the current column-0 index of a node.
    pub fn node_index(&self, id: NodeId) -> ModelIndex {
        self.storage
            .read()
            .index_for(id)
            .unwrap_or_else(ModelIndex::invalid)
    }

    /// Provides read access to a node's data.
    pub fn with_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let storage = self.storage.read();
        storage.nodes.get(&id).map(|node| f(&node.data))
    }

    /// Provides mutable access to a node's data.
    ///
    /// Emits `data_changed` for the node's whole row after modification.
    pub fn modify_node<F, R>(&self, id: NodeId, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let (result, index) = {
            let mut storage = self.storage.write();
            let node = storage.nodes.get_mut(&id)?;
            let result = f(&mut node.data);
            (result, storage.index_for(id)?)
        };
        self.emit_row_changed(index, vec![ItemRole::Display]);
        Some(result)
    }

    fn emit_row_changed(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        let last_column = self.column_count - 1;
        let bottom_right =
            ModelIndex::with_internal_id(index.row(), last_column, index.parent(), index.internal_id());
        self.signals.data_changed.emit((index, bottom_right, roles));
    }

    /// Resolves the node ID behind a parent index (`None` for the top level).
    fn parent_node_id(&self, parent: &ModelIndex) -> Option<NodeId> {
        if parent.is_valid() {
            Some(parent.internal_id())
        } else {
            None
        }
    }

    fn node_data(&self, node: &TreeNode<T>, column: usize, role: ItemRole) -> Option<ItemData> {
        self.extractor
            .as_ref()
            .map(|extractor| extractor(&node.data, column, role))
    }
}

impl<T> Drop for TreeModel<T> {
    fn drop(&mut self) {
        self.signals.destroyed.emit(());
    }
}

impl<T: TreeNodeData + 'static> ItemModel for TreeModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() && parent.column() != 0 {
            return 0;
        }
        let storage = self.storage.read();
        storage.children_of(self.parent_node_id(parent)).len()
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        self.column_count
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() {
            return ItemData::None;
        }

        let storage = self.storage.read();
        let Some(node) = storage.nodes.get(&index.internal_id()) else {
            return ItemData::None;
        };

        if let Some(data) = self.node_data(node, index.column(), role) {
            return data;
        }

        match (index.column(), role) {
            (0, ItemRole::Display) => node.data.display(),
            (0, ItemRole::ToolTip) => node.data.tooltip(),
            (0, _) => node.data.data(role),
            (column, _) => node.data.column_data(column, role),
        }
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        if !index.is_valid() || index.column() != 0 || self.extractor.is_some() {
            return false;
        }
        let changed = {
            let mut storage = self.storage.write();
            match storage.nodes.get_mut(&index.internal_id()) {
                Some(node) => node.data.set_data(value, role),
                None => false,
            }
        };
        if changed {
            self.signals
                .emit_data_changed_single(index.clone(), vec![role]);
        }
        changed
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= self.column_count || (parent.is_valid() && parent.column() != 0) {
            return ModelIndex::invalid();
        }

        let storage = self.storage.read();
        let parent_id = self.parent_node_id(parent);
        let Some(child_id) = storage.child_at(parent_id, row) else {
            return ModelIndex::invalid();
        };
        let Some(parent_index) = storage.parent_index_for(parent_id) else {
            return ModelIndex::invalid();
        };

        ModelIndex::with_internal_id(row, column, parent_index, child_id)
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }

        let storage = self.storage.read();
        storage
            .parent_of(index.internal_id())
            .and_then(|pid| storage.index_for(pid))
            .unwrap_or_else(ModelIndex::invalid)
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn index_for_internal_id(&self, internal_id: u64) -> ModelIndex {
        self.node_index(internal_id)
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        if !index.is_valid() {
            return ItemFlags::disabled();
        }

        if self.extractor.is_some() {
            return ItemFlags::new();
        }

        let storage = self.storage.read();
        storage
            .nodes
            .get(&index.internal_id())
            .map(|n| n.data.flags())
            .unwrap_or_else(ItemFlags::disabled)
    }
}

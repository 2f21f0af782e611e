//! Bookkeeping state of the selection proxy.

use horizon_itemviews_core::logging::targets;

use super::behavior::FilterBehavior;
use crate::model::bihash::{BiHash, BiMap};
use crate::model::identity_allocator::{IdentityAllocator, ParentId};
use crate::model::index::ModelIndex;
use crate::model::traits::ItemModel;

/// Stable identity of a source node: the internal ID of its `ModelIndex`.
pub(super) type NodeKey = u64;

/// Where a projected item hangs in the projection.
///
/// Encoded in `ModelIndex::internal_id` of every projected index: `0` for
/// the top level, otherwise the [`ParentId`] of the projected parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentSlot {
    /// The item is a top-level row of the projection.
    Top,
    /// The item is a child of the projected parent with this id.
    Child(ParentId),
}

impl ParentSlot {
    /// Decodes a slot from a projected index's internal ID.
    pub fn from_internal_id(internal_id: u64) -> Self {
        ParentId::from_raw(internal_id).map_or(Self::Top, Self::Child)
    }

    /// Decodes the slot of a projected index.
    pub fn of(index: &ModelIndex) -> Self {
        Self::from_internal_id(index.internal_id())
    }

    /// Encodes the slot as an internal ID.
    pub fn internal_id(self) -> u64 {
        match self {
            Self::Top => 0,
            Self::Child(id) => id.get(),
        }
    }
}

/// A projected row span recorded between an "about to" notification of the
/// source and the matching "done" notification.
#[derive(Debug, Clone)]
pub(super) enum PendingRows {
    /// Rows in the flat top level, inside the block of the root `parent_key`.
    Flat {
        parent_key: NodeKey,
        /// Projected row where the root's block starts.
        offset: usize,
        /// Child count of the root before the change.
        old_count: usize,
        first: usize,
        last: usize,
    },
    /// Rows below a projected parent.
    Nested {
        parent_key: NodeKey,
        proxy_parent: ModelIndex,
        first: usize,
        last: usize,
    },
}

impl PendingRows {
    /// Returns `true` if the record was taken for rows below source `parent`.
    pub(super) fn is_below(&self, parent: &ModelIndex) -> bool {
        let (Self::Flat { parent_key, .. } | Self::Nested { parent_key, .. }) = self;
        parent.is_valid() && parent.column() == 0 && *parent_key == parent.internal_id()
    }

    /// The projected parent and row span to announce.
    pub(super) fn span(&self) -> (ModelIndex, usize, usize) {
        match self {
            Self::Flat {
                offset,
                first,
                last,
                ..
            } => (ModelIndex::invalid(), offset + first, offset + last),
            Self::Nested {
                proxy_parent,
                first,
                last,
                ..
            } => (proxy_parent.clone(), *first, *last),
        }
    }
}

/// Everything the proxy knows about its projection.
///
/// Guarded by the proxy's mutex. Methods that need the source take it as an
/// argument and never emit signals.
#[derive(Debug)]
pub(super) struct ProxyState {
    pub(super) behavior: FilterBehavior,
    /// Source nodes whose subtrees form the projection, in depth-first order.
    pub(super) root_list: Vec<NodeKey>,
    /// Source nodes whose projected children have been handed out, and the
    /// parent id those children carry.
    pub(super) mapped_parents: BiHash<NodeKey, ParentId>,
    /// First child of each root with children, and the flat row where the
    /// root's block starts. Only used with child-tree behaviors.
    pub(super) first_child_rows: BiMap<NodeKey, usize>,
    pub(super) allocator: IdentityAllocator,
    pub(super) pending_insert: Option<PendingRows>,
    pub(super) pending_remove: Option<PendingRows>,
    pub(super) pending_move: bool,
    pub(super) layout_snapshot: Option<Vec<(NodeKey, ParentId)>>,
    pub(super) layout_changing: bool,
    pub(super) resetting: bool,
}

impl ProxyState {
    pub(super) fn new(behavior: FilterBehavior) -> Self {
        Self {
            behavior,
            root_list: Vec::new(),
            mapped_parents: BiHash::new(),
            first_child_rows: BiMap::new(),
            allocator: IdentityAllocator::new(),
            pending_insert: None,
            pending_remove: None,
            pending_move: false,
            layout_snapshot: None,
            layout_changing: false,
            resetting: false,
        }
    }

    /// Forgets the projection but keeps issued parent ids alive.
    pub(super) fn clear_mappings(&mut self) {
        self.root_list.clear();
        self.mapped_parents.clear();
        self.first_child_rows.clear();
        self.pending_insert = None;
        self.pending_remove = None;
    }

    /// Forgets the projection and invalidates every issued parent id.
    pub(super) fn clear(&mut self) {
        self.clear_mappings();
        self.allocator.clear();
        self.layout_snapshot = None;
        self.pending_move = false;
    }

    /// Current index of a root-list entry.
    pub(super) fn resolve(&self, source: &dyn ItemModel, key: NodeKey) -> ModelIndex {
        source.index_for_internal_id(key)
    }

    pub(super) fn resolved_roots(&self, source: &dyn ItemModel) -> Vec<ModelIndex> {
        self.root_list
            .iter()
            .map(|&key| source.index_for_internal_id(key))
            .collect()
    }

    pub(super) fn root_position(&self, key: NodeKey) -> Option<usize> {
        self.root_list.iter().position(|&k| k == key)
    }

    /// Flat row where the block of the root at `pos` starts.
    pub(super) fn root_offset(&self, source: &dyn ItemModel, pos: usize) -> usize {
        self.root_list[..pos.min(self.root_list.len())]
            .iter()
            .map(|&key| source.row_count(&source.index_for_internal_id(key)))
            .sum()
    }

    /// Total number of top-level rows.
    pub(super) fn top_level_rows(&self, source: &dyn ItemModel) -> usize {
        if self.behavior.start_with_child_trees() {
            self.root_offset(source, self.root_list.len())
        } else {
            self.root_list.len()
        }
    }

    /// Returns `true` if the source node is a top-level row of the projection.
    pub(super) fn is_top_visible(&self, index: &ModelIndex) -> bool {
        if !index.is_valid() {
            return false;
        }
        if self.behavior.start_with_child_trees() {
            let parent = index.parent();
            parent.is_valid() && self.root_list.contains(&parent.internal_id())
        } else {
            self.root_list.contains(&index.internal_id())
        }
    }

    /// Returns `true` if the children of the source node are projected below it.
    pub(super) fn is_projected_parent(&self, index: &ModelIndex) -> bool {
        if !self.behavior.is_hierarchical() || !index.is_valid() {
            return false;
        }
        let mut current = index.clone();
        while current.is_valid() {
            if self.is_top_visible(&current) {
                return true;
            }
            current = current.parent();
        }
        false
    }

    /// Moves every first-child entry at or after `start_row` by `delta` rows.
    pub(super) fn shift_from(&mut self, start_row: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        let moved: Vec<(usize, NodeKey)> = self
            .first_child_rows
            .range_right(start_row..)
            .map(|(&row, &key)| (row, key))
            .collect();
        for (_, key) in &moved {
            self.first_child_rows.remove_left(key);
        }
        for (row, key) in moved {
            self.first_child_rows
                .insert(key, row.saturating_add_signed(delta));
        }
    }

    /// Drops parent ids of nodes that left the source or the projection, and
    /// root-list entries whose nodes left the source.
    pub(super) fn prune(&mut self, source: &dyn ItemModel) {
        let mut mapped = std::mem::take(&mut self.mapped_parents);
        let mapped_before = mapped.len();
        mapped.retain(|&key, _| {
            let index = source.index_for_internal_id(key);
            index.is_valid() && self.is_projected_parent(&index)
        });
        let stale = mapped_before - mapped.len();
        self.mapped_parents = mapped;
        self.first_child_rows
            .retain(|&key, _| source.index_for_internal_id(key).is_valid());

        let before = self.root_list.len();
        self.root_list
            .retain(|&key| source.index_for_internal_id(key).is_valid());

        if stale > 0 || self.root_list.len() != before {
            tracing::trace!(
                target: targets::PROXY,
                parents = stale,
                roots = before - self.root_list.len(),
                "pruned stale mappings"
            );
        }
    }

    /// Restores parent ids recorded before a layout change, for nodes that
    /// still have projected children.
    pub(super) fn restore_parents(&mut self, source: &dyn ItemModel, pairs: Vec<(NodeKey, ParentId)>) {
        for (key, id) in pairs {
            let index = source.index_for_internal_id(key);
            if self.allocator.is_live(id) && self.is_projected_parent(&index) {
                self.mapped_parents.insert(key, id);
            }
        }
    }

    /// Fills the root list from source nodes, without emitting anything.
    ///
    /// `roots` must be column-0 indices, already filtered down to the nodes
    /// the behavior keeps.
    pub(super) fn populate(&mut self, source: &dyn ItemModel, mut roots: Vec<ModelIndex>) {
        roots.sort();
        roots.dedup_by_key(|index| index.internal_id());

        let behavior = self.behavior;
        let mut offset = 0;
        for root in &roots {
            self.root_list.push(root.internal_id());
            if behavior.start_with_child_trees() {
                let count = source.row_count(root);
                if count > 0 {
                    let first_child = source.index(0, 0, root);
                    self.first_child_rows.insert(first_child.internal_id(), offset);
                    offset += count;
                }
            } else if behavior.is_hierarchical() && source.has_children(root) {
                let id = self.allocator.create_id();
                self.mapped_parents.insert(root.internal_id(), id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeModel;

    #[test]
    fn test_parent_slot_encoding() {
        assert_eq!(ParentSlot::from_internal_id(0), ParentSlot::Top);
        assert_eq!(ParentSlot::Top.internal_id(), 0);

        let id = ParentId::from_raw(7).unwrap();
        let slot = ParentSlot::from_internal_id(7);
        assert_eq!(slot, ParentSlot::Child(id));
        assert_eq!(slot.internal_id(), 7);
    }

    #[test]
    fn test_shift_from() {
        let mut state = ProxyState::new(FilterBehavior::SubTreesWithoutRoots);
        state.first_child_rows.insert(10, 0);
        state.first_child_rows.insert(20, 3);
        state.first_child_rows.insert(30, 5);

        state.shift_from(3, 2);
        assert_eq!(state.first_child_rows.left_to_right(&10), Some(&0));
        assert_eq!(state.first_child_rows.left_to_right(&20), Some(&5));
        assert_eq!(state.first_child_rows.left_to_right(&30), Some(&7));

        state.shift_from(1, -1);
        assert_eq!(state.first_child_rows.left_to_right(&20), Some(&4));
        assert_eq!(state.first_child_rows.left_to_right(&30), Some(&6));
        assert_eq!(state.first_child_rows.len(), 3);
    }

    #[test]
    fn test_populate_child_trees() {
        let model = TreeModel::<String>::new();
        let a = model.add_root("A".into());
        let b = model.add_child(a, "B".into()).unwrap();
        model.add_child(a, "C".into());
        let d = model.add_root("D".into());
        let e = model.add_root("E".into());
        let f = model.add_child(e, "F".into()).unwrap();

        let mut state = ProxyState::new(FilterBehavior::SubTreesWithoutRoots);
        // Out of order; D has no children.
        let roots = vec![model.node_index(e), model.node_index(a), model.node_index(d)];
        state.populate(&model, roots);

        assert_eq!(state.root_list, vec![a, d, e]);
        assert_eq!(state.first_child_rows.left_to_right(&b), Some(&0));
        assert_eq!(state.first_child_rows.left_to_right(&f), Some(&2));
        assert_eq!(state.top_level_rows(&model), 3);
        assert_eq!(state.root_offset(&model, 2), 2);
    }

    #[test]
    fn test_projected_parents() {
        let model = TreeModel::<String>::new();
        let a = model.add_root("A".into());
        let b = model.add_child(a, "B".into()).unwrap();
        let c = model.add_child(b, "C".into()).unwrap();
        let d = model.add_root("D".into());

        let mut state = ProxyState::new(FilterBehavior::SubTrees);
        state.populate(&model, vec![model.node_index(a)]);
        assert!(state.is_projected_parent(&model.node_index(a)));
        assert!(state.is_projected_parent(&model.node_index(c)));
        assert!(!state.is_projected_parent(&model.node_index(d)));
        // A has children, so its id is handed out up front.
        assert!(state.mapped_parents.contains_left(&a));

        state.mapped_parents.insert(d, state.allocator.create_id());
        state.prune(&model);
        assert!(!state.mapped_parents.contains_left(&d));
        assert!(state.mapped_parents.contains_left(&a));

        let mut flat = ProxyState::new(FilterBehavior::SubTreesWithoutRoots);
        flat.root_list.push(a);
        assert!(!flat.is_projected_parent(&model.node_index(a)));
        assert!(flat.is_projected_parent(&model.node_index(b)));
    }

    #[test]
    fn test_prune_forgets_removed_nodes() {
        let model = TreeModel::<String>::new();
        let a = model.add_root("A".into());
        let b = model.add_child(a, "B".into()).unwrap();
        model.add_child(b, "X".into());
        model.add_child(a, "C".into());
        let d = model.add_root("D".into());
        let e = model.add_child(d, "E".into()).unwrap();

        let mut state = ProxyState::new(FilterBehavior::SubTreesWithoutRoots);
        state.populate(&model, vec![model.node_index(a), model.node_index(d)]);
        let id = state.allocator.create_id();
        state.mapped_parents.insert(b, id);
        assert_eq!(state.first_child_rows.left_to_right(&b), Some(&0));
        assert_eq!(state.first_child_rows.left_to_right(&e), Some(&2));

        model.remove(b);
        state.prune(&model);
        assert!(!state.mapped_parents.contains_left(&b));
        assert!(!state.mapped_parents.contains_right(&id));
        assert!(!state.first_child_rows.contains_left(&b));
        assert!(!state.first_child_rows.contains_right(&0));
        assert_eq!(state.first_child_rows.left_to_right(&e), Some(&2));
        assert_eq!(state.root_list, vec![a, d]);

        model.remove(d);
        state.prune(&model);
        assert_eq!(state.root_list, vec![a]);
        assert!(!state.first_child_rows.contains_left(&e));
    }
}

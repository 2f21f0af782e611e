//! Keeping the root list in sync with the selection.

use std::collections::HashSet;

use horizon_itemviews_core::logging::{span_names, targets};

use super::behavior::FilterBehavior;
use super::state::{NodeKey, ProxyState};
use super::{SelectionProxyModel, column_zero_nodes, to_selection};
use crate::model::index::ModelIndex;
use crate::model::item_selection::ItemSelection;
use crate::model::selection_normalizer::{
    get_root_list_row, get_root_ranges, is_descendant_of, is_descendant_of_list,
    k_normalize_selection,
};
use crate::model::traits::ItemModel;

/// Roots leaving and entering the projection for one selection change.
#[derive(Debug, Default)]
struct RootDelta {
    removed: Vec<NodeKey>,
    added: Vec<ModelIndex>,
}

impl SelectionProxyModel {
    /// The nodes of `selection` that become roots under `behavior`.
    pub(super) fn roots_of(
        &self,
        source: &dyn ItemModel,
        selection: &ItemSelection,
        behavior: FilterBehavior,
    ) -> Vec<ModelIndex> {
        let nodes = column_zero_nodes(source, selection);
        if behavior.include_all_selected() {
            return nodes;
        }
        column_zero_nodes(source, &get_root_ranges(&to_selection(&nodes)))
    }

    pub(super) fn on_selection_changed(&self, selected: &ItemSelection, deselected: &ItemSelection) {
        let Some(source) = self.source() else {
            return;
        };
        if self.state.lock().resetting {
            return;
        }
        let _span = tracing::debug_span!(target: targets::PROXY, span_names::SELECTION_DELTA).entered();

        let selected = k_normalize_selection(&self.to_source_selection(selected));
        let deselected = k_normalize_selection(&self.to_source_selection(deselected));
        let current = self.current_source_selection();

        let delta = {
            let state = self.state.lock();
            root_delta(&state, source.as_ref(), &current, &selected, &deselected)
        };
        tracing::debug!(
            target: targets::PROXY,
            removed = delta.removed.len(),
            added = delta.added.len(),
            "selection delta"
        );

        if !delta.removed.is_empty() {
            let leaving: Vec<ModelIndex> = delta
                .removed
                .iter()
                .map(|&key| source.index_for_internal_id(key))
                .collect();
            self.root_selection_about_to_be_removed
                .emit(to_selection(&leaving));
            self.remove_roots(source.as_ref(), &delta.removed);
        }

        let mut inserted = Vec::with_capacity(delta.added.len());
        for node in delta.added {
            if self.insert_root(source.as_ref(), &node) {
                inserted.push(node);
            }
        }
        if !inserted.is_empty() {
            self.root_selection_added.emit(to_selection(&inserted));
        }
    }

    /// Removes roots from the projection, one contiguous block at a time.
    pub(super) fn remove_roots(&self, source: &dyn ItemModel, keys: &[NodeKey]) {
        let keys: HashSet<NodeKey> = keys.iter().copied().collect();
        loop {
            let (block, row, span) = {
                let state = self.state.lock();
                let Some(start) = state.root_list.iter().position(|key| keys.contains(key)) else {
                    break;
                };
                let end = state.root_list[start..]
                    .iter()
                    .take_while(|key| keys.contains(key))
                    .count()
                    + start;
                let block: Vec<NodeKey> = state.root_list[start..end].to_vec();
                let (row, span) = if state.behavior.start_with_child_trees() {
                    let span = block
                        .iter()
                        .map(|&key| source.row_count(&source.index_for_internal_id(key)))
                        .sum();
                    (state.root_offset(source, start), span)
                } else {
                    (start, block.len())
                };
                (block, row, span)
            };

            for &key in &block {
                self.root_index_about_to_be_removed
                    .emit(source.index_for_internal_id(key));
            }
            if span > 0 {
                self.signals
                    .rows_about_to_be_removed
                    .emit((ModelIndex::invalid(), row, row + span - 1));
            }
            {
                let mut state = self.state.lock();
                state.root_list.retain(|key| !block.contains(key));
                if state.behavior.start_with_child_trees() && span > 0 {
                    let dropped: Vec<NodeKey> = state
                        .first_child_rows
                        .range_right(row..row + span)
                        .map(|(_, &key)| key)
                        .collect();
                    for key in &dropped {
                        state.first_child_rows.remove_left(key);
                    }
                    state.shift_from(row + span, -(span as isize));
                }
                state.prune(source);
            }
            tracing::trace!(target: targets::PROXY, roots = block.len(), row, span, "roots removed");
            if span > 0 {
                self.signals
                    .rows_removed
                    .emit((ModelIndex::invalid(), row, row + span - 1));
            }
        }
    }

    /// Adds `node` to the projection at its depth-first position.
    ///
    /// Returns `false` if it already is a root.
    pub(super) fn insert_root(&self, source: &dyn ItemModel, node: &ModelIndex) -> bool {
        let key = node.internal_id();
        let (slot, row, count, behavior) = {
            let state = self.state.lock();
            if state.root_position(key).is_some() {
                return false;
            }
            let slot = get_root_list_row(&state.resolved_roots(source), node);
            if state.behavior.start_with_child_trees() {
                (slot, state.root_offset(source, slot), source.row_count(node), state.behavior)
            } else {
                (slot, slot, 1, state.behavior)
            }
        };

        if count == 0 {
            self.state.lock().root_list.insert(slot, key);
            tracing::trace!(target: targets::PROXY, slot, "childless root registered");
            self.root_index_added.emit(node.clone());
            return true;
        }

        self.signals
            .rows_about_to_be_inserted
            .emit((ModelIndex::invalid(), row, row + count - 1));
        {
            let mut state = self.state.lock();
            state.root_list.insert(slot, key);
            if behavior.start_with_child_trees() {
                state.shift_from(row, count as isize);
                let first_child = source.index(0, 0, node);
                state.first_child_rows.insert(first_child.internal_id(), row);
            } else if behavior.is_hierarchical() && source.has_children(node) {
                state.ensure_mappable(source, node);
            }
        }
        tracing::trace!(target: targets::PROXY, slot, row, count, "root inserted");
        self.signals
            .rows_inserted
            .emit((ModelIndex::invalid(), row, row + count - 1));
        self.root_index_added.emit(node.clone());
        true
    }
}

/// Works out which roots leave and which enter the projection.
///
/// `current` is the selection after the change. Without
/// `include_all_selected`, a newly selected node only becomes a root if no
/// ancestor is still selected, it hides existing roots below it, and removing
/// a root exposes the top-most selected nodes left below it.
fn root_delta(
    state: &ProxyState,
    source: &dyn ItemModel,
    current: &ItemSelection,
    selected: &ItemSelection,
    deselected: &ItemSelection,
) -> RootDelta {
    let selected_nodes = column_zero_nodes(source, selected);
    let deselected_keys: HashSet<NodeKey> = column_zero_nodes(source, deselected)
        .iter()
        .map(ModelIndex::internal_id)
        .collect();
    let roots = state.resolved_roots(source);

    let leaving: Vec<ModelIndex> = roots
        .iter()
        .filter(|root| deselected_keys.contains(&root.internal_id()))
        .cloned()
        .collect();

    let mut delta = RootDelta::default();
    let entering: Vec<ModelIndex> = if state.behavior.include_all_selected() {
        delta.removed = leaving.iter().map(ModelIndex::internal_id).collect();
        selected_nodes
    } else {
        let selected_keys: HashSet<NodeKey> =
            selected_nodes.iter().map(ModelIndex::internal_id).collect();
        let current_nodes = column_zero_nodes(source, current);

        let before: Vec<ModelIndex> = current_nodes
            .iter()
            .filter(|node| !selected_keys.contains(&node.internal_id()))
            .cloned()
            .collect();
        let before_roots = get_root_ranges(&to_selection(&before));

        let new_roots: Vec<ModelIndex> =
            column_zero_nodes(source, &get_root_ranges(&to_selection(&selected_nodes)))
                .into_iter()
                .filter(|node| !is_descendant_of(&before_roots, node))
                .collect();

        let obscured = roots
            .iter()
            .filter(|root| is_descendant_of_list(&new_roots, root))
            .map(ModelIndex::internal_id);

        let exposed: Vec<ModelIndex> =
            column_zero_nodes(source, &get_root_ranges(&to_selection(&current_nodes)))
                .into_iter()
                .filter(|node| is_descendant_of_list(&leaving, node))
                .collect();

        delta.removed = leaving
            .iter()
            .map(ModelIndex::internal_id)
            .chain(obscured)
            .collect();
        new_roots.into_iter().chain(exposed).collect()
    };

    let removed: HashSet<NodeKey> = delta.removed.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut added: Vec<ModelIndex> = entering
        .into_iter()
        .filter(|node| {
            let key = node.internal_id();
            (removed.contains(&key) || state.root_position(key).is_none()) && seen.insert(key)
        })
        .collect();
    added.sort();
    delta.removed.sort_unstable();
    delta.removed.dedup();
    delta.added = added;
    delta
}

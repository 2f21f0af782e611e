//! Reacting to changes of the source model.

use horizon_itemviews_core::logging::targets;
use horizon_itemviews_core::{PerfSpan, itemviews_debug};

use super::state::{NodeKey, PendingRows, ProxyState};
use super::{SelectionProxyModel, to_selection};
use crate::model::index::ModelIndex;
use crate::model::role::ItemRole;
use crate::model::traits::ItemModel;

/// Returns `true` if `a` and `b` denote the same parent, the top level included.
fn same_parent(a: &ModelIndex, b: &ModelIndex) -> bool {
    (!a.is_valid() && !b.is_valid()) || a.same_node(b)
}

impl ProxyState {
    /// Projected span for rows `first..=last` below `parent`, if any of it is shown.
    fn pending_rows(
        &mut self,
        source: &dyn ItemModel,
        parent: &ModelIndex,
        first: usize,
        last: usize,
    ) -> Option<PendingRows> {
        if self.resetting || self.root_list.is_empty() {
            return None;
        }
        if !parent.is_valid() || parent.column() != 0 || self.behavior.omit_children() {
            return None;
        }
        let key = parent.internal_id();
        if self.behavior.start_with_child_trees()
            && let Some(pos) = self.root_position(key)
        {
            return Some(PendingRows::Flat {
                parent_key: key,
                offset: self.root_offset(source, pos),
                old_count: source.row_count(parent),
                first,
                last,
            });
        }
        if !self.behavior.is_hierarchical() {
            return None;
        }
        let proxy_parent = self.map_from_source(source, parent);
        proxy_parent.is_valid().then_some(PendingRows::Nested {
            parent_key: key,
            proxy_parent,
            first,
            last,
        })
    }

    /// Hands out parent ids to inserted rows that have children of their own.
    fn register_inserted(&mut self, source: &dyn ItemModel, parent: &ModelIndex, first: usize, last: usize) {
        if !self.behavior.is_hierarchical() {
            return;
        }
        for row in first..=last {
            let child = source.index(row, 0, parent);
            if source.has_children(&child) {
                self.ensure_mappable(source, &child);
            }
        }
    }
}

impl SelectionProxyModel {
    // =========================================================================
    // Insertion
    // =========================================================================

    pub(super) fn on_rows_about_to_be_inserted(&self, parent: &ModelIndex, first: usize, last: usize) {
        let Some(source) = self.source() else {
            return;
        };
        if !self.selection.has_selection() {
            return;
        }
        let pending = {
            let mut state = self.state.lock();
            let pending = state.pending_rows(source.as_ref(), parent, first, last);
            state.pending_insert = pending.clone();
            pending
        };
        if let Some(pending) = pending {
            let (proxy_parent, first, last) = pending.span();
            tracing::trace!(target: targets::PROXY, first, last, "source rows about to be inserted");
            self.signals
                .rows_about_to_be_inserted
                .emit((proxy_parent, first, last));
        }
    }

    pub(super) fn on_rows_inserted(&self, parent: &ModelIndex, first: usize, last: usize) {
        let Some(source) = self.source() else {
            return;
        };
        let span = {
            let mut state = self.state.lock();
            let pending = match state.pending_insert.take() {
                Some(pending) if pending.is_below(parent) => pending,
                other => {
                    state.pending_insert = other;
                    itemviews_debug!(first, last, "unmatched rows inserted ignored");
                    return;
                }
            };
            match &pending {
                PendingRows::Flat {
                    offset,
                    old_count,
                    first: pending_first,
                    last: pending_last,
                    ..
                } => {
                    let inserted = pending_last - pending_first + 1;
                    if *old_count > 0 {
                        state.first_child_rows.remove_right(offset);
                    }
                    state.shift_from(*offset, inserted as isize);
                    let first_child = source.index(0, 0, parent);
                    state
                        .first_child_rows
                        .insert(first_child.internal_id(), *offset);
                }
                PendingRows::Nested { .. } => {
                    state.ensure_mappable(source.as_ref(), parent);
                }
            }
            state.register_inserted(source.as_ref(), parent, first, last);
            pending.span()
        };
        self.signals.rows_inserted.emit(span);
    }

    // =========================================================================
    // Removal
    // =========================================================================

    pub(super) fn on_rows_about_to_be_removed(&self, parent: &ModelIndex, first: usize, last: usize) {
        let Some(source) = self.source() else {
            return;
        };

        // Roots inside the removed range leave first.
        let leaving: Vec<NodeKey> = {
            let state = self.state.lock();
            if state.resetting {
                return;
            }
            state
                .resolved_roots(source.as_ref())
                .into_iter()
                .filter(|root| {
                    root.is_valid()
                        && std::iter::once(root.clone())
                            .chain(root.ancestors())
                            .any(|node| {
                                same_parent(&node.parent(), parent)
                                    && (first..=last).contains(&node.row())
                            })
                })
                .map(|root| root.internal_id())
                .collect()
        };
        if !leaving.is_empty() {
            let nodes: Vec<ModelIndex> = leaving
                .iter()
                .map(|&key| source.index_for_internal_id(key))
                .collect();
            self.root_selection_about_to_be_removed
                .emit(to_selection(&nodes));
            self.remove_roots(source.as_ref(), &leaving);
        }

        let pending = {
            let mut state = self.state.lock();
            let pending = state.pending_rows(source.as_ref(), parent, first, last);
            state.pending_remove = pending.clone();
            pending
        };
        if let Some(pending) = pending {
            let (proxy_parent, first, last) = pending.span();
            tracing::trace!(target: targets::PROXY, first, last, "source rows about to be removed");
            self.signals
                .rows_about_to_be_removed
                .emit((proxy_parent, first, last));
        }
    }

    pub(super) fn on_rows_removed(&self, parent: &ModelIndex, first: usize, last: usize) {
        let Some(source) = self.source() else {
            return;
        };
        let span = {
            let mut state = self.state.lock();
            let pending = match state.pending_remove.take() {
                Some(pending) if pending.is_below(parent) => Some(pending),
                other => {
                    state.pending_remove = other;
                    None
                }
            };
            if let Some(PendingRows::Flat {
                offset,
                old_count,
                first: pending_first,
                last: pending_last,
                ..
            }) = &pending
            {
                let removed = pending_last - pending_first + 1;
                state.first_child_rows.remove_right(offset);
                state.shift_from(offset + 1, -(removed as isize));
                if *old_count > removed {
                    let first_child = source.index(0, 0, parent);
                    state
                        .first_child_rows
                        .insert(first_child.internal_id(), *offset);
                }
            }
            state.prune(source.as_ref());
            pending.map(|pending| pending.span())
        };
        match span {
            Some(span) => self.signals.rows_removed.emit(span),
            None => itemviews_debug!(first, last, "rows removed outside the projection"),
        }
    }

    // =========================================================================
    // Moves
    // =========================================================================

    /// Moves are recovered from by resetting the projection.
    pub(super) fn on_rows_about_to_be_moved(&self) {
        {
            let mut state = self.state.lock();
            if state.resetting || state.root_list.is_empty() {
                return;
            }
            state.pending_move = true;
        }
        tracing::debug!(target: targets::PROXY, "source rows moving, resetting projection");
        self.signals.model_about_to_reset.emit(());
    }

    pub(super) fn on_rows_moved(&self) {
        let Some(source) = self.source() else {
            return;
        };
        if !std::mem::take(&mut self.state.lock().pending_move) {
            return;
        }
        let current = self.current_source_selection();
        {
            let mut state = self.state.lock();
            let behavior = state.behavior;
            state.clear();
            let roots = self.roots_of(source.as_ref(), &current, behavior);
            state.populate(source.as_ref(), roots);
        }
        self.signals.model_reset.emit(());
    }

    // =========================================================================
    // Data
    // =========================================================================

    /// Forwards a source data change as one notification per run of
    /// consecutive projected rows sharing a projected parent.
    pub(super) fn on_data_changed(
        &self,
        top_left: &ModelIndex,
        bottom_right: &ModelIndex,
        roles: &[ItemRole],
    ) {
        let Some(source) = self.source() else {
            return;
        };
        let runs = {
            let mut state = self.state.lock();
            if state.resetting || state.root_list.is_empty() {
                return;
            }
            let parent = top_left.parent();
            let mut runs: Vec<(ModelIndex, ModelIndex)> = Vec::new();
            let mut current: Option<(ModelIndex, ModelIndex)> = None;
            for row in top_left.row()..=bottom_right.row() {
                let left = source.index(row, top_left.column(), &parent);
                let right = source.index(row, bottom_right.column(), &parent);
                let left = state.map_from_source(source.as_ref(), &left);
                let right = state.map_from_source(source.as_ref(), &right);
                if !left.is_valid() || !right.is_valid() {
                    runs.extend(current.take());
                    continue;
                }
                let extends = matches!(
                    &current,
                    Some((_, end)) if end.parent() == left.parent() && end.row() + 1 == left.row()
                );
                match current.as_mut() {
                    Some((_, end)) if extends => *end = right,
                    _ => {
                        runs.extend(current.take());
                        current = Some((left, right));
                    }
                }
            }
            runs.extend(current);
            runs
        };
        for (start, end) in runs {
            self.signals.data_changed.emit((start, end, roles.to_vec()));
        }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    pub(super) fn on_layout_about_to_change(&self) {
        {
            let mut state = self.state.lock();
            if state.layout_changing || state.resetting || !self.selection.has_selection() {
                return;
            }
            state.layout_changing = true;
            let pairs = state
                .mapped_parents
                .iter()
                .map(|(&key, &id)| (key, id))
                .collect();
            state.layout_snapshot = Some(pairs);
        }
        self.root_selection_about_to_be_removed
            .emit(self.source_root_selection());
        self.signals.layout_about_to_change.emit(());
    }

    pub(super) fn on_layout_changed(&self) {
        let Some(source) = self.source() else {
            return;
        };
        if !self.state.lock().layout_changing {
            return;
        }
        let _perf = PerfSpan::new("selection_proxy_layout_rebuild");
        let current = self.current_source_selection();
        {
            let mut state = self.state.lock();
            let behavior = state.behavior;
            let snapshot = state.layout_snapshot.take().unwrap_or_default();
            state.clear_mappings();
            let roots = self.roots_of(source.as_ref(), &current, behavior);
            state.populate(source.as_ref(), roots);
            state.restore_parents(source.as_ref(), snapshot);
            state.layout_changing = false;
        }
        tracing::debug!(target: targets::PROXY, "projection rebuilt after layout change");
        self.root_selection_added.emit(self.source_root_selection());
        self.signals.layout_changed.emit(());
    }

    // =========================================================================
    // Reset and teardown
    // =========================================================================

    pub(super) fn on_model_about_to_reset(&self) {
        self.state.lock().resetting = true;
        self.selection.clear_selection();
        tracing::debug!(target: targets::PROXY, "source about to reset");
        self.signals.model_about_to_reset.emit(());
        self.state.lock().clear();
    }

    pub(super) fn on_model_reset(&self) {
        {
            let mut state = self.state.lock();
            state.clear();
            state.resetting = false;
        }
        self.signals.model_reset.emit(());
    }

    pub(super) fn on_source_destroyed(&self) {
        self.state.lock().clear();
        // The source's signals are going away with it.
        self.source_connections.lock().clear();
        *self.source.write() = None;
        tracing::debug!(target: targets::PROXY, "source destroyed");
        self.signals.emit_reset(|| {});
    }
}

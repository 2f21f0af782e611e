//! Core traits for the Model/View architecture.
//!
//! This module defines the fundamental traits that models must implement
//! to work with selection models, proxies and views.

use horizon_itemviews_core::Signal;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};

/// Flags indicating what operations are allowed on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItemFlags {
    /// Item can be selected.
    pub selectable: bool,
    /// Item can be edited.
    pub editable: bool,
    /// Item can be dragged.
    pub drag_enabled: bool,
    /// Item can receive drops.
    pub drop_enabled: bool,
    /// Item has a checkbox.
    pub checkable: bool,
    /// Item is enabled (can interact).
    pub enabled: bool,
    /// Item should never have children (optimizes views).
    pub never_has_children: bool,
}

impl ItemFlags {
    /// Creates flags with all defaults (selectable and enabled only).
    pub fn new() -> Self {
        Self {
            selectable: true,
            enabled: true,
            ..Default::default()
        }
    }

    /// Creates flags for a disabled item.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Sets the editable flag.
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the drag enabled flag.
    pub fn with_drag(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    /// Sets the drop enabled flag.
    pub fn with_drop(mut self, enabled: bool) -> Self {
        self.drop_enabled = enabled;
        self
    }

    /// Sets the never-has-children flag.
    pub fn with_never_has_children(mut self, never: bool) -> Self {
        self.never_has_children = never;
        self
    }
}

/// The core trait for item models in the Model/View architecture.
///
/// `ItemModel` provides a flexible interface for representing hierarchical
/// data. Views, selection models and proxies use this interface to query data
/// without needing to know the underlying data structure.
///
/// # Implementation Requirements
///
/// At minimum, you must implement:
/// - [`row_count`](ItemModel::row_count) - Number of rows under a parent
/// - [`column_count`](ItemModel::column_count) - Number of columns
/// - [`data`](ItemModel::data) - Data for a given index and role
/// - [`index`](ItemModel::index) - Create an index for a position
/// - [`parent`](ItemModel::parent) - Get the parent of an index
/// - [`signals`](ItemModel::signals) - Change notifications
///
/// Models whose internal IDs identify nodes stably should also implement
/// [`index_for_internal_id`](ItemModel::index_for_internal_id); selection
/// models and the selection proxy rely on it to track nodes across changes.
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Return `ItemData::None` if the index is invalid, the role is not
    /// supported, or there's no data for that role.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Return `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index.
    ///
    /// Return `ModelIndex::invalid()` for root-level items and invalid indices.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    /// Returns the signals for this model.
    fn signals(&self) -> &ModelSignals;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns the current column-0 index of the item with the given internal ID.
    ///
    /// Returns `ModelIndex::invalid()` if no such item exists any more. The
    /// default implementation does not track identities and always returns an
    /// invalid index.
    fn index_for_internal_id(&self, _internal_id: u64) -> ModelIndex {
        ModelIndex::invalid()
    }

    /// Sets the data for the given index and role.
    ///
    /// Returns `true` if the data was successfully set.
    /// The default implementation returns `false` (read-only).
    fn set_data(&self, _index: &ModelIndex, _value: ItemData, _role: ItemRole) -> bool {
        false
    }

    /// Returns the flags for the item at the given index.
    ///
    /// The default returns selectable and enabled flags.
    fn flags(&self, _index: &ModelIndex) -> ItemFlags {
        ItemFlags::new()
    }

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns header data for the given section (row or column header).
    ///
    /// The default returns `ItemData::None`.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Returns the display text for an item (convenience for `data(index, Display)`).
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Creates a sibling index at the given row and column.
    ///
    /// This validates against the model.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &self.parent(index))
    }

    /// Finds siblings of `start` whose data for `role` matches `value`.
    ///
    /// The search begins at `start`'s row, runs to the last sibling and wraps
    /// around to the rows before `start`. It stops after `hits` matches, or
    /// searches every sibling when `hits` is `None`.
    fn match_items(
        &self,
        start: &ModelIndex,
        role: ItemRole,
        value: &ItemData,
        hits: Option<usize>,
    ) -> Vec<ModelIndex> {
        let mut found = Vec::new();
        if !start.is_valid() {
            return found;
        }
        let parent = self.parent(start);
        let rows = self.row_count(&parent);
        let limit = hits.unwrap_or(usize::MAX);
        for row in (start.row()..rows).chain(0..start.row().min(rows)) {
            if found.len() >= limit {
                break;
            }
            let candidate = self.index(row, start.column(), &parent);
            if self.data(&candidate, role).matches(value) {
                found.push(candidate);
            }
        }
        found
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Horizontal header (column headers).
    Horizontal,
    /// Vertical header (row headers).
    Vertical,
}

/// Collection of signals emitted by item models.
///
/// Observers connect to these signals to stay synchronized with the model.
/// Models must bracket every structural change with the matching
/// "about to" and "done" signals, and must not change again before the
/// "done" signal has been emitted.
pub struct ModelSignals {
    /// Emitted just before rows are inserted.
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been inserted.
    /// Args: (parent index, first row, last row)
    pub rows_inserted: Signal<(ModelIndex, usize, usize)>,

    /// Emitted just before rows are removed.
    /// Args: (parent index, first row, last row)
    pub rows_about_to_be_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (parent index, first row, last row)
    pub rows_removed: Signal<(ModelIndex, usize, usize)>,

    /// Emitted just before rows are moved.
    /// Args: (source parent, source first, source last, dest parent, dest row)
    pub rows_about_to_be_moved: Signal<(ModelIndex, usize, usize, ModelIndex, usize)>,

    /// Emitted after rows have been moved.
    /// Args: (source parent, source first, source last, dest parent, dest row)
    pub rows_moved: Signal<(ModelIndex, usize, usize, ModelIndex, usize)>,

    /// Emitted when data in existing items changes.
    /// Args: (top-left index, bottom-right index, changed roles)
    pub data_changed: Signal<(ModelIndex, ModelIndex, Vec<ItemRole>)>,

    /// Emitted when header data changes.
    /// Args: (orientation, first section, last section)
    pub header_data_changed: Signal<(Orientation, usize, usize)>,

    /// Emitted before a layout change (e.g., sorting).
    pub layout_about_to_change: Signal<()>,

    /// Emitted after a layout change.
    pub layout_changed: Signal<()>,

    /// Emitted before the model is reset.
    pub model_about_to_reset: Signal<()>,

    /// Emitted after the model has been reset.
    pub model_reset: Signal<()>,

    /// Emitted while the model is being dropped.
    pub destroyed: Signal<()>,
}

impl Default for ModelSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelSignals {
    /// Creates a new set of model signals.
    pub fn new() -> Self {
        Self {
            rows_about_to_be_inserted: Signal::new(),
            rows_inserted: Signal::new(),
            rows_about_to_be_removed: Signal::new(),
            rows_removed: Signal::new(),
            rows_about_to_be_moved: Signal::new(),
            rows_moved: Signal::new(),
            data_changed: Signal::new(),
            header_data_changed: Signal::new(),
            layout_about_to_change: Signal::new(),
            layout_changed: Signal::new(),
            model_about_to_reset: Signal::new(),
            model_reset: Signal::new(),
            destroyed: Signal::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Convenience methods for emitting signals
    // -------------------------------------------------------------------------

    /// Emits signals for row insertion.
    ///
    /// Calls the provided function between the about_to_be_inserted and inserted signals.
    pub fn emit_rows_inserted<F>(&self, parent: ModelIndex, first: usize, last: usize, insert_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_inserted
            .emit((parent.clone(), first, last));
        insert_fn();
        self.rows_inserted.emit((parent, first, last));
    }

    /// Emits signals for row removal.
    ///
    /// Calls the provided function between the about_to_be_removed and removed signals.
    pub fn emit_rows_removed<F>(&self, parent: ModelIndex, first: usize, last: usize, remove_fn: F)
    where
        F: FnOnce(),
    {
        self.rows_about_to_be_removed
            .emit((parent.clone(), first, last));
        remove_fn();
        self.rows_removed.emit((parent, first, last));
    }

    /// Emits the data_changed signal for a single item.
    pub fn emit_data_changed_single(&self, index: ModelIndex, roles: Vec<ItemRole>) {
        self.data_changed.emit((index.clone(), index, roles));
    }

    /// Emits signals for a model reset.
    ///
    /// Calls the provided function between the about_to_reset and reset signals.
    pub fn emit_reset<F>(&self, reset_fn: F)
    where
        F: FnOnce(),
    {
        self.model_about_to_reset.emit(());
        reset_fn();
        self.model_reset.emit(());
    }

    /// Emits signals for a layout change.
    ///
    /// Calls the provided function between the about_to_change and changed signals.
    pub fn emit_layout_changed<F>(&self, change_fn: F)
    where
        F: FnOnce(),
    {
        self.layout_about_to_change.emit(());
        change_fn();
        self.layout_changed.emit(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_item_flags() {
        let flags = ItemFlags::new();
        assert!(flags.selectable);
        assert!(flags.enabled);
        assert!(!flags.editable);

        let editable = ItemFlags::new().with_editable(true).with_drag(true);
        assert!(editable.editable);
        assert!(editable.drag_enabled);
        assert!(!ItemFlags::disabled().enabled);
    }

    #[test]
    fn test_model_signals_creation() {
        let signals = ModelSignals::new();
        assert_eq!(signals.rows_inserted.connection_count(), 0);
        assert_eq!(signals.destroyed.connection_count(), 0);
    }

    #[test]
    fn test_emit_rows_inserted() {
        let signals = ModelSignals::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let recv_about = received.clone();
        signals
            .rows_about_to_be_inserted
            .connect(move |(parent, first, last)| {
                recv_about
                    .lock()
                    .push(("about", parent.row(), *first, *last));
            });

        let recv_done = received.clone();
        signals.rows_inserted.connect(move |(parent, first, last)| {
            recv_done.lock().push(("done", parent.row(), *first, *last));
        });

        let parent = ModelIndex::with_internal_id(5, 0, ModelIndex::invalid(), 1);
        signals.emit_rows_inserted(parent, 0, 2, || {});

        let events = received.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ("about", 5, 0, 2));
        assert_eq!(events[1], ("done", 5, 0, 2));
    }

    #[test]
    fn test_emit_reset() {
        let signals = ModelSignals::new();
        let counter = Arc::new(Mutex::new(0));

        let c1 = counter.clone();
        signals.model_about_to_reset.connect(move |_| {
            *c1.lock() += 1;
        });

        let c2 = counter.clone();
        signals.model_reset.connect(move |_| {
            *c2.lock() += 10;
        });

        signals.emit_reset(|| {});
        assert_eq!(*counter.lock(), 11);
    }
}

//! Selection model for item views.
//!
//! This module provides [`ItemSelectionModel`], which tracks the selected
//! items of one [`ItemModel`] and reports every change as a pair of
//! selected / deselected [`ItemSelection`] deltas.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_itemviews::model::{
//!     ItemModel, ItemSelectionModel, ModelIndex, SelectionFlags, TreeModel,
//! };
//!
//! let model = Arc::new(TreeModel::<String>::new());
//! model.add_root("Documents".to_string());
//!
//! let selection = ItemSelectionModel::new(model.clone());
//! selection.selection_changed.connect(|(selected, deselected)| {
//!     println!("Selection changed: +{} -{}", selected.len(), deselected.len());
//! });
//!
//! let index = model.index(0, 0, &ModelIndex::invalid());
//! selection.select(&index, SelectionFlags::SELECT);
//! assert!(selection.is_selected(&index));
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use horizon_itemviews_core::logging::targets;
use horizon_itemviews_core::{ConnectionId, Signal};
use parking_lot::{Mutex, RwLock};

use super::index::ModelIndex;
use super::item_selection::{ItemSelection, SelectionRange};
use super::selection_normalizer::k_normalize_selection;
use super::traits::ItemModel;

/// Selection behavior mode for views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No items can be selected.
    NoSelection,
    /// Only one item can be selected at a time.
    SingleSelection,
    /// Multiple items can be selected with Ctrl+click.
    MultiSelection,
    /// Range selection with Shift+click, extended by Ctrl+click (default).
    #[default]
    ExtendedSelection,
}

/// Flags controlling selection operations.
///
/// These flags can be combined to perform complex selection operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionFlags {
    /// Clear existing selection before applying operation.
    pub clear: bool,
    /// Select the specified indices.
    pub select: bool,
    /// Deselect the specified indices.
    pub deselect: bool,
    /// Toggle selection state of specified indices.
    pub toggle: bool,
}

impl SelectionFlags {
    /// No operation.
    pub const NONE: Self = Self::empty();

    /// Clear existing selection.
    pub const CLEAR: Self = Self {
        clear: true,
        ..Self::empty()
    };

    /// Select the index.
    pub const SELECT: Self = Self {
        select: true,
        ..Self::empty()
    };

    /// Deselect the index.
    pub const DESELECT: Self = Self {
        deselect: true,
        ..Self::empty()
    };

    /// Toggle selection of the index.
    pub const TOGGLE: Self = Self {
        toggle: true,
        ..Self::empty()
    };

    /// Clear existing selection and select the index.
    pub const CLEAR_AND_SELECT: Self = Self {
        clear: true,
        select: true,
        ..Self::empty()
    };

    const fn empty() -> Self {
        Self {
            clear: false,
            select: false,
            deselect: false,
            toggle: false,
        }
    }

    /// Creates flags with clear set.
    pub fn with_clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// Creates flags with select set.
    pub fn with_select(mut self) -> Self {
        self.select = true;
        self
    }
}

/// A selected cell: the node's internal ID and the column.
type Cell = (u64, usize);

struct SelectionState {
    mode: SelectionMode,
    /// Selected cells in selection order.
    cells: Vec<Cell>,
    /// Same cells, for O(1) lookup.
    lookup: HashSet<Cell>,
}

impl SelectionState {
    fn insert(&mut self, cell: Cell) -> bool {
        if self.lookup.insert(cell) {
            self.cells.push(cell);
            true
        } else {
            false
        }
    }

    fn remove(&mut self, cell: Cell) -> bool {
        if self.lookup.remove(&cell) {
            self.cells.retain(|c| *c != cell);
            true
        } else {
            false
        }
    }

    fn clear(&mut self) -> Vec<Cell> {
        self.lookup.clear();
        std::mem::take(&mut self.cells)
    }
}

/// Tracks the selected items of one model.
///
/// Items are remembered by their internal ID and column, so the model must
/// implement [`ItemModel::index_for_internal_id`]. Selected items follow their
/// nodes across insertions, moves and sorting. Items removed from the model
/// drop out of the selection silently, and a model reset clears it silently.
///
/// All methods take `&self`; the model is shared as `Arc<ItemSelectionModel>`.
/// `selection_changed` is emitted after the internal lock has been released.
///
/// # Signals
///
/// - `selection_changed`: emitted with the (selected, deselected) deltas,
///   each normalized into sorted, merged ranges
pub struct ItemSelectionModel {
    model: Weak<dyn ItemModel>,
    state: RwLock<SelectionState>,
    connections: Mutex<Vec<(ModelConnection, ConnectionId)>>,

    /// Emitted when selection changes. Args: (selected, deselected)
    pub selection_changed: Signal<(ItemSelection, ItemSelection)>,
}

#[derive(Debug, Clone, Copy)]
enum ModelConnection {
    RowsRemoved,
    ModelReset,
}

static_assertions::assert_impl_all!(ItemSelectionModel: Send, Sync);

impl ItemSelectionModel {
    /// Creates a selection model observing `model`.
    pub fn new(model: Arc<dyn ItemModel>) -> Arc<Self> {
        let selection = Arc::new(Self {
            model: Arc::downgrade(&model),
            state: RwLock::new(SelectionState {
                mode: SelectionMode::default(),
                cells: Vec::new(),
                lookup: HashSet::new(),
            }),
            connections: Mutex::new(Vec::new()),
            selection_changed: Signal::new(),
        });
        selection.connect_model(&model);
        selection
    }

    fn connect_model(self: &Arc<Self>, model: &Arc<dyn ItemModel>) {
        let signals = model.signals();

        let weak = Arc::downgrade(self);
        let removed = signals.rows_removed.connect(move |_| {
            if let Some(this) = weak.upgrade() {
                this.prune_removed();
            }
        });

        let weak = Arc::downgrade(self);
        let reset = signals.model_reset.connect(move |_| {
            if let Some(this) = weak.upgrade() {
                this.reset();
            }
        });

        *self.connections.lock() = vec![
            (ModelConnection::RowsRemoved, removed),
            (ModelConnection::ModelReset, reset),
        ];
    }

    /// Returns the observed model, if it is still alive.
    pub fn model(&self) -> Option<Arc<dyn ItemModel>> {
        self.model.upgrade()
    }

    /// Returns `true` if this selection model observes `model`.
    pub fn observes(&self, model: &Arc<dyn ItemModel>) -> bool {
        std::ptr::addr_eq(self.model.as_ptr(), Arc::as_ptr(model))
    }

    /// Gets the current selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.state.read().mode
    }

    /// Sets the selection mode.
    ///
    /// Switching to [`SelectionMode::NoSelection`] clears the selection.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        self.state.write().mode = mode;
        if mode == SelectionMode::NoSelection {
            self.clear_selection();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns `true` if anything is selected.
    pub fn has_selection(&self) -> bool {
        !self.state.read().cells.is_empty()
    }

    /// Returns `true` if the item at `index` is selected.
    pub fn is_selected(&self, index: &ModelIndex) -> bool {
        index.is_valid()
            && self
                .state
                .read()
                .lookup
                .contains(&(index.internal_id(), index.column()))
    }

    /// Returns the selected items, resolved against the model's current shape.
    pub fn selected_indexes(&self) -> Vec<ModelIndex> {
        let cells = self.state.read().cells.clone();
        match self.model.upgrade() {
            Some(model) => resolve_cells(model.as_ref(), &cells),
            None => Vec::new(),
        }
    }

    /// Returns the current selection as sorted, merged ranges.
    pub fn selection(&self) -> ItemSelection {
        to_selection(&self.selected_indexes())
    }

    // =========================================================================
    // Changing the selection
    // =========================================================================

    /// Performs a selection operation on a single index.
    pub fn select(&self, index: &ModelIndex, flags: SelectionFlags) {
        let selection = if index.is_valid() {
            ItemSelection::from_corners(index.clone(), index.clone())
        } else {
            ItemSelection::new()
        };
        self.select_selection(&selection, flags);
    }

    /// Performs a selection operation on a rectangular range.
    pub fn select_range(&self, range: SelectionRange, flags: SelectionFlags) {
        self.select_selection(&ItemSelection::from(vec![range]), flags);
    }

    /// Performs a selection operation on every item of `selection`.
    ///
    /// The behavior depends on the flags:
    /// - `clear`: Deselects all items first
    /// - `select`: Adds the items to the selection
    /// - `deselect`: Removes the items from the selection
    /// - `toggle`: Toggles the selection state of each item
    pub fn select_selection(&self, selection: &ItemSelection, flags: SelectionFlags) {
        let Some(model) = self.model.upgrade() else {
            return;
        };
        let targets: Vec<Cell> = selection
            .indexes(model.as_ref())
            .iter()
            .map(|index| (index.internal_id(), index.column()))
            .collect();

        let mut added = Vec::new();
        let mut removed = Vec::new();
        {
            let mut state = self.state.write();
            if state.mode == SelectionMode::NoSelection {
                return;
            }

            if flags.clear {
                for cell in state.clear() {
                    if !(flags.select && targets.contains(&cell)) {
                        removed.push(cell);
                    } else {
                        state.insert(cell);
                    }
                }
            }

            for &cell in &targets {
                if flags.toggle {
                    if state.remove(cell) {
                        removed.push(cell);
                    } else if state.insert(cell) {
                        added.push(cell);
                    }
                } else if flags.select {
                    if state.insert(cell) {
                        added.push(cell);
                    }
                } else if flags.deselect && state.remove(cell) {
                    removed.push(cell);
                }
            }

            // Keep only the most recently selected item.
            if state.mode == SelectionMode::SingleSelection && state.cells.len() > 1 {
                let keep = state.cells.len() - 1;
                let dropped: Vec<Cell> = state.cells.drain(..keep).collect();
                for cell in dropped {
                    state.lookup.remove(&cell);
                    if let Some(pos) = added.iter().position(|c| *c == cell) {
                        added.remove(pos);
                    } else {
                        removed.push(cell);
                    }
                }
            }
        }

        self.emit_changed(model.as_ref(), &added, &removed);
    }

    /// Deselects everything.
    pub fn clear_selection(&self) {
        let Some(model) = self.model.upgrade() else {
            self.state.write().clear();
            return;
        };
        let removed = self.state.write().clear();
        self.emit_changed(model.as_ref(), &[], &removed);
    }

    /// Deselects everything without emitting `selection_changed`.
    pub fn reset(&self) {
        let dropped = self.state.write().clear();
        if !dropped.is_empty() {
            tracing::debug!(target: targets::SELECTION, count = dropped.len(), "selection reset");
        }
    }

    /// Drops cells whose nodes left the model.
    fn prune_removed(&self) {
        let Some(model) = self.model.upgrade() else {
            return;
        };
        let mut state = self.state.write();
        let before = state.cells.len();
        state
            .cells
            .retain(|(id, _)| model.index_for_internal_id(*id).is_valid());
        if state.cells.len() != before {
            let kept: HashSet<Cell> = state.cells.iter().copied().collect();
            state.lookup = kept;
            tracing::trace!(
                target: targets::SELECTION,
                dropped = before - state.cells.len(),
                "removed items left the selection"
            );
        }
    }

    fn emit_changed(&self, model: &dyn ItemModel, added: &[Cell], removed: &[Cell]) {
        if added.is_empty() && removed.is_empty() {
            return;
        }
        let selected = to_selection(&resolve_cells(model, added));
        let deselected = to_selection(&resolve_cells(model, removed));
        tracing::debug!(
            target: targets::SELECTION,
            selected = selected.len(),
            deselected = deselected.len(),
            "selection changed"
        );
        self.selection_changed.emit((selected, deselected));
    }
}

impl Drop for ItemSelectionModel {
    fn drop(&mut self) {
        let Some(model) = self.model.upgrade() else {
            return;
        };
        let signals = model.signals();
        for (kind, id) in self.connections.get_mut().drain(..) {
            match kind {
                ModelConnection::RowsRemoved => signals.rows_removed.disconnect(id),
                ModelConnection::ModelReset => signals.model_reset.disconnect(id),
            };
        }
    }
}

/// Resolves stored cells into current indices, skipping removed nodes.
fn resolve_cells(model: &dyn ItemModel, cells: &[Cell]) -> Vec<ModelIndex> {
    cells
        .iter()
        .filter_map(|&(id, column)| {
            let index = model.index_for_internal_id(id);
            if !index.is_valid() {
                return None;
            }
            let cell = if column == 0 {
                index
            } else {
                model.index(index.row(), column, &index.parent())
            };
            cell.is_valid().then_some(cell)
        })
        .collect()
}

fn to_selection(indexes: &[ModelIndex]) -> ItemSelection {
    let cells: ItemSelection = indexes
        .iter()
        .cloned()
        .map(SelectionRange::from_index)
        .collect();
    k_normalize_selection(&cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeModel;

    type Deltas = Arc<Mutex<Vec<(ItemSelection, ItemSelection)>>>;

    fn setup() -> (Arc<TreeModel<String>>, Arc<ItemSelectionModel>, Deltas) {
        let model = Arc::new(TreeModel::<String>::new());
        for name in ["a", "b", "c", "d"] {
            model.add_root(name.to_string());
        }
        let selection = ItemSelectionModel::new(model.clone());
        let deltas: Deltas = Arc::new(Mutex::new(Vec::new()));
        let d = deltas.clone();
        selection.selection_changed.connect(move |args| d.lock().push(args.clone()));
        (model, selection, deltas)
    }

    fn top(model: &TreeModel<String>, row: usize) -> ModelIndex {
        model.index(row, 0, &ModelIndex::invalid())
    }

    #[test]
    fn test_select_and_deselect() {
        let (model, selection, deltas) = setup();
        let a = top(&model, 0);

        selection.select(&a, SelectionFlags::SELECT);
        assert!(selection.is_selected(&a));
        assert!(selection.has_selection());

        // Re-selecting changes nothing.
        selection.select(&a, SelectionFlags::SELECT);
        assert_eq!(deltas.lock().len(), 1);

        selection.select(&a, SelectionFlags::DESELECT);
        assert!(!selection.has_selection());

        let deltas = deltas.lock();
        assert_eq!(deltas.len(), 2);
        assert!(deltas[0].0.contains(&a));
        assert!(deltas[1].1.contains(&a));
    }

    #[test]
    fn test_selection_is_normalized() {
        let (model, selection, _) = setup();
        for row in [2, 0, 1] {
            selection.select(&top(&model, row), SelectionFlags::SELECT);
        }
        let current = selection.selection();
        assert_eq!(current.len(), 1);
        assert_eq!((current.ranges()[0].top(), current.ranges()[0].bottom()), (0, 2));
    }

    #[test]
    fn test_select_range_with_reversed_corners() {
        let (model, selection, deltas) = setup();
        let range = SelectionRange::new(top(&model, 2), top(&model, 0));
        selection.select_range(range, SelectionFlags::SELECT);

        for row in 0..3 {
            assert!(selection.is_selected(&top(&model, row)));
        }
        assert!(!selection.is_selected(&top(&model, 3)));
        assert_eq!(selection.selected_indexes().len(), 3);
        assert_eq!(deltas.lock().len(), 1);
    }

    #[test]
    fn test_clear_and_select() {
        let (model, selection, deltas) = setup();
        selection.select_range(
            SelectionRange::new(top(&model, 0), top(&model, 1)),
            SelectionFlags::SELECT,
        );
        selection.select(&top(&model, 1), SelectionFlags::CLEAR_AND_SELECT);

        assert_eq!(selection.selected_indexes(), vec![top(&model, 1)]);
        let deltas = deltas.lock();
        let (selected, deselected) = &deltas[1];
        assert!(selected.is_empty());
        assert!(deselected.contains(&top(&model, 0)));
        assert!(!deselected.contains(&top(&model, 1)));
    }

    #[test]
    fn test_toggle_and_single_mode() {
        let (model, selection, _) = setup();
        let a = top(&model, 0);
        selection.select(&a, SelectionFlags::TOGGLE);
        assert!(selection.is_selected(&a));
        selection.select(&a, SelectionFlags::TOGGLE);
        assert!(!selection.is_selected(&a));

        selection.set_selection_mode(SelectionMode::SingleSelection);
        selection.select(&top(&model, 0), SelectionFlags::SELECT);
        selection.select(&top(&model, 2), SelectionFlags::SELECT);
        assert_eq!(selection.selected_indexes(), vec![top(&model, 2)]);

        selection.set_selection_mode(SelectionMode::NoSelection);
        assert!(!selection.has_selection());
        selection.select(&top(&model, 1), SelectionFlags::SELECT);
        assert!(!selection.has_selection());
    }

    #[test]
    fn test_selection_follows_nodes() {
        let (model, selection, deltas) = setup();
        let c = top(&model, 2);
        selection.select(&c, SelectionFlags::SELECT);

        // Removing "a" shifts "c" up; removing "c" drops it silently.
        model.remove(1);
        assert_eq!(selection.selected_indexes(), vec![top(&model, 1)]);
        model.remove(c.internal_id());
        assert!(!selection.has_selection());
        assert_eq!(deltas.lock().len(), 1);
    }

    #[test]
    fn test_model_reset_clears_silently() {
        let (model, selection, deltas) = setup();
        selection.select(&top(&model, 0), SelectionFlags::SELECT);
        model.clear();
        assert!(!selection.has_selection());
        assert_eq!(deltas.lock().len(), 1);
    }

    #[test]
    fn test_observes() {
        let (model, selection, _) = setup();
        let as_dyn: Arc<dyn ItemModel> = model.clone();
        assert!(selection.observes(&as_dyn));
        let other: Arc<dyn ItemModel> = Arc::new(TreeModel::<String>::new());
        assert!(!selection.observes(&other));
    }
}

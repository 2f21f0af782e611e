//! A proxy model that shows the selected parts of another model.
//!
//! [`SelectionProxyModel`] observes a source model and an
//! [`ItemSelectionModel`]. It projects the selected nodes (and, depending on
//! the [`FilterBehavior`], their subtrees or children) into a derived model
//! and keeps that projection in sync as the selection and the source change.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_itemviews::model::{
//!     FilterBehavior, ItemModel, ItemSelectionModel, ModelIndex, SelectionFlags,
//!     SelectionProxyModel, TreeModel,
//! };
//!
//! let model = Arc::new(TreeModel::<String>::new());
//! let docs = model.add_root("Documents".to_string());
//! model.add_child(docs, "notes.txt".to_string());
//! model.add_root("Music".to_string());
//!
//! let selection = ItemSelectionModel::new(model.clone());
//! let proxy = SelectionProxyModel::builder(selection.clone())
//!     .filter_behavior(FilterBehavior::SubTrees)
//!     .build()
//!     .unwrap();
//!
//! selection.select(&model.node_index(docs), SelectionFlags::SELECT);
//!
//! let root = ModelIndex::invalid();
//! assert_eq!(proxy.row_count(&root), 1);
//! let docs_row = proxy.index(0, 0, &root);
//! assert_eq!(proxy.row_count(&docs_row), 1);
//! ```
//!
//! # Signals
//!
//! Besides the usual [`ModelSignals`], the proxy reports changes to the set
//! of selected roots:
//!
//! - `root_index_added` / `root_index_about_to_be_removed`: per source node
//! - `root_selection_added` / `root_selection_about_to_be_removed`: per batch

mod behavior;
mod builder;
mod mapping;
mod selection_sync;
mod source_sync;
mod state;

pub use behavior::FilterBehavior;
pub use builder::{SelectionProxyConfig, SelectionProxyModelBuilder};
pub use state::ParentSlot;

use std::sync::{Arc, Weak};

use horizon_itemviews_core::logging::targets;
use horizon_itemviews_core::{ConnectionId, PerfSpan, Signal};
use parking_lot::{Mutex, RwLock};

use crate::error::{Error, Result};
use crate::model::index::ModelIndex;
use crate::model::item_selection::{ItemSelection, SelectionRange};
use crate::model::role::{ItemData, ItemRole};
use crate::model::selection::ItemSelectionModel;
use crate::model::selection_normalizer::k_normalize_selection;
use crate::model::traits::{ItemFlags, ItemModel, ModelSignals, Orientation};

use mapping::column_zero;
use state::ProxyState;

/// Translates indices of the selection model's model into source indices.
pub type SelectionMapper = Arc<dyn Fn(&ModelIndex) -> ModelIndex + Send + Sync>;

/// Source signals the proxy is connected to.
#[derive(Debug, Clone, Copy)]
enum SourceConnection {
    RowsAboutToBeInserted,
    RowsInserted,
    RowsAboutToBeRemoved,
    RowsRemoved,
    RowsAboutToBeMoved,
    RowsMoved,
    DataChanged,
    HeaderDataChanged,
    LayoutAboutToChange,
    LayoutChanged,
    ModelAboutToReset,
    ModelReset,
    Destroyed,
}

/// A model showing the selected parts of a source model.
///
/// The projection is driven by the selection of an [`ItemSelectionModel`].
/// With the default [`FilterBehavior::SubTrees`], every selected node that
/// has no selected ancestor becomes a top-level row, with its full subtree
/// below it.
///
/// The source must identify its nodes stably through
/// [`ItemModel::index_for_internal_id`].
///
/// The proxy holds the source weakly and the selection model strongly. All
/// methods take `&self`; signals are emitted with the internal lock released.
pub struct SelectionProxyModel {
    source: RwLock<Option<Weak<dyn ItemModel>>>,
    selection: Arc<ItemSelectionModel>,
    mapper: Option<SelectionMapper>,
    state: Mutex<ProxyState>,
    source_connections: Mutex<Vec<(SourceConnection, ConnectionId)>>,
    selection_connection: Mutex<Option<ConnectionId>>,
    signals: ModelSignals,

    /// Emitted after a source node became a root of the projection.
    pub root_index_added: Signal<ModelIndex>,
    /// Emitted before a source node stops being a root of the projection.
    pub root_index_about_to_be_removed: Signal<ModelIndex>,
    /// Emitted after a batch of roots was added, with the new roots.
    pub root_selection_added: Signal<ItemSelection>,
    /// Emitted before a batch of roots is removed, with the leaving roots.
    pub root_selection_about_to_be_removed: Signal<ItemSelection>,
}

static_assertions::assert_impl_all!(SelectionProxyModel: Send, Sync);

impl SelectionProxyModel {
    /// Creates a proxy over `source`, driven by `selection`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectionModelMismatch`] if `selection` observes a
    /// different model than `source`.
    pub fn new(
        source: Arc<dyn ItemModel>,
        selection: Arc<ItemSelectionModel>,
    ) -> Result<Arc<Self>> {
        Self::builder(selection).source(source).build()
    }

    /// Starts configuring a proxy driven by `selection`.
    pub fn builder(selection: Arc<ItemSelectionModel>) -> SelectionProxyModelBuilder {
        SelectionProxyModelBuilder::new(selection)
    }

    pub(crate) fn create(
        source: Arc<dyn ItemModel>,
        selection: Arc<ItemSelectionModel>,
        behavior: FilterBehavior,
        mapper: Option<SelectionMapper>,
    ) -> Result<Arc<Self>> {
        if mapper.is_none() && !selection.observes(&source) {
            return Err(Error::SelectionModelMismatch);
        }
        let proxy = Arc::new(Self {
            source: RwLock::new(Some(Arc::downgrade(&source))),
            selection,
            mapper,
            state: Mutex::new(ProxyState::new(behavior)),
            source_connections: Mutex::new(Vec::new()),
            selection_connection: Mutex::new(None),
            signals: ModelSignals::new(),
            root_index_added: Signal::new(),
            root_index_about_to_be_removed: Signal::new(),
            root_selection_added: Signal::new(),
            root_selection_about_to_be_removed: Signal::new(),
        });
        proxy.connect_source(&source);
        proxy.connect_selection();

        let current = proxy.current_source_selection();
        let roots = proxy.roots_of(source.as_ref(), &current, behavior);
        proxy.state.lock().populate(source.as_ref(), roots);
        tracing::debug!(target: targets::PROXY, %behavior, "selection proxy created");
        Ok(proxy)
    }

    // =========================================================================
    // Wiring
    // =========================================================================

    fn connect_source(self: &Arc<Self>, source: &Arc<dyn ItemModel>) {
        let signals = source.signals();
        let mut connections = Vec::with_capacity(13);

        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsAboutToBeInserted,
            signals
                .rows_about_to_be_inserted
                .connect(move |(parent, first, last)| {
                    if let Some(this) = weak.upgrade() {
                        this.on_rows_about_to_be_inserted(parent, *first, *last);
                    }
                }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsInserted,
            signals.rows_inserted.connect(move |(parent, first, last)| {
                if let Some(this) = weak.upgrade() {
                    this.on_rows_inserted(parent, *first, *last);
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsAboutToBeRemoved,
            signals
                .rows_about_to_be_removed
                .connect(move |(parent, first, last)| {
                    if let Some(this) = weak.upgrade() {
                        this.on_rows_about_to_be_removed(parent, *first, *last);
                    }
                }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsRemoved,
            signals.rows_removed.connect(move |(parent, first, last)| {
                if let Some(this) = weak.upgrade() {
                    this.on_rows_removed(parent, *first, *last);
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsAboutToBeMoved,
            signals.rows_about_to_be_moved.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_rows_about_to_be_moved();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::RowsMoved,
            signals.rows_moved.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_rows_moved();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::DataChanged,
            signals
                .data_changed
                .connect(move |(top_left, bottom_right, roles)| {
                    if let Some(this) = weak.upgrade() {
                        this.on_data_changed(top_left, bottom_right, roles);
                    }
                }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::HeaderDataChanged,
            signals.header_data_changed.connect(move |args| {
                if let Some(this) = weak.upgrade() {
                    this.signals.header_data_changed.emit(*args);
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::LayoutAboutToChange,
            signals.layout_about_to_change.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_layout_about_to_change();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::LayoutChanged,
            signals.layout_changed.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_layout_changed();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::ModelAboutToReset,
            signals.model_about_to_reset.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_model_about_to_reset();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::ModelReset,
            signals.model_reset.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_model_reset();
                }
            }),
        ));
        let weak = Arc::downgrade(self);
        connections.push((
            SourceConnection::Destroyed,
            signals.destroyed.connect(move |_| {
                if let Some(this) = weak.upgrade() {
                    this.on_source_destroyed();
                }
            }),
        ));

        *self.source_connections.lock() = connections;
    }

    fn disconnect_source(&self) {
        let connections = std::mem::take(&mut *self.source_connections.lock());
        let Some(source) = self.source() else {
            return;
        };
        let signals = source.signals();
        for (kind, id) in connections {
            match kind {
                SourceConnection::RowsAboutToBeInserted => {
                    signals.rows_about_to_be_inserted.disconnect(id)
                }
                SourceConnection::RowsInserted => signals.rows_inserted.disconnect(id),
                SourceConnection::RowsAboutToBeRemoved => {
                    signals.rows_about_to_be_removed.disconnect(id)
                }
                SourceConnection::RowsRemoved => signals.rows_removed.disconnect(id),
                SourceConnection::RowsAboutToBeMoved => signals.rows_about_to_be_moved.disconnect(id),
                SourceConnection::RowsMoved => signals.rows_moved.disconnect(id),
                SourceConnection::DataChanged => signals.data_changed.disconnect(id),
                SourceConnection::HeaderDataChanged => signals.header_data_changed.disconnect(id),
                SourceConnection::LayoutAboutToChange => {
                    signals.layout_about_to_change.disconnect(id)
                }
                SourceConnection::LayoutChanged => signals.layout_changed.disconnect(id),
                SourceConnection::ModelAboutToReset => signals.model_about_to_reset.disconnect(id),
                SourceConnection::ModelReset => signals.model_reset.disconnect(id),
                SourceConnection::Destroyed => signals.destroyed.disconnect(id),
            };
        }
    }

    fn connect_selection(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let id = self
            .selection
            .selection_changed
            .connect(move |(selected, deselected)| {
                if let Some(this) = weak.upgrade() {
                    this.on_selection_changed(selected, deselected);
                }
            });
        *self.selection_connection.lock() = Some(id);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the source model, if it is still alive.
    pub fn source_model(&self) -> Option<Arc<dyn ItemModel>> {
        self.source.read().as_ref().and_then(Weak::upgrade)
    }

    fn source(&self) -> Option<Arc<dyn ItemModel>> {
        self.source_model()
    }

    /// Returns the selection model driving the projection.
    pub fn selection_model(&self) -> &Arc<ItemSelectionModel> {
        &self.selection
    }

    /// Returns the active filter behavior.
    pub fn filter_behavior(&self) -> FilterBehavior {
        self.state.lock().behavior
    }

    /// Returns the source nodes the projection is built from, in source order.
    pub fn source_root_indexes(&self) -> Vec<ModelIndex> {
        match self.source() {
            Some(source) => self.state.lock().resolved_roots(source.as_ref()),
            None => Vec::new(),
        }
    }

    /// Returns the root nodes as a selection of single-cell ranges.
    pub fn source_root_selection(&self) -> ItemSelection {
        self.source_root_indexes()
            .into_iter()
            .filter(ModelIndex::is_valid)
            .map(SelectionRange::from_index)
            .collect()
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Switches the filter behavior.
    ///
    /// Resets the projection and rebuilds it from the current selection. Does
    /// nothing if `behavior` is already active.
    pub fn set_filter_behavior(&self, behavior: FilterBehavior) {
        let previous = {
            let state = self.state.lock();
            if state.behavior == behavior {
                return;
            }
            state.behavior
        };
        let _perf = PerfSpan::new("selection_proxy_filter_change");
        tracing::debug!(target: targets::PROXY, from = %previous, to = %behavior, "filter behavior changed");

        self.signals.model_about_to_reset.emit(());
        if let Some(source) = self.source() {
            let current = self.current_source_selection();
            let roots = self.roots_of(source.as_ref(), &current, behavior);
            let mut state = self.state.lock();
            state.clear();
            state.behavior = behavior;
            state.populate(source.as_ref(), roots);
        } else {
            let mut state = self.state.lock();
            state.clear();
            state.behavior = behavior;
        }
        self.signals.model_reset.emit(());

        let roots = self.source_root_selection();
        if !roots.is_empty() {
            self.root_selection_added.emit(roots);
        }
    }

    /// Replaces the source model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SelectionModelMismatch`] if the selection model does
    /// not observe `source` and no selection mapper is configured.
    pub fn set_source_model(self: &Arc<Self>, source: Arc<dyn ItemModel>) -> Result<()> {
        if self.mapper.is_none() && !self.selection.observes(&source) {
            return Err(Error::SelectionModelMismatch);
        }
        self.signals.model_about_to_reset.emit(());
        self.disconnect_source();
        *self.source.write() = Some(Arc::downgrade(&source));
        self.connect_source(&source);

        let current = self.current_source_selection();
        {
            let mut state = self.state.lock();
            let behavior = state.behavior;
            state.clear();
            let roots = self.roots_of(source.as_ref(), &current, behavior);
            state.populate(source.as_ref(), roots);
        }
        tracing::debug!(target: targets::PROXY, "source model replaced");
        self.signals.model_reset.emit(());
        Ok(())
    }

    // =========================================================================
    // Mapping
    // =========================================================================

    /// Maps a source index into the projection.
    ///
    /// Returns an invalid index if the node is not shown.
    pub fn map_from_source(&self, source_index: &ModelIndex) -> ModelIndex {
        let Some(source) = self.source() else {
            return ModelIndex::invalid();
        };
        self.state.lock().map_from_source(source.as_ref(), source_index)
    }

    /// Maps a projected index to the source.
    pub fn map_to_source(&self, proxy_index: &ModelIndex) -> ModelIndex {
        let Some(source) = self.source() else {
            return ModelIndex::invalid();
        };
        self.state.lock().map_to_source(source.as_ref(), proxy_index)
    }

    /// Maps a selection of projected items to the source.
    pub fn map_selection_to_source(&self, selection: &ItemSelection) -> ItemSelection {
        let Some(source) = self.source() else {
            return ItemSelection::new();
        };
        let mut state = self.state.lock();
        let mut mapped = ItemSelection::new();
        for range in selection {
            let parent = range.parent();
            for row in range.top()..=range.bottom() {
                let left = state.index(source.as_ref(), row, range.left(), &parent);
                let right = state.index(source.as_ref(), row, range.right(), &parent);
                let left = state.map_to_source(source.as_ref(), &left);
                let right = state.map_to_source(source.as_ref(), &right);
                if left.is_valid() && right.is_valid() && left.parent() == right.parent() {
                    mapped.push(SelectionRange::new(left, right));
                }
            }
        }
        k_normalize_selection(&mapped)
    }

    /// Maps a selection of source items into the projection.
    ///
    /// Items that are not shown are dropped.
    pub fn map_selection_from_source(&self, selection: &ItemSelection) -> ItemSelection {
        let Some(source) = self.source() else {
            return ItemSelection::new();
        };
        let mut state = self.state.lock();
        let mut mapped = ItemSelection::new();
        for range in selection {
            let parent = range.parent();
            for row in range.top()..=range.bottom() {
                let left = source.index(row, range.left(), &parent);
                let right = source.index(row, range.right(), &parent);
                let left = state.map_from_source(source.as_ref(), &left);
                let right = state.map_from_source(source.as_ref(), &right);
                if left.is_valid() && right.is_valid() && left.parent() == right.parent() {
                    mapped.push(SelectionRange::new(left, right));
                }
            }
        }
        k_normalize_selection(&mapped)
    }

    /// The current selection, translated into source indices.
    fn current_source_selection(&self) -> ItemSelection {
        self.to_source_selection(&self.selection.selection())
    }

    /// Translates a selection of the selection model's model into the source.
    fn to_source_selection(&self, selection: &ItemSelection) -> ItemSelection {
        let Some(mapper) = &self.mapper else {
            return selection.clone();
        };
        let Some(model) = self.selection.model() else {
            return ItemSelection::new();
        };
        let mut mapped = ItemSelection::new();
        for range in selection {
            let parent = range.parent();
            for row in range.top()..=range.bottom() {
                let left = mapper(&model.index(row, range.left(), &parent));
                let right = mapper(&model.index(row, range.right(), &parent));
                if left.is_valid() && right.is_valid() && left.parent() == right.parent() {
                    mapped.push(SelectionRange::new(left, right));
                }
            }
        }
        mapped
    }
}

impl ItemModel for SelectionProxyModel {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        match self.source() {
            Some(source) => self.state.lock().row_count(source.as_ref(), parent),
            None => 0,
        }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        match self.source() {
            Some(source) => self.state.lock().column_count(source.as_ref(), parent),
            None => 0,
        }
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        let Some(source) = self.source() else {
            return ItemData::None;
        };
        let source_index = self.state.lock().map_to_source(source.as_ref(), index);
        source.data(&source_index, role)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        match self.source() {
            Some(source) => self.state.lock().index(source.as_ref(), row, column, parent),
            None => ModelIndex::invalid(),
        }
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        match self.source() {
            Some(source) => self.state.lock().parent(source.as_ref(), index),
            None => ModelIndex::invalid(),
        }
    }

    fn signals(&self) -> &ModelSignals {
        &self.signals
    }

    fn set_data(&self, index: &ModelIndex, value: ItemData, role: ItemRole) -> bool {
        let Some(source) = self.source() else {
            return false;
        };
        let source_index = self.state.lock().map_to_source(source.as_ref(), index);
        source_index.is_valid() && source.set_data(&source_index, value, role)
    }

    fn flags(&self, index: &ModelIndex) -> ItemFlags {
        let Some(source) = self.source() else {
            return ItemFlags::disabled();
        };
        let (source_index, leaf) = {
            let state = self.state.lock();
            (
                state.map_to_source(source.as_ref(), index),
                !state.behavior.is_hierarchical(),
            )
        };
        let flags = source.flags(&source_index);
        if leaf { flags.with_never_has_children(true) } else { flags }
    }

    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        match self.source() {
            Some(source) => source.header_data(section, orientation, role),
            None => ItemData::None,
        }
    }
}

impl Drop for SelectionProxyModel {
    fn drop(&mut self) {
        if let Some(id) = self.selection_connection.get_mut().take() {
            self.selection.selection_changed.disconnect(id);
        }
        self.disconnect_source();
    }
}

/// Column-0 nodes covered by the column-0 ranges of `selection`.
fn column_zero_nodes(source: &dyn ItemModel, selection: &ItemSelection) -> Vec<ModelIndex> {
    let mut nodes = Vec::new();
    for range in selection.iter().filter(|range| range.left() == 0) {
        let parent = range.parent();
        for row in range.top()..=range.bottom() {
            let node = source.index(row, 0, &parent);
            if node.is_valid() {
                nodes.push(column_zero(source, &node));
            }
        }
    }
    nodes
}

/// Wraps nodes into single-cell ranges.
fn to_selection(nodes: &[ModelIndex]) -> ItemSelection {
    nodes
        .iter()
        .cloned()
        .map(SelectionRange::from_index)
        .collect()
}

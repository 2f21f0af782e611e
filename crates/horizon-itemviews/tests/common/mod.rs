//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use horizon_itemviews::model::{
    ItemModel, ItemSelectionModel, ModelIndex, ModelTreeDebug, NodeId, SelectionFlags,
    SelectionProxyModel, TreeModel,
};
use parking_lot::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A tree model plus the node IDs of its items by label.
pub struct Tree {
    pub model: Arc<TreeModel<String>>,
    pub ids: HashMap<String, NodeId>,
}

impl Tree {
    /// Builds a tree from `(label, parent label)` pairs, in insertion order.
    pub fn build(items: &[(&str, Option<&str>)]) -> Self {
        let model = Arc::new(TreeModel::<String>::new());
        let mut ids = HashMap::new();
        for &(label, parent) in items {
            let id = match parent {
                None => model.add_root(label.to_string()),
                Some(parent) => model
                    .add_child(ids[parent], label.to_string())
                    .expect("parent exists"),
            };
            ids.insert(label.to_string(), id);
        }
        Self { model, ids }
    }

    /// ```text
    /// A
    /// ├── B
    /// │   └── X
    /// └── C
    /// D
    /// ```
    pub fn sample() -> Self {
        Self::build(&[
            ("A", None),
            ("B", Some("A")),
            ("X", Some("B")),
            ("C", Some("A")),
            ("D", None),
        ])
    }

    pub fn id(&self, label: &str) -> NodeId {
        self.ids[label]
    }

    pub fn index(&self, label: &str) -> ModelIndex {
        self.model.node_index(self.id(label))
    }

    pub fn selection(&self) -> Arc<ItemSelectionModel> {
        ItemSelectionModel::new(self.model.clone())
    }

    pub fn select(&self, selection: &ItemSelectionModel, label: &str) {
        selection.select(&self.index(label), SelectionFlags::SELECT);
    }

    pub fn deselect(&self, selection: &ItemSelectionModel, label: &str) {
        selection.select(&self.index(label), SelectionFlags::DESELECT);
    }
}

/// Renders the rows of `model` as an indented tree.
pub fn outline(model: &dyn ItemModel) -> String {
    ModelTreeDebug::new().format(model)
}

fn parent_label(parent: &ModelIndex) -> String {
    if parent.is_valid() {
        parent.row().to_string()
    } else {
        "top".to_string()
    }
}

/// Records the notifications a proxy emits, in order.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn attach(proxy: &SelectionProxyModel) -> Self {
        let log = Self::default();
        let signals = proxy.signals();

        let rows = [
            (&signals.rows_about_to_be_inserted, "about_to_insert"),
            (&signals.rows_inserted, "inserted"),
            (&signals.rows_about_to_be_removed, "about_to_remove"),
            (&signals.rows_removed, "removed"),
        ];
        for (signal, name) in rows {
            let events = log.events.clone();
            signal.connect(move |(parent, first, last)| {
                events
                    .lock()
                    .push(format!("{name}({},{first},{last})", parent_label(parent)));
            });
        }

        let plain = [
            (&signals.model_about_to_reset, "about_to_reset"),
            (&signals.model_reset, "reset"),
            (&signals.layout_about_to_change, "about_to_layout"),
            (&signals.layout_changed, "layout"),
        ];
        for (signal, name) in plain {
            let events = log.events.clone();
            signal.connect(move |_| events.lock().push(name.to_string()));
        }

        let events = log.events.clone();
        signals.data_changed.connect(move |(top_left, bottom_right, _)| {
            events.lock().push(format!(
                "data({},{},{})",
                parent_label(&top_left.parent()),
                top_left.row(),
                bottom_right.row()
            ));
        });

        let events = log.events.clone();
        proxy.root_index_added.connect(move |index| {
            events.lock().push(format!("root_added({})", index.internal_id()));
        });
        let events = log.events.clone();
        proxy.root_index_about_to_be_removed.connect(move |index| {
            events
                .lock()
                .push(format!("root_removing({})", index.internal_id()));
        });
        log
    }

    /// Returns the recorded events and starts over.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.events.lock())
    }
}

/// Checks that every projected item maps to a source item and back.
pub fn assert_round_trips(proxy: &SelectionProxyModel) {
    fn walk(proxy: &SelectionProxyModel, parent: &ModelIndex) {
        for row in 0..proxy.row_count(parent) {
            let index = proxy.index(row, 0, parent);
            assert!(index.is_valid(), "row {row} of {parent:?} is invalid");
            assert_eq!(proxy.parent(&index), *parent);
            let source = proxy.map_to_source(&index);
            assert!(source.is_valid(), "{index:?} has no source");
            assert_eq!(proxy.map_from_source(&source), index);
            walk(proxy, &index);
        }
    }
    walk(proxy, &ModelIndex::invalid());
}

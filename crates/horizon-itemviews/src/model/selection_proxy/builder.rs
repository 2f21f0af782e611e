//! Configuration and construction of selection proxies.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::behavior::FilterBehavior;
use super::{SelectionMapper, SelectionProxyModel};
use crate::error::{Error, Result};
use crate::model::index::ModelIndex;
use crate::model::selection::ItemSelectionModel;
use crate::model::traits::ItemModel;

/// Serializable settings of a [`SelectionProxyModel`].
///
/// ```
/// use horizon_itemviews::model::{FilterBehavior, SelectionProxyConfig};
///
/// let config: SelectionProxyConfig =
///     serde_json::from_str(r#"{ "filter_behavior": "exact-selection" }"#).unwrap();
/// assert_eq!(config.filter_behavior, FilterBehavior::ExactSelection);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionProxyConfig {
    /// Which parts of the selection are shown.
    pub filter_behavior: FilterBehavior,
}

impl SelectionProxyConfig {
    /// Creates a config with the given behavior.
    pub fn new(filter_behavior: FilterBehavior) -> Self {
        Self { filter_behavior }
    }
}

/// Builder for [`SelectionProxyModel`].
///
/// # Example
///
/// ```ignore
/// let proxy = SelectionProxyModel::builder(selection)
///     .source(model)
///     .filter_behavior(FilterBehavior::SubTreesWithoutRoots)
///     .build()?;
/// ```
pub struct SelectionProxyModelBuilder {
    selection: Arc<ItemSelectionModel>,
    source: Option<Arc<dyn ItemModel>>,
    config: SelectionProxyConfig,
    mapper: Option<SelectionMapper>,
}

impl SelectionProxyModelBuilder {
    /// Creates a builder for a proxy driven by `selection`.
    pub fn new(selection: Arc<ItemSelectionModel>) -> Self {
        Self {
            selection,
            source: None,
            config: SelectionProxyConfig::default(),
            mapper: None,
        }
    }

    /// Sets the source model.
    ///
    /// If not set, the model observed by the selection model is used.
    pub fn source(mut self, source: Arc<dyn ItemModel>) -> Self {
        self.source = Some(source);
        self
    }

    /// Sets the filter behavior.
    pub fn filter_behavior(mut self, behavior: FilterBehavior) -> Self {
        self.config.filter_behavior = behavior;
        self
    }

    /// Applies a whole config.
    pub fn config(mut self, config: SelectionProxyConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a function translating indices of the selection model's model
    /// into source indices.
    ///
    /// Needed when the selection model observes a different model than the
    /// source, for example another proxy stacked on top of it.
    pub fn selection_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&ModelIndex) -> ModelIndex + Send + Sync + 'static,
    {
        self.mapper = Some(Arc::new(mapper));
        self
    }

    /// Creates the proxy and builds its projection from the current selection.
    ///
    /// # Errors
    ///
    /// - [`Error::SourceDropped`] if no source was set and the selection
    ///   model's model is gone
    /// - [`Error::SelectionModelMismatch`] if the selection model observes a
    ///   different model than the source and no mapper is set
    pub fn build(self) -> Result<Arc<SelectionProxyModel>> {
        let source = match self.source {
            Some(source) => source,
            None => self.selection.model().ok_or(Error::SourceDropped)?,
        };
        SelectionProxyModel::create(
            source,
            self.selection,
            self.config.filter_behavior,
            self.mapper,
        )
    }
}

//! Horizon Itemviews - model/view building blocks inspired by Qt6.
//!
//! This crate provides hierarchical item models, a selection model tracking
//! which items are selected, and [`SelectionProxyModel`](model::SelectionProxyModel),
//! a proxy that shows only the selected parts of another model.
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
//! fn main() -> horizon_itemviews::Result<()> {
//!     let model = Arc::new(TreeModel::<String>::new());
//!     let fruit = model.add_root("Fruit".to_string());
//!     model.add_child(fruit, "Apple".to_string());
//!     model.add_child(fruit, "Pear".to_string());
//!
//!     let selection = ItemSelectionModel::new(model.clone());
//!     let proxy = SelectionProxyModel::builder(selection.clone())
//!         .filter_behavior(FilterBehavior::SubTreesWithoutRoots)
//!         .build()?;
//!
//!     selection.select(&model.node_index(fruit), SelectionFlags::SELECT);
//!     assert_eq!(proxy.row_count(&ModelIndex::invalid()), 2);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use horizon_itemviews_core::*;

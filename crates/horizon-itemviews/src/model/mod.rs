//! Model/View architecture for Horizon Itemviews.
//!
//! This module provides the foundational types for the Model/View pattern,
//! which separates data representation from display logic. This enables:
//!
//! - Multiple views of the same data
//! - Consistent data access patterns
//! - Efficient updates via change notifications
//! - Support for hierarchical (tree) data structures
//!
//! # Core Types
//!
//! - `ModelIndex`: Identifies an item's position in a model
//! - `ItemRole`: Specifies what type of data to access
//! - `ItemData`: Type-erased container for item data
//! - `ItemModel`: The trait that models implement
//! - `ModelSignals`: Signals for change notifications
//!
//! # Model Implementations
//!
//! - `TreeModel`: Hierarchical tree structure with parent-child relationships
//! - `SelectionProxyModel`: Shows the selected parts of another model
//!
//! # Selections
//!
//! - `ItemSelectionModel`: Tracks the selected items of a model
//! - `ItemSelection` / `SelectionRange`: Rectangular blocks of selected items
//! - `selection_normalizer`: Root filtering, sorting and merging of selections
//!
//! # Example
//!
//! ```
//! use horizon_itemviews::model::{ItemModel, ModelIndex, TreeModel};
//!
//! // Create a tree model with string items
//! let model = TreeModel::<String>::new();
//! let fruit = model.add_root("Fruit".to_string());
//! model.add_child(fruit, "Apple".to_string());
//!
//! // Query the model
//! let root = ModelIndex::invalid();
//! let first_item = model.index(0, 0, &root);
//!
//! if first_item.is_valid() {
//!     if let Some(text) = model.display_text(&first_item) {
//!         println!("First item: {}", text);
//!     }
//! }
//!
//! // Connect to change notifications
//! model.signals().data_changed.connect(|(top_left, bottom_right, _roles)| {
//!     println!("Data changed from {:?} to {:?}", top_left, bottom_right);
//! });
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │    Model    │────>│   Signals   │────>│ Proxy/View  │
//! │ (ItemModel) │     │             │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                       │
//!       │         ┌─────────────┐               │
//!       └────────>│ ModelIndex  │<──────────────┘
//!                 │  ItemRole   │
//!                 │  ItemData   │
//!                 └─────────────┘
//! ```
//!
//! Views and proxies query models using `ModelIndex` and `ItemRole` to get
//! `ItemData`. Models emit signals when data changes, which observers listen
//! to for updates.

mod bihash;
mod identity_allocator;
mod index;
mod item_selection;
mod role;
mod selection;
pub mod selection_normalizer;
mod selection_proxy;
mod traits;
mod tree_debug;
mod tree_model;

pub use bihash::{BiHash, BiMap};
pub use identity_allocator::{IdentityAllocator, ParentId};
pub use index::ModelIndex;
pub use item_selection::{ItemSelection, SelectionRange};
pub use role::{CheckState, ItemData, ItemRole};
pub use selection::{ItemSelectionModel, SelectionFlags, SelectionMode};
pub use selection_proxy::{
    FilterBehavior, ParentSlot, SelectionMapper, SelectionProxyConfig, SelectionProxyModel,
    SelectionProxyModelBuilder,
};
pub use traits::{ItemFlags, ItemModel, ModelSignals, Orientation};
pub use tree_debug::{ModelTreeDebug, TreeFormatOptions, TreeStyle};
pub use tree_model::{NodeId, TreeDataExtractor, TreeModel, TreeNodeData};

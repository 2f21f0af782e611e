//! Filter behaviors of the selection proxy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which parts of the selected subtrees a [`SelectionProxyModel`] shows.
///
/// | Behavior | Top level | Below the top level |
/// |---|---|---|
/// | `SubTrees` | selected roots | full subtrees |
/// | `SubTreeRoots` | selected roots | nothing |
/// | `SubTreesWithoutRoots` | children of the selected roots | full subtrees |
/// | `ExactSelection` | every selected item | nothing |
/// | `ChildrenOfExactSelection` | children of every selected item | nothing |
///
/// [`SelectionProxyModel`]: super::SelectionProxyModel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterBehavior {
    /// Each selected item with all its descendants.
    #[default]
    SubTrees,
    /// Only the selected items, without children.
    SubTreeRoots,
    /// The descendants of each selected item, without the item itself.
    SubTreesWithoutRoots,
    /// Exactly the selected items, flat, even when one is below another.
    ExactSelection,
    /// The direct children of every selected item, flat.
    ChildrenOfExactSelection,
}

impl FilterBehavior {
    /// All behaviors, in declaration order.
    pub const ALL: [FilterBehavior; 5] = [
        FilterBehavior::SubTrees,
        FilterBehavior::SubTreeRoots,
        FilterBehavior::SubTreesWithoutRoots,
        FilterBehavior::ExactSelection,
        FilterBehavior::ChildrenOfExactSelection,
    ];

    /// Projected items never have children.
    pub fn omit_children(self) -> bool {
        matches!(self, Self::SubTreeRoots | Self::ExactSelection)
    }

    /// Only the top level of the projection is populated.
    pub fn omit_descendants(self) -> bool {
        matches!(self, Self::ChildrenOfExactSelection)
    }

    /// The top level shows the children of the roots instead of the roots.
    pub fn start_with_child_trees(self) -> bool {
        matches!(
            self,
            Self::SubTreesWithoutRoots | Self::ChildrenOfExactSelection
        )
    }

    /// Every selected item is a root, even below another selected item.
    pub fn include_all_selected(self) -> bool {
        matches!(self, Self::ExactSelection | Self::ChildrenOfExactSelection)
    }

    /// Projected items below the top level mirror the source hierarchy.
    pub fn is_hierarchical(self) -> bool {
        !self.omit_children() && !self.omit_descendants()
    }

    /// The kebab-case name used by `Display`, `FromStr` and serde.
    pub fn name(self) -> &'static str {
        match self {
            Self::SubTrees => "sub-trees",
            Self::SubTreeRoots => "sub-tree-roots",
            Self::SubTreesWithoutRoots => "sub-trees-without-roots",
            Self::ExactSelection => "exact-selection",
            Self::ChildrenOfExactSelection => "children-of-exact-selection",
        }
    }
}

impl fmt::Display for FilterBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterBehavior {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|behavior| behavior.name() == s)
            .ok_or_else(|| Error::unknown_filter_behavior(s))
    }
}

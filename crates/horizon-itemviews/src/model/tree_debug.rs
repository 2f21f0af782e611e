//! Text rendering of item models for debugging.
//!
//! [`ModelTreeDebug`] walks any [`ItemModel`] and draws its rows as an
//! indented tree:
//!
//! ```text
//! Documents
//! ├── notes.txt
//! └── todo.txt
//! Music
//! ```
//!
//! # Example
//!
//! ```
//! use horizon_itemviews::model::{ModelTreeDebug, TreeModel};
//!
//! let model = TreeModel::<String>::new();
//! let docs = model.add_root("Documents".to_string());
//! model.add_child(docs, "notes.txt".to_string());
//!
//! let output = ModelTreeDebug::new().format(&model);
//! assert_eq!(output, "Documents\n└── notes.txt");
//! ```

use std::fmt::Write;

use super::index::ModelIndex;
use super::traits::ItemModel;

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Dashes only.
    Compact,
}

/// Configuration for model tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show each item's row and internal ID.
    pub show_ids: bool,
    /// Whether to show the display text of columns after the first.
    pub show_columns: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_columns: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            show_columns: true,
            ..Default::default()
        }
    }

    /// Options for minimal output: display text only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_columns: false,
            ..Default::default()
        }
    }
}

/// Debug utility for visualizing the rows of an item model.
#[derive(Debug, Clone, Default)]
pub struct ModelTreeDebug {
    options: TreeFormatOptions,
}

impl ModelTreeDebug {
    /// Create a new visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Formats every row of `model`, one line per item, without a trailing newline.
    pub fn format(&self, model: &dyn ItemModel) -> String {
        self.format_children(model, &ModelIndex::invalid())
    }

    /// Formats the item at `root` and everything below it.
    pub fn format_subtree(&self, model: &dyn ItemModel, root: &ModelIndex) -> String {
        if !root.is_valid() {
            return self.format(model);
        }
        let mut lines = Vec::new();
        self.format_item(model, root, &mut Vec::new(), &mut lines);
        lines.join("\n")
    }

    fn format_children(&self, model: &dyn ItemModel, parent: &ModelIndex) -> String {
        let rows = model.row_count(parent);
        if rows == 0 {
            return "(empty)".to_string();
        }
        let mut lines = Vec::new();
        for row in 0..rows {
            let index = model.index(row, 0, parent);
            self.format_item(model, &index, &mut Vec::new(), &mut lines);
        }
        lines.join("\n")
    }

    /// Formats one item and recurses into its children.
    ///
    /// `trail` holds, for each level below the top, whether that ancestor was
    /// the last of its siblings.
    fn format_item(
        &self,
        model: &dyn ItemModel,
        index: &ModelIndex,
        trail: &mut Vec<bool>,
        lines: &mut Vec<String>,
    ) {
        let depth = trail.len();
        let mut line = self.build_prefix(trail);
        line.push_str(&self.label(model, index));
        lines.push(line);

        if self.options.max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        let rows = model.row_count(index);
        for row in 0..rows {
            let child = model.index(row, 0, index);
            if !child.is_valid() {
                continue;
            }
            trail.push(row + 1 == rows);
            self.format_item(model, &child, trail, lines);
            trail.pop();
        }
    }

    fn label(&self, model: &dyn ItemModel, index: &ModelIndex) -> String {
        let mut label = model
            .display_text(index)
            .unwrap_or_else(|| "(no text)".to_string());

        if self.options.show_columns {
            let parent = model.parent(index);
            for column in 1..model.column_count(&parent) {
                let cell = model.index(index.row(), column, &parent);
                let text = model.display_text(&cell).unwrap_or_default();
                let _ = write!(label, " | {text}");
            }
        }
        if self.options.show_ids {
            let _ = write!(label, " [row {}, id {}]", index.row(), index.internal_id());
        }
        label
    }

    /// Build the prefix string for a tree node.
    fn build_prefix(&self, trail: &[bool]) -> String {
        let Some((&is_last, ancestors)) = trail.split_last() else {
            return String::new();
        };

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for &ancestor_last in ancestors {
            if ancestor_last || branch.is_empty() {
                prefix.push(' ');
            } else {
                prefix.push_str(branch);
            }
            for _ in 0..self.options.indent_size.max(1) + 1 {
                prefix.push(' ');
            }
        }
        prefix.push_str(if is_last { corner } else { tee });
        prefix.push(' ');
        prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeModel;

    fn sample() -> TreeModel<String> {
        let model = TreeModel::<String>::new();
        let a = model.add_root("A".into());
        let b = model.add_child(a, "B".into()).unwrap();
        model.add_child(b, "X".into());
        model.add_child(a, "C".into());
        model.add_root("D".into());
        model
    }

    #[test]
    fn test_format_empty() {
        let model = TreeModel::<String>::new();
        assert_eq!(ModelTreeDebug::new().format(&model), "(empty)");
    }

    #[test]
    fn test_format_hierarchy() {
        let output = ModelTreeDebug::new().format(&sample());
        assert_eq!(output, "A\n├── B\n│   └── X\n└── C\nD");
    }

    #[test]
    fn test_format_ascii_and_depth() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            max_depth: Some(1),
            ..TreeFormatOptions::minimal()
        };
        let output = ModelTreeDebug::with_options(options).format(&sample());
        assert_eq!(output, "A\n+-- B\n`-- C\nD");
    }

    #[test]
    fn test_format_subtree_detailed() {
        let model = sample();
        let a = model.index(0, 0, &ModelIndex::invalid());
        let b = model.index(0, 0, &a);
        let output = ModelTreeDebug::with_options(TreeFormatOptions::detailed()).format_subtree(&model, &b);
        assert!(output.starts_with("B [row 0, id"));
        assert!(output.contains("X"));
        assert!(!output.contains("C"));
    }
}

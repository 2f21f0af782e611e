//! Data roles for item models.
//!
//! Roles define what type of data is being requested or set on a model item.
//! Each item can have multiple pieces of data associated with it, distinguished
//! by their role.

use std::any::Any;
use std::sync::Arc;

/// Standard roles for accessing different aspects of item data.
///
/// When querying data from a model via `ItemModel::data()`, the role specifies
/// what information is being requested. Proxies pass roles through untouched.
///
/// # Example
///
/// ```ignore
/// use horizon_itemviews::model::{ItemModel, ItemRole};
///
/// // Get display text
/// let text = model.data(&index, ItemRole::Display);
///
/// // Get custom data
/// let custom = model.data(&index, ItemRole::User(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text to display. Should return `String`.
    Display,
    /// Value for editing (may be richer than display text). Type depends on item.
    Edit,
    /// Tooltip text shown on hover. Should return `String`.
    ToolTip,
    /// Text shown in status bar when item is selected. Should return `String`.
    StatusTip,
    /// Check state for checkable items. Should return `CheckState`.
    CheckState,
    /// Application-specific data. Use `ItemRole::User(n)` for custom roles.
    User(u32),
}

impl ItemRole {
    /// Returns `true` if this is a user-defined role.
    #[inline]
    pub fn is_user_role(&self) -> bool {
        matches!(self, ItemRole::User(_))
    }

    /// Returns the numeric value of this role.
    ///
    /// Standard roles have fixed values below 256; user roles start at 256.
    pub fn value(&self) -> u32 {
        match self {
            ItemRole::Display => 0,
            ItemRole::Edit => 2,
            ItemRole::ToolTip => 3,
            ItemRole::StatusTip => 4,
            ItemRole::CheckState => 10,
            ItemRole::User(n) => 256 + n,
        }
    }

    /// Creates an ItemRole from a numeric value.
    ///
    /// Returns `None` for values that do not name a known role.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(ItemRole::Display),
            2 => Some(ItemRole::Edit),
            3 => Some(ItemRole::ToolTip),
            4 => Some(ItemRole::StatusTip),
            10 => Some(ItemRole::CheckState),
            n if n >= 256 => Some(ItemRole::User(n - 256)),
            _ => None,
        }
    }
}

/// Check state for checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is partially checked (for tri-state checkboxes).
    PartiallyChecked,
    /// Item is checked.
    Checked,
}

impl CheckState {
    /// Returns `true` if the item is checked (fully or partially).
    pub fn is_checked(&self) -> bool {
        !matches!(self, CheckState::Unchecked)
    }
}

/// Type-erased container for item data.
///
/// `ItemData` holds the value a model returns for one role. Plain values are
/// stored inline; anything else goes into [`ItemData::Custom`].
///
/// ```
/// use horizon_itemviews::model::ItemData;
///
/// let data = ItemData::from("Hello");
/// assert_eq!(data.as_string(), Some("Hello"));
///
/// let data = ItemData::new(42u32);
/// assert_eq!(data.downcast::<u32>(), Some(&42));
/// ```
#[derive(Debug, Clone, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// String data (for Display, ToolTip, etc.).
    String(String),
    /// Integer data.
    Int(i64),
    /// Floating point data.
    Float(f64),
    /// Boolean data.
    Bool(bool),
    /// Check state data.
    CheckState(CheckState),
    /// Custom data (type-erased, shared on clone).
    Custom(Arc<dyn Any + Send + Sync>),
}

impl ItemData {
    /// Creates new custom data from any type.
    pub fn new<T: Any + Send + Sync + 'static>(value: T) -> Self {
        ItemData::Custom(Arc::new(value))
    }

    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as check state.
    pub fn as_check_state(&self) -> Option<CheckState> {
        match self {
            ItemData::CheckState(s) => Some(*s),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: Any>(&self) -> Option<&T> {
        match self {
            ItemData::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Compares two values the way `ItemModel::match_items` does.
    ///
    /// Plain values compare by value; custom data and `None` never match.
    pub fn matches(&self, other: &ItemData) -> bool {
        match (self, other) {
            (ItemData::String(a), ItemData::String(b)) => a == b,
            (ItemData::Int(a), ItemData::Int(b)) => a == b,
            (ItemData::Float(a), ItemData::Float(b)) => a == b,
            (ItemData::Bool(a), ItemData::Bool(b)) => a == b,
            (ItemData::CheckState(a), ItemData::CheckState(b)) => a == b,
            _ => false,
        }
    }

    /// Renders plain values as text; `None` and custom data yield `None`.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s.clone()),
            ItemData::Int(n) => Some(n.to_string()),
            ItemData::Float(n) => Some(n.to_string()),
            ItemData::Bool(b) => Some(b.to_string()),
            ItemData::CheckState(s) => Some(format!("{s:?}")),
            ItemData::None | ItemData::Custom(_) => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<i32> for ItemData {
    fn from(n: i32) -> Self {
        ItemData::Int(n as i64)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<CheckState> for ItemData {
    fn from(s: CheckState) -> Self {
        ItemData::CheckState(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_role_values() {
        assert_eq!(ItemRole::Display.value(), 0);
        assert_eq!(ItemRole::User(0).value(), 256);
        assert_eq!(ItemRole::User(10).value(), 266);
    }

    #[test]
    fn test_item_role_from_value() {
        assert_eq!(ItemRole::from_value(0), Some(ItemRole::Display));
        assert_eq!(ItemRole::from_value(10), Some(ItemRole::CheckState));
        assert_eq!(ItemRole::from_value(256), Some(ItemRole::User(0)));
        assert_eq!(ItemRole::from_value(100), None); // Reserved
    }

    #[test]
    fn test_item_data_string() {
        let data = ItemData::from("hello");
        assert_eq!(data.as_string(), Some("hello"));
        assert!(data.as_int().is_none());
    }

    #[test]
    fn test_item_data_custom_is_shared_on_clone() {
        #[derive(Debug, PartialEq)]
        struct MyData(u32);

        let data = ItemData::new(MyData(42));
        let copy = data.clone();
        assert_eq!(copy.downcast::<MyData>(), Some(&MyData(42)));
        assert!(data.downcast::<u32>().is_none());
    }

    #[test]
    fn test_item_data_matches() {
        assert!(ItemData::from("a").matches(&ItemData::from("a")));
        assert!(!ItemData::from("a").matches(&ItemData::from(1)));
        assert!(!ItemData::None.matches(&ItemData::None));
        assert_eq!(ItemData::from(7).to_display_string().as_deref(), Some("7"));
    }
}

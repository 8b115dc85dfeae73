//! Value types shared by the scroller, its cursors, and the backend contract.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BackendError;

/// Opaque identity of one item (conversation or message) in a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reference to the backend's live view of one list (e.g. a labeled mailbox).
///
/// The backend owns the resource behind it; a [`ListScroller`] releases it
/// exactly once on disconnect.
///
/// [`ListScroller`]: super::ListScroller
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionHandle {
    id: u64,
    label: String,
}

impl CollectionHandle {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.label, self.id)
    }
}

/// Whether read items are part of the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadFilter {
    #[default]
    All,
    Unread,
}

/// Whether spam and trash contribute items to the list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncludeSwitch {
    #[default]
    Default,
    WithSpamAndTrash,
}

/// The two filter axes currently applied to a scroller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub read: ReadFilter,
    #[serde(default)]
    pub include: IncludeSwitch,
}

impl FilterState {
    pub fn new(read: ReadFilter, include: IncludeSwitch) -> Self {
        Self { read, include }
    }
}

/// Outcome of a synchronous, local-only look at the next item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeekNext {
    /// Local state proves there is no next item.
    None,
    /// Local state already holds the next item.
    Some(ItemId),
    /// Local state cannot tell; the next item may live in an unfetched page.
    Maybe,
}

/// Outcome of a single cursor navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorResult {
    End,
    Error(BackendError),
    Cursor(ItemId),
}

impl CursorResult {
    /// The item this step resolved to, if any.
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            CursorResult::Cursor(id) => Some(id),
            CursorResult::End | CursorResult::Error(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_state_defaults() {
        let filters = FilterState::default();
        assert_eq!(filters.read, ReadFilter::All);
        assert_eq!(filters.include, IncludeSwitch::Default);
    }

    #[test]
    fn test_filter_state_from_toml() {
        let filters: FilterState = toml::from_str(
            r#"
            read = "unread"
            include = "with-spam-and-trash"
        "#,
        )
        .unwrap();
        assert_eq!(
            filters,
            FilterState::new(ReadFilter::Unread, IncludeSwitch::WithSpamAndTrash)
        );
    }

    #[test]
    fn test_cursor_result_item() {
        let id = ItemId::from("item-7");
        assert_eq!(CursorResult::Cursor(id.clone()).item(), Some(&id));
        assert_eq!(CursorResult::End.item(), None);
        assert_eq!(CursorResult::Error(BackendError::Timeout).item(), None);
    }

    #[test]
    fn test_handle_display() {
        let handle = CollectionHandle::new(3, "Inbox");
        assert_eq!(handle.to_string(), "Inbox#3");
        assert_eq!(handle.label(), "Inbox");
        assert_eq!(handle.id(), 3);
    }
}

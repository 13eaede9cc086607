//! Cursor pagination data model

use serde::{Deserialize, Serialize};

use crate::errors::RaitoError;

/// One element of a list stream: a mapped item or the terminal error
pub type ListItem<T> = Result<T, RaitoError>;

/// Page metadata returned by the remote API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: Option<bool>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

impl PageInfo {
    /// Absent and `false` both end pagination.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.has_next_page.unwrap_or(false)
    }
}

/// One fetched page: metadata plus the opaque edges in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<E> {
    pub page_info: Option<PageInfo>,
    pub edges: Vec<E>,
}

impl<E> Page<E> {
    #[must_use]
    pub fn new(page_info: Option<PageInfo>, edges: Vec<E>) -> Self {
        Self { page_info, edges }
    }

    /// Whether the engine should request another page after this one
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page_info.as_ref().is_some_and(PageInfo::has_next)
    }
}

/// Edge as serialized by the API: a cursor and a possibly-null node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<N> {
    pub cursor: Option<String>,
    pub node: Option<N>,
}

/// Result of mapping one edge
///
/// A `None` item marks a tombstone edge: it advances the cursor but emits
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeOutcome<T> {
    pub cursor: Option<String>,
    pub item: Option<T>,
}

impl<T> EdgeOutcome<T> {
    pub fn item(cursor: Option<String>, item: T) -> Self {
        Self { cursor, item: Some(item) }
    }

    pub fn tombstone(cursor: Option<String>) -> Self {
        Self { cursor, item: None }
    }
}

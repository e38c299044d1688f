//! Cursor Store boundary
//!
//! The remote document store is a collaborator: the engine only needs
//! "first page", "page after cursor" and "turn a record id back into a cursor".
//! Results must be ordered newest first, and a page shorter than `page_size`
//! means there is nothing left.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{FeedKind, Record, RecordBody, RecordId};

/// Store-native pagination cursor
///
/// The token is opaque and must be treated as an uninterpreted string; only
/// the store that issued it knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorHandle {
    kind: FeedKind,
    token: String,
}

impl CursorHandle {
    pub fn new(kind: FeedKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// One ordered batch of records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub records: Vec<Record>,
    /// Cursor at the last record of the batch, if the batch is non-empty
    pub last: Option<CursorHandle>,
}

impl Page {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("malformed cursor: {0}")]
    InvalidCursor(String),

    #[error("store error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Internal(_))
    }
}

/// Read side of the remote collection
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Newest `page_size` records of a feed
    async fn query_first_page(&self, kind: FeedKind, page_size: usize)
        -> Result<Page, StoreError>;

    /// Up to `page_size` records strictly after `after`
    async fn query_next_page(
        &self,
        kind: FeedKind,
        after: &CursorHandle,
        page_size: usize,
    ) -> Result<Page, StoreError>;

    /// Point lookup turning a record id back into a cursor
    ///
    /// Returns `Ok(None)` if the record no longer exists.
    async fn resolve_cursor_handle(
        &self,
        kind: FeedKind,
        id: &RecordId,
    ) -> Result<Option<CursorHandle>, StoreError>;
}

/// Write side used by the submission forms
#[async_trait]
pub trait RecordWriter: Send + Sync {
    /// Appends a record; the store assigns its id and sort key
    async fn append(&self, kind: FeedKind, body: RecordBody) -> Result<Record, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::Unavailable("offline".into()).is_transient());
        assert!(StoreError::Internal("boom".into()).is_transient());
        assert!(!StoreError::PermissionDenied("rules".into()).is_transient());
        assert!(!StoreError::InvalidCursor("x".into()).is_transient());
    }

    #[test]
    fn test_cursor_handle_accessors() {
        let handle = CursorHandle::new(FeedKind::Comments, "1700000000000.3");
        assert_eq!(handle.kind(), FeedKind::Comments);
        assert_eq!(handle.token(), "1700000000000.3");
    }

    #[test]
    fn test_error_messages() {
        let error = StoreError::Unavailable("network down".into());
        assert_eq!(error.to_string(), "store unavailable: network down");
    }
}

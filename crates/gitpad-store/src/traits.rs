//! Core trait for the document store.

use gitpad_types::{Document, DocumentType};

use crate::error::StoreError;

/// Append-only store for lock-state and audit documents.
///
/// Documents are never updated or deleted. Implementations keep insertion
/// order so that "most recent" means "last inserted".
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Append a document.
    async fn insert(&self, doc: &Document) -> Result<(), StoreError>;

    /// Return the most recently inserted document of the given type.
    async fn latest_of_type(&self, doc_type: DocumentType)
    -> Result<Option<Document>, StoreError>;

    /// Return up to `limit` documents whose type is in `types`, newest first.
    async fn recent(
        &self,
        types: &[DocumentType],
        limit: usize,
    ) -> Result<Vec<Document>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

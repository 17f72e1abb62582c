//! Placeholder store used when the configured store cannot be reached.

use gitpad_types::{Document, DocumentType};

use crate::error::StoreError;
use crate::traits::DocumentStore;

/// A store that is never connected.
///
/// Every operation fails with [`StoreError::Unavailable`]. The daemon falls
/// back to it when opening the configured store fails, so the service keeps
/// running with the default lock state and a non-functional audit log.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineStore;

#[async_trait::async_trait]
impl DocumentStore for OfflineStore {
    async fn insert(&self, _doc: &Document) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn latest_of_type(
        &self,
        _doc_type: DocumentType,
    ) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn recent(
        &self,
        _types: &[DocumentType],
        _limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

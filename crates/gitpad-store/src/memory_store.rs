//! In-memory document store backend.

use std::sync::RwLock;

use gitpad_types::{Document, DocumentType};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::DocumentStore;

/// In-memory document store backed by a `RwLock<Vec>`.
///
/// Useful for testing and for daemons started with a `memory:` store URL.
/// Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, doc: &Document) -> Result<(), StoreError> {
        let mut docs = self.documents.write().expect("lock poisoned");
        docs.push(doc.clone());
        debug!(seq = docs.len() - 1, doc_type = %doc.doc_type(), "stored document in memory");
        Ok(())
    }

    async fn latest_of_type(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<Document>, StoreError> {
        let docs = self.documents.read().expect("lock poisoned");
        Ok(docs.iter().rev().find(|d| d.doc_type() == doc_type).cloned())
    }

    async fn recent(
        &self,
        types: &[DocumentType],
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        let docs = self.documents.read().expect("lock poisoned");
        Ok(docs
            .iter()
            .rev()
            .filter(|d| types.contains(&d.doc_type()))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

//! A [`DocumentStore`] wrapper that injects failures.
//!
//! `FaultyStore` wraps any `Arc<dyn DocumentStore>` and can be switched at
//! runtime to fail writes (a connected store that errors) or to behave as
//! disconnected (every call returns [`StoreError::Unavailable`]).
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(FaultyStore::new(Arc::new(MemoryStore::new())));
//! store.set_fail_writes(true);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gitpad_types::{Document, DocumentType};

use crate::error::StoreError;
use crate::traits::DocumentStore;

/// A [`DocumentStore`] wrapper with switchable failure modes.
pub struct FaultyStore {
    inner: Arc<dyn DocumentStore>,
    fail_writes: AtomicBool,
    disconnected: AtomicBool,
}

impl FaultyStore {
    /// Wrap an existing store, passing everything through by default.
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Make inserts fail with an I/O error while reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every call fail with [`StoreError::Unavailable`].
    pub fn set_disconnected(&self, disconnected: bool) {
        self.disconnected.store(disconnected, Ordering::SeqCst);
    }

    fn check_connected(&self) -> Result<(), StoreError> {
        if self.disconnected.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for FaultyStore {
    async fn insert(&self, doc: &Document) -> Result<(), StoreError> {
        self.check_connected()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other(
                "injected write failure",
            )));
        }
        self.inner.insert(doc).await
    }

    async fn latest_of_type(
        &self,
        doc_type: DocumentType,
    ) -> Result<Option<Document>, StoreError> {
        self.check_connected()?;
        self.inner.latest_of_type(doc_type).await
    }

    async fn recent(
        &self,
        types: &[DocumentType],
        limit: usize,
    ) -> Result<Vec<Document>, StoreError> {
        self.check_connected()?;
        self.inner.recent(types, limit).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_connected()?;
        self.inner.ping().await
    }
}

//! Append-only audit log of edit and admin actions.
//!
//! Records go to the same document store as the lock state, under the
//! `edit` and `admin` document types. Appends are best effort: a record may
//! be silently lost when the store is down, and that never fails the action
//! being audited.

use std::sync::Arc;

use gitpad_store::{DocumentStore, StoreError};
use gitpad_types::{AuditDetail, AuditKind, AuditRecord, Document, DocumentType};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Build an [`AuditDetail`] from key/value pairs.
pub fn detail<const N: usize>(pairs: [(&str, serde_json::Value); N]) -> AuditDetail {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Handle to the audit log.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn DocumentStore>,
}

impl AuditLog {
    /// Log into `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Record an action without waiting for the write.
    ///
    /// The record is stamped now and written on a spawned task. Failures are
    /// logged and dropped; the record may be lost. The returned handle can be
    /// awaited to observe completion and is otherwise safe to drop.
    ///
    /// Must be called from within a tokio runtime.
    pub fn append(&self, kind: AuditKind, detail: AuditDetail) -> JoinHandle<()> {
        let record = AuditRecord::now(kind, detail);
        let store = self.store.clone();
        tokio::spawn(async move {
            match store.insert(&Document::from(record)).await {
                Ok(()) => debug!(%kind, "audit record stored"),
                Err(StoreError::Unavailable) => {
                    warn!(%kind, "document store unavailable, audit record dropped");
                }
                Err(e) => warn!(%kind, %e, "failed to store audit record"),
            }
        })
    }

    /// Record an action and wait for the write.
    pub async fn append_now(&self, kind: AuditKind, detail: AuditDetail) -> Result<(), StoreError> {
        let record = AuditRecord::now(kind, detail);
        self.store.insert(&Document::from(record)).await
    }

    /// The `limit` most recent records, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<AuditRecord>, StoreError> {
        let docs = self.store.recent(&DocumentType::AUDIT, limit).await?;
        Ok(docs
            .into_iter()
            .filter_map(Document::into_audit_record)
            .collect())
    }
}

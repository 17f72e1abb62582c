//! [`DocumentStore`] implementation wrapping a Fjall keyspace.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use gitpad_types::{Document, DocumentType};
use tempfile::TempDir;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::DocumentStore;

type Result<T> = std::result::Result<T, StoreError>;

/// Persistent document store backed by Fjall.
///
/// All documents live in one keyspace, `documents`, keyed by a big-endian
/// sequence number so that key order is insertion order.
pub struct FjallStore {
    /// The underlying Fjall database handle.
    #[allow(dead_code)]
    db: Database,
    /// sequence (8 bytes BE) → JSON document.
    documents: Keyspace,
    /// Next sequence number to assign.
    next_seq: AtomicU64,
    /// Keeps the directory of a temporary store alive.
    _tmp: Option<TempDir>,
}

impl FjallStore {
    /// Open a persistent store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = Database::builder(path).open()?;
        Self::init(db, None)
    }

    /// Open a temporary store that is cleaned up on drop.
    ///
    /// Useful for tests.
    pub fn open_temporary() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let db = Database::builder(tmp.path()).temporary(true).open()?;
        Self::init(db, Some(tmp))
    }

    fn init(db: Database, tmp: Option<TempDir>) -> Result<Self> {
        let documents = db.keyspace("documents", KeyspaceCreateOptions::default)?;

        let next_seq = match documents.last_key_value() {
            Some(guard) => {
                let (key, _) = guard.into_inner()?;
                decode_seq(&key)? + 1
            }
            None => 0,
        };
        debug!(next_seq, "opened document store");

        Ok(Self {
            db,
            documents,
            next_seq: AtomicU64::new(next_seq),
            _tmp: tmp,
        })
    }

    /// Number of stored documents.
    ///
    /// Note: this is an O(n) scan.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for guard in self.documents.iter() {
            let _ = guard.key()?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.documents.first_key_value().is_none())
    }
}

#[async_trait::async_trait]
impl DocumentStore for FjallStore {
    async fn insert(&self, doc: &Document) -> Result<()> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let value = serde_json::to_vec(doc)?;
        self.documents.insert(seq.to_be_bytes(), value.as_slice())?;
        debug!(seq, doc_type = %doc.doc_type(), "stored document");
        Ok(())
    }

    async fn latest_of_type(&self, doc_type: DocumentType) -> Result<Option<Document>> {
        for guard in self.documents.iter().rev() {
            let value = guard.value()?;
            let doc: Document = serde_json::from_slice(&value)?;
            if doc.doc_type() == doc_type {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    async fn recent(&self, types: &[DocumentType], limit: usize) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        if limit == 0 {
            return Ok(docs);
        }
        for guard in self.documents.iter().rev() {
            let value = guard.value()?;
            let doc: Document = serde_json::from_slice(&value)?;
            if types.contains(&doc.doc_type()) {
                docs.push(doc);
                if docs.len() == limit {
                    break;
                }
            }
        }
        Ok(docs)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Decode a sequence key: 8 bytes, big-endian.
fn decode_seq(key: &[u8]) -> Result<u64> {
    let arr: [u8; 8] = key
        .try_into()
        .map_err(|_| StoreError::CorruptKey { len: key.len() })?;
    Ok(u64::from_be_bytes(arr))
}

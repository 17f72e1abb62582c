//! In-process [`FileRepository`] with versioned revisions.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use gitpad_types::{RemoteFile, RevisionHash};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::RemoteError;
use crate::traits::FileRepository;

/// One stored file.
struct StoredFile {
    content: String,
    version: u64,
    revision: RevisionHash,
    modified_at: OffsetDateTime,
}

/// In-memory repository that behaves like the hosted API with respect to
/// revisions: every successful write bumps a version counter and issues a
/// new revision hash, and writes carrying an older hash are rejected.
///
/// Useful for tests and for running the daemon without network access.
#[derive(Default)]
pub struct MemoryRepository {
    files: RwLock<HashMap<String, StoredFile>>,
    reject_credentials: AtomicBool,
    overwrite_calls: AtomicUsize,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryRepository::put_file`].
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.put_file(path, content);
        self
    }

    /// Create or replace a file without any revision check.
    pub fn put_file(&self, path: &str, content: &str) -> RevisionHash {
        let mut files = self.files.write().expect("lock poisoned");
        let version = files.get(path).map_or(1, |f| f.version + 1);
        let revision = revision_for(path, version, content);
        files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_string(),
                version,
                revision: revision.clone(),
                modified_at: OffsetDateTime::now_utc(),
            },
        );
        revision
    }

    /// Current content of a file, bypassing the [`FileRepository`] interface.
    pub fn content(&self, path: &str) -> Option<String> {
        let files = self.files.read().expect("lock poisoned");
        files.get(path).map(|f| f.content.clone())
    }

    /// Current revision of a file.
    pub fn revision(&self, path: &str) -> Option<RevisionHash> {
        let files = self.files.read().expect("lock poisoned");
        files.get(path).map(|f| f.revision.clone())
    }

    /// Make every call fail with [`RemoteError::Auth`], as with a revoked token.
    pub fn set_reject_credentials(&self, reject: bool) {
        self.reject_credentials.store(reject, Ordering::SeqCst);
    }

    /// How many times [`FileRepository::overwrite_file`] was called,
    /// successful or not.
    pub fn overwrite_calls(&self) -> usize {
        self.overwrite_calls.load(Ordering::SeqCst)
    }

    fn check_credentials(&self) -> Result<(), RemoteError> {
        if self.reject_credentials.load(Ordering::SeqCst) {
            return Err(RemoteError::Auth {
                message: "Bad credentials".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl FileRepository for MemoryRepository {
    async fn fetch_file(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        self.check_credentials()?;
        let files = self.files.read().expect("lock poisoned");
        let file = files.get(path).ok_or_else(|| not_found(path))?;
        Ok(RemoteFile {
            path: path.to_string(),
            content: file.content.clone(),
            revision: file.revision.clone(),
        })
    }

    async fn fetch_last_modified(&self, path: &str) -> Result<OffsetDateTime, RemoteError> {
        self.check_credentials()?;
        let files = self.files.read().expect("lock poisoned");
        files
            .get(path)
            .map(|f| f.modified_at)
            .ok_or_else(|| not_found(path))
    }

    async fn overwrite_file(
        &self,
        path: &str,
        content: &str,
        revision: &RevisionHash,
        _message: &str,
    ) -> Result<RevisionHash, RemoteError> {
        self.overwrite_calls.fetch_add(1, Ordering::SeqCst);
        self.check_credentials()?;

        let mut files = self.files.write().expect("lock poisoned");
        let file = files.get_mut(path).ok_or_else(|| not_found(path))?;
        if &file.revision != revision {
            return Err(RemoteError::Conflict {
                message: format!("{path} does not match {revision}"),
            });
        }

        file.version += 1;
        file.content = content.to_string();
        file.revision = revision_for(path, file.version, content);
        file.modified_at = OffsetDateTime::now_utc();
        debug!(path, version = file.version, revision = %file.revision, "overwrote file in memory");
        Ok(file.revision.clone())
    }
}

fn not_found(path: &str) -> RemoteError {
    RemoteError::NotFound {
        message: format!("no such file: {path}"),
    }
}

/// Derive a 40-hex-character revision from the path, version and content.
fn revision_for(path: &str, version: u64, content: &str) -> RevisionHash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(path.as_bytes());
    hasher.update(&version.to_be_bytes());
    hasher.update(content.as_bytes());
    RevisionHash::new(&hasher.finalize().to_hex()[..40])
}

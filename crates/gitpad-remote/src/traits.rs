//! [`FileRepository`]: the remote file interface used by the web layer.

use gitpad_types::{RemoteFile, RevisionHash};
use time::OffsetDateTime;
use tracing::debug;

use crate::error::RemoteError;

/// A hosted, versioned store of files.
#[async_trait::async_trait]
pub trait FileRepository: Send + Sync {
    /// Read a file's content and current revision.
    async fn fetch_file(&self, path: &str) -> Result<RemoteFile, RemoteError>;

    /// Read when the file was last changed, from its revision history.
    ///
    /// Fails with [`RemoteError::NotFound`] when the file has no history.
    async fn fetch_last_modified(&self, path: &str) -> Result<OffsetDateTime, RemoteError>;

    /// Replace a file's content, provided `revision` is still current.
    ///
    /// Returns the new revision. A stale `revision` fails with
    /// [`RemoteError::Conflict`].
    async fn overwrite_file(
        &self,
        path: &str,
        content: &str,
        revision: &RevisionHash,
        message: &str,
    ) -> Result<RevisionHash, RemoteError>;
}

/// Read the current revision of `path`, then overwrite it with `content`.
///
/// The revision used is the one from the read immediately preceding the
/// write. If another writer lands in between, the remote rejects the write
/// and this returns [`RemoteError::Conflict`] without retrying.
pub async fn update_file(
    repo: &dyn FileRepository,
    path: &str,
    content: &str,
    message: &str,
) -> Result<RevisionHash, RemoteError> {
    let current = repo.fetch_file(path).await?;
    debug!(path, revision = %current.revision, "fetched revision for update");
    repo.overwrite_file(path, content, &current.revision, message)
        .await
}

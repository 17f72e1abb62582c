//! Error types for lock state changes.

use gitpad_store::StoreError;

/// Errors returned by [`LockManager::set_locked`](crate::LockManager::set_locked).
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// The connected store refused the write. The in-memory state is unchanged.
    #[error("failed to persist lock state: {0}")]
    Store(#[from] StoreError),
}

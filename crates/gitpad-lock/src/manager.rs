//! [`LockManager`] implementation.

use std::sync::{Arc, RwLock};

use gitpad_store::{DocumentStore, StoreError};
use gitpad_types::{Document, DocumentType, LockState};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::LockError;

/// Outcome of [`LockManager::set_locked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockChange {
    /// State before the change.
    pub previous: LockState,
    /// State after the change.
    pub current: LockState,
    /// Whether the change was persisted. `false` means the store is
    /// disconnected and the change lives only until the process exits.
    pub durable: bool,
}

/// Owner of the process-wide lock state.
pub struct LockManager {
    store: Arc<dyn DocumentStore>,
    current: RwLock<LockState>,
    /// Serializes `set_locked` so the newest stored record is also the one
    /// applied in memory.
    writer: Mutex<()>,
}

impl LockManager {
    /// Restore the newest persisted state from `store`.
    ///
    /// An empty store yields UNLOCKED. So does a failing store: the failure is
    /// logged and the service keeps running.
    pub async fn restore(store: Arc<dyn DocumentStore>) -> Self {
        let state = match load_latest(store.as_ref()).await {
            Ok(Some(state)) => {
                info!(locked = state.locked, recorded_at = %state.recorded_at, "restored lock state");
                state
            }
            Ok(None) => {
                info!("no persisted lock state, starting unlocked");
                LockState::default()
            }
            Err(e) => {
                warn!(%e, "failed to restore lock state, starting unlocked");
                LockState::default()
            }
        };

        Self {
            store,
            current: RwLock::new(state),
            writer: Mutex::new(()),
        }
    }

    /// The current state.
    pub fn current(&self) -> LockState {
        *self.current.read().expect("lock poisoned")
    }

    /// Whether content edits are currently refused.
    pub fn is_locked(&self) -> bool {
        self.current().locked
    }

    /// Persist a new state, then make it current.
    ///
    /// The store write happens first. If it fails on a connected store, the
    /// in-memory state is left untouched and the error returned. If the store
    /// is disconnected, the new state applies in memory only and the returned
    /// [`LockChange::durable`] is `false`.
    ///
    /// Concurrent calls run one at a time.
    pub async fn set_locked(&self, locked: bool) -> Result<LockChange, LockError> {
        let _writer = self.writer.lock().await;
        let next = LockState::now(locked);

        let durable = match self.store.insert(&Document::from(next)).await {
            Ok(()) => true,
            Err(StoreError::Unavailable) => {
                warn!(locked, "document store unavailable, lock change is not durable");
                false
            }
            Err(e) => return Err(e.into()),
        };

        let previous = {
            let mut current = self.current.write().expect("lock poisoned");
            std::mem::replace(&mut *current, next)
        };

        info!(locked, previous = previous.locked, durable, "lock_state_changed");
        Ok(LockChange {
            previous,
            current: next,
            durable,
        })
    }
}

/// Read the newest persisted lock state, if any.
pub async fn load_latest(store: &dyn DocumentStore) -> Result<Option<LockState>, StoreError> {
    Ok(store
        .latest_of_type(DocumentType::LockState)
        .await?
        .and_then(Document::into_lock_state))
}

//! The admin lock.
//!
//! [`LockManager`] owns the single in-memory [`LockState`] and is the only
//! way to read or change it. Every change is appended to the document store
//! as a `lock-state` document; on startup the newest one is restored.
//!
//! State machine: UNLOCKED ⇄ LOCKED, initial UNLOCKED unless restored. There
//! is no timeout-based unlock. Concurrent changes are not serialised: the
//! last write to the store wins.

mod error;
mod manager;

pub use error::LockError;
pub use manager::{LockChange, LockManager, load_latest};

pub use gitpad_types::LockState;

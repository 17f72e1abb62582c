//! Document store backends.
//!
//! The store holds a single collection of [`Document`](gitpad_types::Document)s
//! in insertion order. Lock-state records and audit records share it and are
//! told apart by their `type` field.
//!
//! - [`FjallStore`]: persistent, backed by a Fjall keyspace.
//! - [`MemoryStore`]: in-process `RwLock<Vec<_>>`, for tests and `memory:` URLs.
//! - [`OfflineStore`]: stands in when the configured store cannot be opened.
//! - [`FaultyStore`]: wrapper that injects write failures or disconnection.

mod error;
mod faulty_store;
mod fjall_store;
mod memory_store;
mod offline_store;
mod traits;
mod url;

pub use error::StoreError;
pub use faulty_store::FaultyStore;
pub use fjall_store::FjallStore;
pub use memory_store::MemoryStore;
pub use offline_store::OfflineStore;
pub use traits::DocumentStore;
pub use url::StoreUrl;

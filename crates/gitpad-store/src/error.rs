//! Error types for document store operations.

/// Errors returned by [`DocumentStore`](crate::DocumentStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store is not connected. Callers treat writes as silently dropped.
    #[error("document store unavailable")]
    Unavailable,

    /// Fjall database error.
    #[error("fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    /// I/O error (e.g. from Fjall guard operations).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A stored key does not have the expected layout.
    #[error("corrupt document key: expected 8 bytes, found {len}")]
    CorruptKey {
        /// Length of the key actually found.
        len: usize,
    },

    /// The connection string could not be understood.
    #[error("invalid store url: {url}")]
    InvalidUrl {
        /// The rejected connection string.
        url: String,
    },
}

impl StoreError {
    /// Whether this error means the store is disconnected, as opposed to a
    /// failure of a connected store.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

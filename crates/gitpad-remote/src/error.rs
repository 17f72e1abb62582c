//! Error types for remote file operations.

/// Errors returned by [`FileRepository`](crate::FileRepository) operations.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Missing or rejected credential.
    #[error("authentication failed: {message}")]
    Auth {
        /// Message returned by the remote.
        message: String,
    },

    /// The repository or file does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Message returned by the remote.
        message: String,
    },

    /// The revision supplied with a write is no longer current.
    #[error("revision conflict: {message}")]
    Conflict {
        /// Message returned by the remote.
        message: String,
    },

    /// Any other non-success response.
    #[error("remote returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message returned by the remote.
        message: String,
    },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// File content could not be decoded from its transport encoding.
    #[error("failed to decode content: {message}")]
    Decode {
        /// Description of the problem.
        message: String,
    },

    /// A timestamp in the response could not be parsed.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] time::error::Parse),

    /// The configured API URL or repository cannot form a request URL.
    #[error("invalid request url: {url}")]
    InvalidUrl {
        /// The offending URL or repository identifier.
        url: String,
    },
}

impl RemoteError {
    /// Whether this is a stale-revision rejection.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

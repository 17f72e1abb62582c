//! Handler errors and their HTML responses.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use gitpad_lock::LockError;
use gitpad_remote::RemoteError;

use crate::html;

/// Errors returned by web handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A content change was attempted while the lock is set.
    #[error("editing is locked by an administrator")]
    Locked,

    /// The admin password was wrong, or none is configured.
    #[error("invalid admin password")]
    Unauthorized,

    /// The form was missing a field or named an unknown action.
    #[error("bad request: {message}")]
    BadRequest {
        /// Description of the problem.
        message: String,
    },

    /// The hosted repository call failed.
    #[error("{context}: {source}")]
    Remote {
        /// What the handler was doing.
        context: &'static str,
        /// The underlying failure.
        #[source]
        source: RemoteError,
    },

    /// The lock change could not be persisted.
    #[error("lock change failed: {0}")]
    Lock(#[from] LockError),
}

impl WebError {
    /// Wrap a remote failure with what the handler was doing.
    pub(crate) fn remote(context: &'static str) -> impl FnOnce(RemoteError) -> Self {
        move |source| Self::Remote { context, source }
    }

    /// Map to an HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Locked => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Remote { source, .. } if source.is_conflict() => StatusCode::CONFLICT,
            Self::Remote { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::Locked => "Editing locked",
            Self::Unauthorized => "Unauthorized",
            Self::BadRequest { .. } => "Bad request",
            Self::Remote { source, .. } if source.is_conflict() => "File changed",
            Self::Remote { .. } | Self::Lock(_) => "Server error",
        }
    }

    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Remote { source, .. } if source.is_conflict() => Some(
                "The file was changed by someone else since it was loaded. Reload the editor and reapply your changes.",
            ),
            _ => None,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = html::error_page(self.title(), &self.to_string(), self.hint());
        (status, Html(body)).into_response()
    }
}

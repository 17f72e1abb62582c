//! HTML front-end for editing a single remote file.
//!
//! Provides a [`WebServer`] exposing an axum-based HTTP API:
//!
//! - `GET /`: editor: the file in a textarea, read-only while locked
//! - `POST /update`: save the `content` form field (403 while locked)
//! - `GET /admin`: admin panel: lock state and recent audit records
//! - `POST /admin`: `password` + `action` ∈ {`lock`, `unlock`, `clear`}
//! - `GET /health`: liveness
//!
//! ## Authentication
//!
//! Only `POST /admin` is protected. The submitted password is compared in
//! constant time against the configured admin password; with none
//! configured, every admin action is rejected (401).

mod error;
mod handlers;
mod html;


use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use gitpad_audit::AuditLog;
use gitpad_lock::LockManager;
use gitpad_remote::FileRepository;
use subtle::ConstantTimeEq;

pub use error::WebError;

/// Largest accepted form body.
const MAX_FORM_BYTES: usize = 1024 * 1024;

/// Commit message used for saves from the editor.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Updated via gitpad web editor";

/// Commit message used when an admin clears the file.
const CLEAR_COMMIT_MESSAGE: &str = "Cleared via gitpad admin panel";

/// Shared application state for all handlers.
#[derive(Clone)]
pub(crate) struct AppState {
    /// The remote file store.
    pub repo: Arc<dyn FileRepository>,
    /// Path of the edited file inside the repository.
    pub file_path: Arc<str>,
    /// The admin lock.
    pub lock: Arc<LockManager>,
    /// Best-effort audit log.
    pub audit: AuditLog,
    /// Admin password; `None` disables admin actions.
    pub admin_password: Option<Arc<str>>,
    /// Commit message for editor saves.
    pub commit_message: Arc<str>,
}

impl AppState {
    /// Check a submitted admin password in constant time.
    pub fn admin_password_matches(&self, candidate: &str) -> bool {
        self.admin_password
            .as_deref()
            .is_some_and(|expected| expected.as_bytes().ct_eq(candidate.as_bytes()).into())
    }
}

/// Configuration for creating a [`WebServer`].
pub struct WebServerConfig {
    /// The remote file store.
    pub repo: Arc<dyn FileRepository>,
    /// Path of the edited file inside the repository.
    pub file_path: String,
    /// The admin lock, already restored.
    pub lock: Arc<LockManager>,
    /// Audit log.
    pub audit: AuditLog,
    /// Admin password. Empty or `None` disables admin actions.
    pub admin_password: Option<String>,
    /// Commit message for editor saves.
    pub commit_message: String,
}

/// The editor HTTP server.
pub struct WebServer {
    router: Router,
}

impl WebServer {
    /// Create a new server with the given configuration.
    pub fn new(config: WebServerConfig) -> Self {
        let admin_password = config
            .admin_password
            .filter(|p| !p.is_empty())
            .map(Arc::from);
        if admin_password.is_none() {
            tracing::warn!("no admin password configured, admin actions are disabled");
        }

        let state = AppState {
            repo: config.repo,
            file_path: Arc::from(config.file_path),
            lock: config.lock,
            audit: config.audit,
            admin_password,
            commit_message: Arc::from(config.commit_message),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(handlers::editor))
            .route("/update", post(handlers::update))
            .route("/admin", get(handlers::admin_page).post(handlers::admin_action))
            .route("/health", get(handlers::health))
            .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
            .with_state(state)
    }

    /// Return the inner [`Router`] (useful for testing with `tower::ServiceExt`).
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve with graceful shutdown triggered by the given future.
    ///
    /// When `shutdown` completes, the server stops accepting new connections
    /// and waits for in-flight requests to finish.
    pub async fn serve_with_shutdown(
        self,
        addr: &str,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), std::io::Error> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(addr, "web server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

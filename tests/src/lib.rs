//! Shared test harness for gitpad integration tests.
//!
//! Provides [`FakeGithub`]: a small stand-in for the GitHub contents and
//! commits endpoints, served by axum on an ephemeral port. It tracks blob
//! shas the way the real API does, so a `PUT` carrying an outdated sha gets
//! `409 Conflict`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use gitpad_remote::{GithubConfig, GithubRepository};
use serde::Deserialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tokio::task::JoinHandle;

/// Repository served by [`FakeGithub`].
pub const REPO: &str = "octo/notes";

/// Token [`FakeGithub`] accepts.
pub const TOKEN: &str = "ghp_integration";

/// Timestamp of the first commit; each later commit is one minute newer.
pub const FIRST_COMMIT_AT: OffsetDateTime = datetime!(2024-01-01 00:00:00 UTC);

// =========================================================================
// State
// =========================================================================

/// A commit recorded by the fake API.
#[derive(Debug, Clone)]
pub struct FakeCommit {
    pub path: String,
    pub message: String,
    pub branch: Option<String>,
    pub date: OffsetDateTime,
}

struct FakeFile {
    content: String,
    sha: String,
}

#[derive(Default)]
struct FakeState {
    files: HashMap<String, FakeFile>,
    commits: Vec<FakeCommit>,
    next_sha: u64,
    get_requests: usize,
}

impl FakeState {
    /// Store `content` at `path` as a new commit and return the new sha.
    fn commit(&mut self, path: &str, content: &str, message: &str, branch: Option<String>) -> String {
        self.next_sha += 1;
        let sha = format!("{:040x}", self.next_sha);
        let date = FIRST_COMMIT_AT + Duration::minutes(self.commits.len() as i64);
        self.files.insert(
            path.to_string(),
            FakeFile {
                content: content.to_string(),
                sha: sha.clone(),
            },
        );
        self.commits.push(FakeCommit {
            path: path.to_string(),
            message: message.to_string(),
            branch,
            date,
        });
        sha
    }
}

type Shared = Arc<Mutex<FakeState>>;

// =========================================================================
// FakeGithub
// =========================================================================

/// Fake hosted API bound to `127.0.0.1:0`. Stops when dropped.
pub struct FakeGithub {
    addr: SocketAddr,
    state: Shared,
    handle: JoinHandle<()>,
}

impl FakeGithub {
    /// Start serving an empty repository.
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let router = Router::new()
            .route(
                "/repos/{owner}/{name}/contents/{*path}",
                get(get_contents).put(put_contents),
            )
            .route("/repos/{owner}/{name}/commits", get(list_commits))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to configure the client with.
    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client settings pointing at this server with the accepted token.
    pub fn config(&self) -> GithubConfig {
        let mut config = GithubConfig::new(TOKEN, REPO);
        config.api_url = self.api_url();
        config
    }

    /// A client for this server.
    pub fn repository(&self) -> GithubRepository {
        GithubRepository::new(self.config()).unwrap()
    }

    /// Commit a file directly, as another user would.
    pub fn put_file(&self, path: &str, content: &str) -> String {
        self.state
            .lock()
            .unwrap()
            .commit(path, content, "external commit", None)
    }

    /// Current content of a file.
    pub fn content(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|f| f.content.clone())
    }

    /// Current blob sha of a file.
    pub fn sha(&self, path: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|f| f.sha.clone())
    }

    /// All commits, oldest first.
    pub fn commits(&self) -> Vec<FakeCommit> {
        self.state.lock().unwrap().commits.clone()
    }

    /// Number of `GET` requests served so far.
    pub fn get_requests(&self) -> usize {
        self.state.lock().unwrap().get_requests
    }
}

impl Drop for FakeGithub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// =========================================================================
// Handlers
// =========================================================================

#[derive(Deserialize)]
struct PutBody {
    message: String,
    content: String,
    sha: Option<String>,
    branch: Option<String>,
}

#[derive(Deserialize)]
struct CommitsQuery {
    path: Option<String>,
    per_page: Option<usize>,
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Reject requests without the expected bearer token or for another repo.
fn check_request(headers: &HeaderMap, owner: &str, name: &str) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if !authorized {
        return Err(message(StatusCode::UNAUTHORIZED, "Bad credentials"));
    }
    if headers.get("user-agent").is_none() {
        return Err(message(StatusCode::FORBIDDEN, "User-Agent header required"));
    }
    if format!("{owner}/{name}") != REPO {
        return Err(message(StatusCode::NOT_FOUND, "Not Found"));
    }
    Ok(())
}

/// Base64 with a newline every 60 characters, as the contents API sends it.
fn wrapped_base64(content: &str) -> String {
    let encoded = STANDARD.encode(content.as_bytes());
    let mut out = String::with_capacity(encoded.len() + encoded.len() / 60 + 1);
    for chunk in encoded.as_bytes().chunks(60) {
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
        out.push('\n');
    }
    out
}

async fn get_contents(
    State(state): State<Shared>,
    Path((owner, name, path)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_request(&headers, &owner, &name) {
        return response;
    }

    let mut state = state.lock().unwrap();
    state.get_requests += 1;
    match state.files.get(&path) {
        Some(file) => Json(json!({
            "type": "file",
            "encoding": "base64",
            "path": path,
            "sha": file.sha,
            "size": file.content.len(),
            "content": wrapped_base64(&file.content),
        }))
        .into_response(),
        None => message(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn put_contents(
    State(state): State<Shared>,
    Path((owner, name, path)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<PutBody>,
) -> Response {
    if let Err(response) = check_request(&headers, &owner, &name) {
        return response;
    }

    let Ok(decoded) = STANDARD.decode(body.content.as_bytes()) else {
        return message(StatusCode::UNPROCESSABLE_ENTITY, "content is not valid Base64");
    };
    let content = String::from_utf8_lossy(&decoded).into_owned();

    let mut state = state.lock().unwrap();
    if let Some(file) = state.files.get(&path) {
        match body.sha.as_deref() {
            None => return message(StatusCode::UNPROCESSABLE_ENTITY, "\"sha\" wasn't supplied."),
            Some(sha) if sha != file.sha => {
                return message(
                    StatusCode::CONFLICT,
                    &format!("{path} does not match {sha}"),
                );
            }
            Some(_) => {}
        }
    }

    let sha = state.commit(&path, &content, &body.message, body.branch);
    Json(json!({
        "content": { "path": path, "sha": sha },
        "commit": { "message": body.message },
    }))
    .into_response()
}

async fn list_commits(
    State(state): State<Shared>,
    Path((owner, name)): Path<(String, String)>,
    Query(query): Query<CommitsQuery>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = check_request(&headers, &owner, &name) {
        return response;
    }

    let state = state.lock().unwrap();
    let per_page = query.per_page.unwrap_or(30);
    let entries: Vec<_> = state
        .commits
        .iter()
        .rev()
        .filter(|c| query.path.as_deref().is_none_or(|p| p == c.path))
        .take(per_page)
        .map(|c| {
            let date = c.date.format(&Rfc3339).unwrap_or_default();
            json!({
                "commit": {
                    "message": c.message,
                    "author": { "date": date },
                    "committer": { "date": date },
                },
            })
        })
        .collect();
    Json(entries).into_response()
}

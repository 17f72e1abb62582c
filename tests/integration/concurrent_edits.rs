//! Integration test: concurrent edits.
//!
//! Many saves race through the web layer against the fake API. Every save
//! either lands as its own commit or is rejected with 409; nothing is
//! silently overwritten.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use gitpad_audit::AuditLog;
use gitpad_integration_tests::FakeGithub;
use gitpad_lock::LockManager;
use gitpad_store::{DocumentStore, MemoryStore};
use gitpad_web::{DEFAULT_COMMIT_MESSAGE, WebServer, WebServerConfig};
use tower::ServiceExt;

const PATH: &str = "notes.md";
const WRITERS: usize = 16;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_saves_never_lose_a_write() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "base");
    let commits_before = fake.commits().len();

    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let app = WebServer::new(WebServerConfig {
        repo: Arc::new(fake.repository()),
        file_path: PATH.to_string(),
        lock: Arc::new(LockManager::restore(store.clone()).await),
        audit: AuditLog::new(store),
        admin_password: None,
        commit_message: DEFAULT_COMMIT_MESSAGE.to_string(),
    })
    .into_router();

    let mut tasks = Vec::new();
    for i in 0..WRITERS {
        let app = app.clone();
        tasks.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri("/update")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("content=writer-{i}")))
                .unwrap();
            let status = app.oneshot(request).await.unwrap().status();
            (i, status)
        }));
    }

    let mut saved = Vec::new();
    for task in tasks {
        let (i, status) = task.await.unwrap();
        match status {
            StatusCode::OK => saved.push(format!("writer-{i}")),
            StatusCode::CONFLICT => {}
            other => panic!("writer {i} got unexpected status {other}"),
        }
    }

    assert!(!saved.is_empty(), "at least one writer must win");

    // One commit per successful save, and the file holds one of them.
    let commits = fake.commits();
    assert_eq!(commits.len() - commits_before, saved.len());
    let final_content = fake.content(PATH).unwrap();
    assert!(saved.contains(&final_content), "{final_content} was not reported saved");
}

//! Integration test: GitHub client.
//!
//! Drives [`GithubRepository`] against the fake contents/commits API:
//! transport decoding, last-modified lookup, conditional overwrite and the
//! status-code mapping.

use gitpad_integration_tests::{FIRST_COMMIT_AT, FakeGithub};
use gitpad_remote::{FileRepository, GithubConfig, GithubRepository, RemoteError, update_file};
use gitpad_types::RevisionHash;
use time::Duration;

const PATH: &str = "docs/notes.md";

/// Content longer than one 60-column base64 line arrives wrapped and must
/// decode to the original text.
#[tokio::test]
async fn test_fetch_decodes_wrapped_content() {
    let fake = FakeGithub::start().await;
    let text = "line one\nline two with ünïcödé\n".repeat(20);
    let sha = fake.put_file(PATH, &text);

    let file = fake.repository().fetch_file(PATH).await.unwrap();
    assert_eq!(file.path, PATH);
    assert_eq!(file.content, text);
    assert_eq!(file.revision, RevisionHash::new(sha));
}

#[tokio::test]
async fn test_fetch_empty_file() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "");

    let file = fake.repository().fetch_file(PATH).await.unwrap();
    assert_eq!(file.content, "");
}

#[tokio::test]
async fn test_last_modified_is_newest_commit() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "v1");
    fake.put_file("other.md", "unrelated");
    fake.put_file(PATH, "v2");
    fake.put_file("other.md", "newer but unrelated");

    let at = fake.repository().fetch_last_modified(PATH).await.unwrap();
    // Third commit overall.
    assert_eq!(at, FIRST_COMMIT_AT + Duration::minutes(2));
}

#[tokio::test]
async fn test_last_modified_without_history_is_not_found() {
    let fake = FakeGithub::start().await;
    fake.put_file("other.md", "x");

    let err = fake
        .repository()
        .fetch_last_modified(PATH)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_overwrite_with_current_revision() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "before");
    let repo = fake.repository();

    let file = repo.fetch_file(PATH).await.unwrap();
    let revision = repo
        .overwrite_file(PATH, "after", &file.revision, "edit notes")
        .await
        .unwrap();

    assert_eq!(fake.content(PATH).as_deref(), Some("after"));
    assert_eq!(Some(revision.as_str().to_string()), fake.sha(PATH));
    assert_ne!(revision, file.revision);

    let commits = fake.commits();
    let last = commits.last().unwrap();
    assert_eq!(last.message, "edit notes");
    assert_eq!(last.branch, None);
}

#[tokio::test]
async fn test_overwrite_with_stale_revision_conflicts() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "base");
    let repo = fake.repository();

    let file = repo.fetch_file(PATH).await.unwrap();
    fake.put_file(PATH, "someone else was faster");

    let err = repo
        .overwrite_file(PATH, "mine", &file.revision, "edit")
        .await
        .unwrap_err();
    assert!(err.is_conflict(), "got {err:?}");
    assert_eq!(fake.content(PATH).as_deref(), Some("someone else was faster"));
}

/// Two clients read the same revision; only the first write lands.
#[tokio::test]
async fn test_concurrent_clients_one_conflicts() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "base");
    let a = fake.repository();
    let b = fake.repository();

    let fa = a.fetch_file(PATH).await.unwrap();
    let fb = b.fetch_file(PATH).await.unwrap();
    assert_eq!(fa.revision, fb.revision);

    a.overwrite_file(PATH, "from a", &fa.revision, "a")
        .await
        .unwrap();
    let err = b
        .overwrite_file(PATH, "from b", &fb.revision, "b")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(fake.content(PATH).as_deref(), Some("from a"));
}

#[tokio::test]
async fn test_update_file_reads_fresh_revision() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "v1");
    let repo = fake.repository();

    update_file(&repo, PATH, "v2", "first").await.unwrap();
    fake.put_file(PATH, "external");
    update_file(&repo, PATH, "v3", "second").await.unwrap();

    assert_eq!(fake.content(PATH).as_deref(), Some("v3"));
}

#[tokio::test]
async fn test_branch_is_sent_with_writes() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "x");

    let mut config = fake.config();
    config.branch = Some("drafts".to_string());
    let repo = GithubRepository::new(config).unwrap();

    update_file(&repo, PATH, "y", "on drafts").await.unwrap();
    let commits = fake.commits();
    assert_eq!(commits.last().unwrap().branch.as_deref(), Some("drafts"));
}

#[tokio::test]
async fn test_bad_token_is_auth_error() {
    let fake = FakeGithub::start().await;
    fake.put_file(PATH, "x");

    let mut config = fake.config();
    config.token = "ghp_wrong".to_string();
    let repo = GithubRepository::new(config).unwrap();

    let err = repo.fetch_file(PATH).await.unwrap_err();
    match err {
        RemoteError::Auth { message } => assert_eq!(message, "Bad credentials"),
        other => panic!("expected auth error, got {other:?}"),
    }

    let err = repo
        .overwrite_file(PATH, "y", &RevisionHash::new("0"), "m")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Auth { .. }));
    assert_eq!(fake.content(PATH).as_deref(), Some("x"));
}

#[tokio::test]
async fn test_missing_file_and_repo_are_not_found() {
    let fake = FakeGithub::start().await;

    let err = fake.repository().fetch_file(PATH).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound { .. }));

    let mut config = fake.config();
    config.repo = "octo/elsewhere".to_string();
    let err = GithubRepository::new(config)
        .unwrap()
        .fetch_file(PATH)
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::NotFound { .. }));
}

#[tokio::test]
async fn test_unreachable_api_is_http_error() {
    // Bind and drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = GithubConfig::new("t", "octo/notes");
    config.api_url = format!("http://{addr}");
    let repo = GithubRepository::new(config).unwrap();

    let err = repo.fetch_file(PATH).await.unwrap_err();
    assert!(matches!(err, RemoteError::Http(_)), "got {err:?}");
}

//! [`FileRepository`] over the GitHub REST API.
//!
//! Uses three endpoints:
//!
//! - `GET /repos/{owner}/{repo}/contents/{path}`: content + blob sha
//! - `GET /repos/{owner}/{repo}/commits?path={path}&per_page=1`: last change
//! - `PUT /repos/{owner}/{repo}/contents/{path}`: conditional overwrite
//!
//! The blob `sha` is the revision hash. GitHub answers a `PUT` carrying an
//! outdated `sha` with `409 Conflict`.

use std::fmt;
use std::time::Duration;

use gitpad_types::{RemoteFile, RevisionHash};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, info};

use crate::encoding::{decode_content, encode_content};
use crate::error::RemoteError;
use crate::traits::FileRepository;

/// Default GitHub API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned in every request.
const API_VERSION: &str = "2022-11-28";

/// Connection settings for [`GithubRepository`].
#[derive(Clone)]
pub struct GithubConfig {
    /// API base URL (overridable for GitHub Enterprise or tests).
    pub api_url: String,
    /// Bearer token. Never logged.
    pub token: String,
    /// Repository as `owner/name`.
    pub repo: String,
    /// Branch to read from and commit to. `None` means the default branch.
    pub branch: Option<String>,
    /// `User-Agent` header value (GitHub rejects requests without one).
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl GithubConfig {
    /// Settings for `repo` with default API URL, branch and timeout.
    pub fn new(token: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
            repo: repo.into(),
            branch: None,
            user_agent: concat!("gitpad/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// GitHub-backed [`FileRepository`].
pub struct GithubRepository {
    config: GithubConfig,
    base: Url,
    owner: String,
    name: String,
    http_client: reqwest::Client,
}

impl GithubRepository {
    /// Build a client for the configured repository.
    pub fn new(config: GithubConfig) -> Result<Self, RemoteError> {
        let base = Url::parse(&config.api_url).map_err(|_| RemoteError::InvalidUrl {
            url: config.api_url.clone(),
        })?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl {
                url: config.api_url.clone(),
            });
        }

        let (owner, name) = parse_repo(&config.repo)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            base,
            owner: owner.to_string(),
            name: name.to_string(),
            config,
            http_client,
        })
    }

    /// Build `{api}/repos/{owner}/{name}/{tail...}/{path...}`.
    fn endpoint(&self, tail: &str, path: &str) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| RemoteError::InvalidUrl {
                url: self.config.api_url.clone(),
            })?;
            segments
                .pop_if_empty()
                .extend(["repos", self.owner.as_str(), self.name.as_str(), tail]);
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.config.token))
            .header(USER_AGENT, &self.config.user_agent)
    }
}

// -----------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------

/// Response body of `GET /contents/{path}` for a file.
#[derive(Deserialize)]
struct ContentsResponse {
    path: String,
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// Request body of `PUT /contents/{path}`.
#[derive(Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// Response body of `PUT /contents/{path}`.
#[derive(Deserialize)]
struct UpdateResponse {
    content: UpdatedContent,
}

#[derive(Deserialize)]
struct UpdatedContent {
    sha: String,
}

/// One entry of `GET /commits`.
#[derive(Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
    author: Option<Signature>,
}

#[derive(Deserialize)]
struct Signature {
    date: String,
}

/// Error body returned by the API.
#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

// -----------------------------------------------------------------------
// FileRepository
// -----------------------------------------------------------------------

#[async_trait::async_trait]
impl FileRepository for GithubRepository {
    async fn fetch_file(&self, path: &str) -> Result<RemoteFile, RemoteError> {
        let url = self.endpoint("contents", path)?;
        let mut request = self.authorized(self.http_client.get(url));
        if let Some(branch) = &self.config.branch {
            request = request.query(&[("ref", branch.as_str())]);
        }

        let response = check_status(request.send().await?).await?;
        let payload = response.bytes().await?;
        let body: ContentsResponse = serde_json::from_slice(&payload)?;

        if body.encoding != "base64" {
            return Err(RemoteError::Decode {
                message: format!("unsupported content encoding {:?}", body.encoding),
            });
        }

        let content = decode_content(&body.content)?;
        debug!(path = %body.path, sha = %body.sha, size = content.len(), "fetched file");

        Ok(RemoteFile {
            path: body.path,
            content,
            revision: RevisionHash::new(body.sha),
        })
    }

    async fn fetch_last_modified(&self, path: &str) -> Result<OffsetDateTime, RemoteError> {
        let url = self.endpoint("commits", "")?;
        let mut query = vec![("path", path), ("per_page", "1")];
        if let Some(branch) = &self.config.branch {
            query.push(("sha", branch.as_str()));
        }
        let request = self.authorized(self.http_client.get(url)).query(&query);

        let response = check_status(request.send().await?).await?;
        let payload = response.bytes().await?;
        let commits: Vec<CommitEntry> = serde_json::from_slice(&payload)?;

        let newest = commits.into_iter().next().ok_or_else(|| RemoteError::NotFound {
            message: format!("no commits touch {path}"),
        })?;
        let signature = newest
            .commit
            .committer
            .or(newest.commit.author)
            .ok_or_else(|| RemoteError::Decode {
                message: "commit has no committer or author date".to_string(),
            })?;

        Ok(OffsetDateTime::parse(&signature.date, &Rfc3339)?)
    }

    async fn overwrite_file(
        &self,
        path: &str,
        content: &str,
        revision: &RevisionHash,
        message: &str,
    ) -> Result<RevisionHash, RemoteError> {
        let url = self.endpoint("contents", path)?;
        let body = UpdateRequest {
            message,
            content: encode_content(content),
            sha: revision.as_str(),
            branch: self.config.branch.as_deref(),
        };
        let request = self.authorized(self.http_client.put(url)).json(&body);

        let response = check_status(request.send().await?).await?;
        let payload = response.bytes().await?;
        let updated: UpdateResponse = serde_json::from_slice(&payload)?;

        info!(
            path,
            repo = %self.config.repo,
            old = %revision,
            new = %updated.content.sha,
            "file_overwritten"
        );
        Ok(RevisionHash::new(updated.content.sha))
    }
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

/// Split `owner/name`.
fn parse_repo(repo: &str) -> Result<(&str, &str), RemoteError> {
    match repo.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((owner, name))
        }
        _ => Err(RemoteError::InvalidUrl {
            url: repo.to_string(),
        }),
    }
}

/// Turn a non-success response into the matching [`RemoteError`].
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Auth { message },
        StatusCode::NOT_FOUND => RemoteError::NotFound { message },
        StatusCode::CONFLICT => RemoteError::Conflict { message },
        _ => RemoteError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

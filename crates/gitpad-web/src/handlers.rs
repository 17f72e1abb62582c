//! Request handlers.
//!
//! Edits follow the read-then-write protocol of
//! [`update_file`](gitpad_remote::update_file): a fresh revision is fetched
//! for every save and handed back with the write. The lock is checked before
//! anything touches the remote.

use std::str::FromStr;

use axum::Form;
use axum::extract::State;
use axum::extract::rejection::FormRejection;
use axum::response::Html;
use gitpad_remote::update_file;
use gitpad_types::AuditKind;
use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::error::WebError;
use crate::html::{self, AdminView, EditorView};
use crate::{AppState, CLEAR_COMMIT_MESSAGE};

/// Number of audit records shown on the admin panel.
const ADMIN_RECENT_RECORDS: usize = 20;

// -----------------------------------------------------------------------
// GET /: editor
// -----------------------------------------------------------------------

pub(crate) async fn editor(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let file = state
        .repo
        .fetch_file(&state.file_path)
        .await
        .map_err(WebError::remote("Failed to load file"))?;

    let last_modified = match state.repo.fetch_last_modified(&state.file_path).await {
        Ok(at) => Some(at),
        Err(e) => {
            warn!(%e, "failed to fetch last modification time");
            None
        }
    };

    Ok(Html(html::editor_page(&EditorView {
        path: &file.path,
        content: &file.content,
        last_modified,
        now: OffsetDateTime::now_utc(),
        locked: state.lock.is_locked(),
        notice: None,
    })))
}

// -----------------------------------------------------------------------
// POST /update: save content
// -----------------------------------------------------------------------

/// Form body of `POST /update`.
#[derive(Deserialize)]
pub(crate) struct UpdateForm {
    content: Option<String>,
}

pub(crate) async fn update(
    State(state): State<AppState>,
    form: Result<Form<UpdateForm>, FormRejection>,
) -> Result<Html<String>, WebError> {
    if state.lock.is_locked() {
        return Err(WebError::Locked);
    }

    let Form(form) = form.map_err(|rejection| WebError::BadRequest {
        message: rejection.body_text(),
    })?;
    let content = form.content.ok_or_else(|| WebError::BadRequest {
        message: "missing form field `content`".to_string(),
    })?;

    let revision = update_file(
        state.repo.as_ref(),
        &state.file_path,
        &content,
        &state.commit_message,
    )
    .await
    .map_err(WebError::remote("Update failed"))?;

    info!(path = %state.file_path, bytes = content.len(), %revision, "file_updated");
    state.audit.append(
        AuditKind::Edit,
        gitpad_audit::detail([
            ("path", json!(&*state.file_path)),
            ("bytes", json!(content.len())),
            ("revision", json!(revision.as_str())),
        ]),
    );

    let now = OffsetDateTime::now_utc();
    Ok(Html(html::editor_page(&EditorView {
        path: &state.file_path,
        content: &content,
        last_modified: Some(now),
        now,
        locked: state.lock.is_locked(),
        notice: Some("Saved."),
    })))
}

// -----------------------------------------------------------------------
// GET /admin: admin panel
// -----------------------------------------------------------------------

pub(crate) async fn admin_page(State(state): State<AppState>) -> Html<String> {
    render_admin(&state, None).await
}

async fn render_admin(state: &AppState, notice: Option<&str>) -> Html<String> {
    let (records, records_unavailable) = match state.audit.recent(ADMIN_RECENT_RECORDS).await {
        Ok(records) => (records, false),
        Err(e) => {
            warn!(%e, "failed to read audit log");
            (Vec::new(), true)
        }
    };

    Html(html::admin_page(&AdminView {
        lock: state.lock.current(),
        records: &records,
        records_unavailable,
        notice,
    }))
}

// -----------------------------------------------------------------------
// POST /admin: admin actions
// -----------------------------------------------------------------------

/// Form body of `POST /admin`.
#[derive(Deserialize)]
pub(crate) struct AdminForm {
    #[serde(default)]
    password: String,
    #[serde(default)]
    action: String,
}

/// Actions available from the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdminAction {
    Lock,
    Unlock,
    Clear,
}

impl AdminAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Clear => "clear",
        }
    }
}

impl FromStr for AdminAction {
    type Err = WebError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lock" => Ok(Self::Lock),
            "unlock" => Ok(Self::Unlock),
            "clear" => Ok(Self::Clear),
            other => Err(WebError::BadRequest {
                message: format!("unknown admin action {other:?}"),
            }),
        }
    }
}

pub(crate) async fn admin_action(
    State(state): State<AppState>,
    Form(form): Form<AdminForm>,
) -> Result<Html<String>, WebError> {
    if !state.admin_password_matches(&form.password) {
        warn!("admin action with invalid password");
        return Err(WebError::Unauthorized);
    }

    let action: AdminAction = form.action.parse()?;

    let notice = match action {
        AdminAction::Lock | AdminAction::Unlock => {
            let change = state.lock.set_locked(action == AdminAction::Lock).await?;
            state.audit.append(
                AuditKind::Admin,
                gitpad_audit::detail([
                    ("action", json!(action.as_str())),
                    ("durable", json!(change.durable)),
                ]),
            );
            match (action, change.durable) {
                (AdminAction::Lock, true) => "Editing locked.",
                (AdminAction::Lock, false) => {
                    "Editing locked until restart (document store unavailable)."
                }
                (_, true) => "Editing unlocked.",
                (_, false) => "Editing unlocked until restart (document store unavailable).",
            }
        }
        AdminAction::Clear => {
            if state.lock.is_locked() {
                return Err(WebError::Locked);
            }
            let revision = update_file(
                state.repo.as_ref(),
                &state.file_path,
                "",
                CLEAR_COMMIT_MESSAGE,
            )
            .await
            .map_err(WebError::remote("Clear failed"))?;

            info!(path = %state.file_path, %revision, "file_cleared");
            state.audit.append(
                AuditKind::Admin,
                gitpad_audit::detail([
                    ("action", json!(action.as_str())),
                    ("path", json!(&*state.file_path)),
                    ("revision", json!(revision.as_str())),
                ]),
            );
            "File cleared."
        }
    };

    Ok(render_admin(&state, Some(notice)).await)
}

// -----------------------------------------------------------------------
// GET /health
// -----------------------------------------------------------------------

pub(crate) async fn health() -> &'static str {
    "ok"
}

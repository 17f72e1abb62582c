//! HTML views, rendered as plain strings.
//!
//! Every interpolated value goes through [`escape`].

use std::fmt::Write as _;

use gitpad_types::{AuditRecord, LockState};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

const STYLE: &str = "font-family: monospace; padding: 2rem; max-width: 60rem;";

/// Escape text for use in element content and quoted attributes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Human-readable age: `"42 seconds ago"`, `"3 minutes ago"`, ...
pub(crate) fn format_age(elapsed: Duration) -> String {
    let secs = elapsed.whole_seconds().max(0);
    let (n, unit) = match secs {
        0..60 => (secs, "second"),
        60..3_600 => (secs / 60, "minute"),
        3_600..86_400 => (secs / 3_600, "hour"),
        _ => (secs / 86_400, "day"),
    };
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

fn format_time(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_else(|_| at.to_string())
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body style=\"{STYLE}\">\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

fn notice_block(notice: Option<&str>) -> String {
    notice
        .map(|n| format!("<p class=\"notice\"><strong>{}</strong></p>\n", escape(n)))
        .unwrap_or_default()
}

// -----------------------------------------------------------------------
// Editor
// -----------------------------------------------------------------------

/// Data for the editor view.
pub(crate) struct EditorView<'a> {
    pub path: &'a str,
    pub content: &'a str,
    pub last_modified: Option<OffsetDateTime>,
    pub now: OffsetDateTime,
    pub locked: bool,
    pub notice: Option<&'a str>,
}

pub(crate) fn editor_page(view: &EditorView<'_>) -> String {
    let updated = view
        .last_modified
        .map(|at| format_age(view.now - at))
        .unwrap_or_else(|| "N/A".to_string());

    let mut body = String::new();
    body.push_str("<h2>File editor</h2>\n");
    let _ = writeln!(
        body,
        "<p><strong>File:</strong> <code>{}</code></p>",
        escape(view.path)
    );
    let _ = writeln!(
        body,
        "<p><strong>Last updated:</strong> <span class=\"updated\">{}</span></p>",
        escape(&updated)
    );
    body.push_str(&notice_block(view.notice));

    // Browsers drop a newline directly after `<textarea>`.
    if view.locked {
        body.push_str(
            "<p class=\"locked\"><strong>Editing is locked by an administrator.</strong></p>\n",
        );
        let _ = writeln!(
            body,
            "<textarea name=\"content\" readonly style=\"width:100%;height:300px;\">\n{}</textarea>",
            escape(view.content)
        );
    } else {
        body.push_str("<form method=\"POST\" action=\"/update\">\n");
        let _ = writeln!(
            body,
            "<textarea name=\"content\" style=\"width:100%;height:300px;\">\n{}</textarea><br><br>",
            escape(view.content)
        );
        body.push_str("<button type=\"submit\">Save</button>\n</form>\n");
    }
    body.push_str("<p><a href=\"/admin\">Admin</a></p>\n");

    page("File editor", &body)
}

// -----------------------------------------------------------------------
// Admin panel
// -----------------------------------------------------------------------

/// Data for the admin view.
pub(crate) struct AdminView<'a> {
    pub lock: LockState,
    pub records: &'a [AuditRecord],
    pub records_unavailable: bool,
    pub notice: Option<&'a str>,
}

pub(crate) fn admin_page(view: &AdminView<'_>) -> String {
    let mut body = String::new();
    body.push_str("<h2>Admin panel</h2>\n");
    body.push_str(&notice_block(view.notice));

    let state = if view.lock.locked { "LOCKED" } else { "UNLOCKED" };
    let _ = write!(
        body,
        "<p><strong>Editing:</strong> <span class=\"lock-state\">{state}</span>"
    );
    if view.lock.recorded_at != OffsetDateTime::UNIX_EPOCH {
        let _ = write!(body, " since {}", escape(&format_time(view.lock.recorded_at)));
    }
    body.push_str("</p>\n");

    body.push_str(concat!(
        "<form method=\"POST\" action=\"/admin\">\n",
        "<label>Password <input type=\"password\" name=\"password\"></label>\n",
        "<select name=\"action\">\n",
        "<option value=\"lock\">Lock editing</option>\n",
        "<option value=\"unlock\">Unlock editing</option>\n",
        "<option value=\"clear\">Clear file</option>\n",
        "</select>\n",
        "<button type=\"submit\">Apply</button>\n",
        "</form>\n",
    ));

    body.push_str("<h3>Recent activity</h3>\n");
    if view.records_unavailable {
        body.push_str("<p>Audit log unavailable.</p>\n");
    } else if view.records.is_empty() {
        body.push_str("<p>No activity recorded.</p>\n");
    } else {
        body.push_str("<ul class=\"audit\">\n");
        for record in view.records {
            let detail = serde_json::to_string(&record.detail).unwrap_or_default();
            let _ = writeln!(
                body,
                "<li><code>{}</code> {} {}</li>",
                escape(&format_time(record.recorded_at)),
                record.kind,
                escape(&detail)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("<p><a href=\"/\">Back to editor</a></p>\n");

    page("Admin panel", &body)
}

// -----------------------------------------------------------------------
// Errors
// -----------------------------------------------------------------------

pub(crate) fn error_page(title: &str, message: &str, hint: Option<&str>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h2>{}</h2>", escape(title));
    let _ = writeln!(body, "<p class=\"error\">{}</p>", escape(message));
    if let Some(hint) = hint {
        let _ = writeln!(body, "<p>{}</p>", escape(hint));
    }
    body.push_str("<p><a href=\"/\">Back to editor</a></p>\n");
    page(title, &body)
}

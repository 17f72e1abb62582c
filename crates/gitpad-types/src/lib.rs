//! Shared types for gitpad.
//!
//! This crate defines the data model used across the workspace:
//! the remote file ([`RemoteFile`], [`RevisionHash`]), the admin lock
//! ([`LockState`]), audit entries ([`AuditRecord`], [`AuditKind`]) and the
//! persisted form of both in the document store ([`Document`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ---------------------------------------------------------------------------
// Remote file
// ---------------------------------------------------------------------------

/// Opaque identifier of one version of a remote file.
///
/// The hosted API hands one out on every read and requires it back on every
/// write. A write carrying an outdated hash is rejected remotely.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionHash(String);

impl RevisionHash {
    /// Wrap a raw revision string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw revision string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RevisionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionHash({})", self.0)
    }
}

/// A single file in the remote repository, as last read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path of the file inside the repository.
    pub path: String,
    /// Decoded UTF-8 content.
    pub content: String,
    /// Revision the content was read at.
    pub revision: RevisionHash,
}

// ---------------------------------------------------------------------------
// Lock state
// ---------------------------------------------------------------------------

/// The admin lock: when `locked`, public edits are refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockState {
    /// Whether editing is disabled.
    pub locked: bool,
    /// When this state was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl LockState {
    /// A state recorded now.
    pub fn now(locked: bool) -> Self {
        Self {
            locked,
            recorded_at: OffsetDateTime::now_utc(),
        }
    }
}

impl Default for LockState {
    /// Unlocked, recorded at the Unix epoch (i.e. never recorded).
    fn default() -> Self {
        Self {
            locked: false,
            recorded_at: OffsetDateTime::UNIX_EPOCH,
        }
    }
}

// ---------------------------------------------------------------------------
// Audit records
// ---------------------------------------------------------------------------

/// What kind of action an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditKind {
    /// Content saved through the editor.
    Edit,
    /// Lock, unlock or clear performed from the admin panel.
    Admin,
}

impl AuditKind {
    /// The document `type` value this kind is stored under.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-form detail attached to an audit record.
pub type AuditDetail = BTreeMap<String, serde_json::Value>;

/// An immutable entry describing a completed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Edit or admin.
    pub kind: AuditKind,
    /// Action-specific fields.
    pub detail: AuditDetail,
    /// When the action completed.
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl AuditRecord {
    /// A record stamped now.
    pub fn now(kind: AuditKind, detail: AuditDetail) -> Self {
        Self {
            kind,
            detail,
            recorded_at: OffsetDateTime::now_utc(),
        }
    }
}

// ---------------------------------------------------------------------------
// Persisted documents
// ---------------------------------------------------------------------------

/// Discriminator of a [`Document`], stored in its `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    /// `"lock-state"`
    LockState,
    /// `"edit"`
    Edit,
    /// `"admin"`
    Admin,
}

impl DocumentType {
    /// Both audit document types.
    pub const AUDIT: [DocumentType; 2] = [DocumentType::Edit, DocumentType::Admin];

    /// The wire value of the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LockState => "lock-state",
            Self::Edit => "edit",
            Self::Admin => "admin",
        }
    }
}

impl From<AuditKind> for DocumentType {
    fn from(kind: AuditKind) -> Self {
        match kind {
            AuditKind::Edit => Self::Edit,
            AuditKind::Admin => Self::Admin,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the document store's single collection.
///
/// Serialized as a flat JSON object whose `type` field tells lock-state
/// records and audit records apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Document {
    /// A lock state change.
    #[serde(rename = "lock-state")]
    LockState {
        /// New value of the lock.
        locked: bool,
        /// When the change was recorded.
        #[serde(rename = "recordedAt", with = "time::serde::rfc3339")]
        recorded_at: OffsetDateTime,
    },
    /// An editor save.
    #[serde(rename = "edit")]
    Edit {
        /// Action-specific fields.
        #[serde(default)]
        detail: AuditDetail,
        /// When the action completed.
        #[serde(rename = "recordedAt", with = "time::serde::rfc3339")]
        recorded_at: OffsetDateTime,
    },
    /// An admin action.
    #[serde(rename = "admin")]
    Admin {
        /// Action-specific fields.
        #[serde(default)]
        detail: AuditDetail,
        /// When the action completed.
        #[serde(rename = "recordedAt", with = "time::serde::rfc3339")]
        recorded_at: OffsetDateTime,
    },
}

impl Document {
    /// The `type` discriminator of this document.
    pub fn doc_type(&self) -> DocumentType {
        match self {
            Self::LockState { .. } => DocumentType::LockState,
            Self::Edit { .. } => DocumentType::Edit,
            Self::Admin { .. } => DocumentType::Admin,
        }
    }

    /// Interpret this document as a lock state, if it is one.
    pub fn into_lock_state(self) -> Option<LockState> {
        match self {
            Self::LockState {
                locked,
                recorded_at,
            } => Some(LockState {
                locked,
                recorded_at,
            }),
            _ => None,
        }
    }

    /// Interpret this document as an audit record, if it is one.
    pub fn into_audit_record(self) -> Option<AuditRecord> {
        match self {
            Self::Edit {
                detail,
                recorded_at,
            } => Some(AuditRecord {
                kind: AuditKind::Edit,
                detail,
                recorded_at,
            }),
            Self::Admin {
                detail,
                recorded_at,
            } => Some(AuditRecord {
                kind: AuditKind::Admin,
                detail,
                recorded_at,
            }),
            Self::LockState { .. } => None,
        }
    }
}

impl From<LockState> for Document {
    fn from(state: LockState) -> Self {
        Self::LockState {
            locked: state.locked,
            recorded_at: state.recorded_at,
        }
    }
}

impl From<AuditRecord> for Document {
    fn from(record: AuditRecord) -> Self {
        match record.kind {
            AuditKind::Edit => Self::Edit {
                detail: record.detail,
                recorded_at: record.recorded_at,
            },
            AuditKind::Admin => Self::Admin {
                detail: record.detail,
                recorded_at: record.recorded_at,
            },
        }
    }
}

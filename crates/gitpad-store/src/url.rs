//! Store connection strings.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::error::StoreError;
use crate::fjall_store::FjallStore;
use crate::memory_store::MemoryStore;
use crate::traits::DocumentStore;

/// Where the document store lives.
///
/// Formats:
/// - `memory:`: in-process, lost on exit
/// - `fjall:<path>`: Fjall database at `<path>`
/// - `<path>`: shorthand for `fjall:<path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// In-process [`MemoryStore`].
    Memory,
    /// On-disk [`FjallStore`].
    Fjall(PathBuf),
}

impl StoreUrl {
    /// Open the store this URL points at.
    pub fn connect(&self) -> Result<Arc<dyn DocumentStore>, StoreError> {
        match self {
            Self::Memory => {
                info!("using in-memory document store");
                Ok(Arc::new(MemoryStore::new()))
            }
            Self::Fjall(path) => {
                info!(path = %path.display(), "opening fjall document store");
                std::fs::create_dir_all(path)?;
                Ok(Arc::new(FjallStore::open(path)?))
            }
        }
    }
}

impl FromStr for StoreUrl {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StoreError::InvalidUrl { url: s.to_string() });
        }
        if s == "memory:" || s == "memory://" {
            return Ok(Self::Memory);
        }
        let path = s
            .strip_prefix("fjall://")
            .or_else(|| s.strip_prefix("fjall:"))
            .unwrap_or(s);
        if path.is_empty() {
            return Err(StoreError::InvalidUrl { url: s.to_string() });
        }
        Ok(Self::Fjall(PathBuf::from(path)))
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory:"),
            Self::Fjall(path) => write!(f, "fjall:{}", path.display()),
        }
    }
}

//! Remote file client.
//!
//! [`FileRepository`] is the three-operation interface the web layer needs
//! from the hosted repository: read a file with its revision, read when it
//! was last changed, and overwrite it conditionally on the revision.
//!
//! - [`GithubRepository`] talks to the GitHub contents and commits APIs.
//! - [`MemoryRepository`] keeps files in process and versions every write,
//!   rejecting stale revisions the same way the hosted API does.
//!
//! Conflict detection is entirely the remote's job. Nothing here retries or
//! merges; a stale revision surfaces as [`RemoteError::Conflict`].

mod encoding;
mod error;
mod github;
mod memory;
mod traits;

pub use encoding::{decode_content, encode_content};
pub use error::RemoteError;
pub use github::{DEFAULT_API_URL, GithubConfig, GithubRepository};
pub use memory::MemoryRepository;
pub use traits::{FileRepository, update_file};

//! Container backends.
//!
//! Every physical container kind implements [`Detail`], the capability set the
//! [`Archive`](crate::Archive) façade forwards to:
//!
//! | Backend | Container | Direct I/O | Schemas |
//! |---------|-----------|------------|---------|
//! | [`Directory`] | plain directory | yes | `file` |
//! | [`Tarball`] | uncompressed tar | no | none |
//! | [`Zip`] | zip (feature `zip`) | no | none |
//! | [`Http`] | HTTP(S) base URL (feature `http`) | no | `http`, `https` |
//!
//! New container kinds only need a [`Detail`] implementation and a type token
//! to be dispatched by the façade.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::stat::FileStat;
use crate::stream::{FilterInit, MemberStream};
use crate::{FileHint, Result};

mod directory;
#[cfg(feature = "http")]
mod http;
pub mod tar_reader;
mod tarball;
#[cfg(feature = "zip")]
mod zip;

pub use directory::Directory;
#[cfg(feature = "http")]
pub use http::Http;
pub use tarball::Tarball;
#[cfg(feature = "zip")]
pub use self::zip::Zip;

/// The backend variants known to the façade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BackendKind {
    /// A plain directory.
    Directory,
    /// A tar archive.
    Tarball,
    /// A zip archive.
    Zip,
    /// An HTTP(S) resource tree.
    Http,
}

impl BackendKind {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Directory => "directory",
            BackendKind::Tarball => "tarball",
            BackendKind::Zip => "zip",
            BackendKind::Http => "http",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The contract every container backend satisfies.
///
/// Member paths are `/`-separated and relative to the container's logical
/// root, i.e. after any prefix chosen by a hint has been stripped.
///
/// Backends are immutable after construction except through
/// [`apply_hint`](Self::apply_hint), so every `&self` method may be called
/// concurrently.
pub trait Detail: Send + Sync + fmt::Debug {
    /// Which variant this is.
    fn kind(&self) -> BackendKind;

    /// The container's own path (or URL).
    fn path(&self) -> &Path;

    /// The logical root that relative member paths resolve against.
    fn root(&self) -> PathBuf {
        self.path().to_path_buf()
    }

    /// Opens a member for reading.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if the member does not
    /// exist, or an I/O error if the container cannot be read.
    fn open_member(&self, member: &str) -> Result<MemberStream>;

    /// Opens a member and passes it through `filter` before handing it back.
    fn open_member_filtered(&self, member: &str, filter: FilterInit) -> Result<MemberStream> {
        self.open_member(member)?.filtered(filter)
    }

    /// The member's exact size when it is known without reading any data.
    fn member_size(&self, _member: &str) -> Option<u64> {
        None
    }

    /// Returns true if the member exists. Never fails.
    fn exists(&self, member: &str) -> bool;

    /// Lists member paths.
    fn list(&self) -> Result<Vec<String>>;

    /// Returns the first member, in listing order, whose file name equals
    /// `filename`.
    fn find_file(&self, filename: &str) -> Option<String>;

    /// Re-runs logical root selection with a new hint.
    ///
    /// On failure the previous root stays in effect.
    fn apply_hint(&mut self, hint: &FileHint) -> Result<()>;

    /// The container path that matched the hint, if a hint was applied.
    fn used_hint(&self) -> Option<String>;

    /// The snapshot taken when the container was opened, for backends backed
    /// by a local path.
    fn snapshot(&self) -> Option<&FileStat> {
        None
    }

    /// Returns true if the container changed on disk since it was opened.
    fn changed(&self) -> bool {
        self.snapshot()
            .is_some_and(|snapshot| snapshot.changed(&FileStat::from_path(self.path())))
    }

    /// Returns true if paths embedding `schema` are understood by this
    /// backend.
    fn handles_schema(&self, _schema: &str) -> bool {
        false
    }

    /// Returns true if members can be read without an intermediate copy.
    fn directio(&self) -> bool {
        false
    }
}

//! Error types for archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening containers and reading their members, along
//! with a convenient [`Result<T>`] type alias.
//!
//! # Structural failures vs. negative lookups
//!
//! Only structural problems are errors: an undetectable container type, a
//! declared hint anchor that is missing, an unreadable container, or a member
//! that was explicitly requested but does not exist. Probing operations such
//! as [`Archive::exists`] and [`Archive::find_file`] report absence as
//! `false` / `None` instead.
//!
//! ```rust,no_run
//! use arcfs::{Archive, Error};
//!
//! fn open(path: &str) -> arcfs::Result<()> {
//!     match Archive::open(path) {
//!         Ok(archive) => {
//!             println!("{} members", archive.list()?.len());
//!             Ok(())
//!         }
//!         Err(Error::NotAnArchive { mime }) => {
//!             eprintln!("not an archive: {}", mime);
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! [`Archive::exists`]: crate::Archive::exists
//! [`Archive::find_file`]: crate::Archive::find_file

use std::io;
use std::path::PathBuf;

/// The main error type for archive operations.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Dispatch | [`NotAnArchive`][Self::NotAnArchive] | Unrecognized container type |
/// | Lookup | [`NotFound`][Self::NotFound], [`HintNotFound`][Self::HintNotFound] | Missing member or hint anchor |
/// | I/O | [`Io`][Self::Io], [`InvalidArchive`][Self::InvalidArchive] | Unreadable or corrupt container |
/// | Resources | [`ResourceLimitExceeded`][Self::ResourceLimitExceeded] | Configured size limit |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading the physical container.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The resolved type of the path matches no known backend.
    ///
    /// The `mime` field carries the detected (or explicitly supplied) type
    /// token, e.g. `text/plain`.
    #[error("Unsupported archive type <{mime}>")]
    NotAnArchive {
        /// The detected type token.
        mime: String,
    },

    /// A requested member is not present in the archive.
    #[error("File \"{member}\" not found in the archive at {}", archive.display())]
    NotFound {
        /// Path of the archive that was searched.
        archive: PathBuf,
        /// The requested member path.
        member: String,
    },

    /// A declared hint anchor is not present in the container.
    #[error("No \"{hint}\" found in the archive at {}", archive.display())]
    HintNotFound {
        /// Path of the archive that was searched.
        archive: PathBuf,
        /// The hint candidates, joined for display.
        hint: String,
    },

    /// The container could be read but its structure is invalid.
    #[error("Invalid archive at {}: {reason}", archive.display())]
    InvalidArchive {
        /// Path of the offending archive.
        archive: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// A configured resource limit was exceeded.
    ///
    /// Raised when a member is larger than
    /// [`OpenOptions::size_limit`](crate::OpenOptions::size_limit).
    #[error("Resource limit exceeded: {0}")]
    ResourceLimitExceeded(String),

    /// The backend cannot perform the requested operation.
    #[error("{operation} is not supported by the {backend} backend")]
    Unsupported {
        /// The operation name.
        operation: &'static str,
        /// The backend name.
        backend: &'static str,
    },

    /// A URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An HTTP request failed.
    #[cfg(feature = "http")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http")))]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Returns `true` if a member or a hint anchor could not be found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::HintNotFound { .. })
    }

    /// Returns `true` if the error stems from reading the physical container.
    pub fn is_io(&self) -> bool {
        match self {
            Error::Io(_) | Error::InvalidArchive { .. } => true,
            #[cfg(feature = "http")]
            Error::Http(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if the container type was not recognized.
    pub fn is_not_an_archive(&self) -> bool {
        matches!(self, Error::NotAnArchive { .. })
    }

    /// Returns the detected type token for [`Error::NotAnArchive`].
    pub fn mime(&self) -> Option<&str> {
        match self {
            Error::NotAnArchive { mime } => Some(mime),
            _ => None,
        }
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Converts an I/O error back into a crate error.
///
/// Readers report crate errors wrapped in [`io::Error::other`]; this
/// unwraps them so callers see e.g. [`Error::ResourceLimitExceeded`] rather
/// than an opaque I/O failure.
pub(crate) fn map_io_error(e: io::Error) -> Error {
    if !e.get_ref().is_some_and(|inner| inner.is::<Error>()) {
        return Error::Io(e);
    }
    let kind = e.kind();
    match e.into_inner().map(|inner| inner.downcast::<Error>()) {
        Some(Ok(err)) => *err,
        _ => Error::Io(kind.into()),
    }
}

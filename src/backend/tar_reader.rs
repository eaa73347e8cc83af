//! Tar member scanner.
//!
//! Walks the headers of an uncompressed tar archive once and records where
//! each regular file's data lives. Data blocks are skipped by seeking, so a
//! scan touches only the headers. Long names (GNU and PAX) are handled by the
//! `tar` crate.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tar::EntryType;

use crate::range::{ByteRange, SharedHandle};
use crate::safety::normalize_member_path;
use crate::{Error, Result};

/// One regular file inside a tar archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarMember {
    /// Normalized member path.
    pub path: String,
    /// Offset of the first data byte.
    pub start: u64,
    /// Offset one past the last data byte.
    pub end: u64,
}

/// The member list of a tar archive plus a shared handle to its bytes.
#[derive(Debug)]
pub struct TarReader {
    path: PathBuf,
    handle: SharedFile,
    members: Vec<TarMember>,
}

#[derive(Clone)]
struct SharedFile(Arc<File>);

impl std::fmt::Debug for SharedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedFile")
    }
}

impl TarReader {
    /// Opens `path` and scans its headers.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] if the file cannot be opened or read, and
    /// [`Error::InvalidArchive`] for malformed headers or a member whose data
    /// runs past the end of the file.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let members = scan(path, &file)?;

        if let Some(member) = members.iter().find(|m| m.end > file_len) {
            return Err(Error::InvalidArchive {
                archive: path.to_path_buf(),
                reason: format!(
                    "member \"{}\" ends at {} past end of file at {}",
                    member.path, member.end, file_len
                ),
            });
        }

        log::debug!("scanned {} tar members in {}", members.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            handle: SharedFile(Arc::new(file)),
            members,
        })
    }

    /// The archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Regular-file members in archive order.
    pub fn members(&self) -> &[TarMember] {
        &self.members
    }

    /// A new reference to the shared archive handle.
    pub fn handle(&self) -> SharedHandle {
        self.handle.0.clone()
    }

    /// `(path, range)` pairs for every member, in archive order.
    pub fn ranges(&self) -> Vec<(String, ByteRange)> {
        let handle = self.handle();
        self.members
            .iter()
            .map(|m| (m.path.clone(), ByteRange::new(handle.clone(), m.start, m.end)))
            .collect()
    }
}

fn scan(path: &Path, file: &File) -> Result<Vec<TarMember>> {
    let invalid = |e: io::Error| match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::Other | io::ErrorKind::UnexpectedEof => {
            Error::InvalidArchive {
                archive: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
        _ => Error::Io(e),
    };

    let mut archive = tar::Archive::new(file);
    let mut members = Vec::new();
    for entry in archive.entries_with_seek().map_err(invalid)? {
        let entry = entry.map_err(invalid)?;
        let entry_type = entry.header().entry_type();
        if !matches!(entry_type, EntryType::Regular | EntryType::Continuous) {
            if !entry_type.is_dir() {
                log::warn!(
                    "skipping tar member of type {:?} in {}",
                    entry_type,
                    path.display()
                );
            }
            continue;
        }

        let raw = entry.path().map_err(invalid)?;
        let Some(name) = raw.to_str() else {
            log::warn!(
                "skipping tar member with non-UTF-8 name {} in {}",
                raw.display(),
                path.display()
            );
            continue;
        };
        let Some(normalized) = normalize_member_path(name) else {
            log::warn!(
                "skipping tar member with unsafe name {:?} in {}",
                name,
                path.display()
            );
            continue;
        };

        let start = entry.raw_file_position();
        members.push(TarMember {
            path: normalized,
            start,
            end: start + entry.size(),
        });
    }
    Ok(members)
}

//! Change detection snapshot for the physical container.

use std::fs;
use std::path::Path;

use filetime::FileTime;

/// Existence, size and modification time of a path at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileStat {
    exists: bool,
    size: u64,
    mtime: Option<FileTime>,
}

impl FileStat {
    /// Takes a snapshot of `path`; a missing or unreadable path yields a
    /// snapshot with `exists() == false`.
    pub fn from_path(path: &Path) -> Self {
        match fs::metadata(path) {
            Ok(meta) => Self {
                exists: true,
                size: meta.len(),
                mtime: Some(FileTime::from_last_modification_time(&meta)),
            },
            Err(_) => Self::default(),
        }
    }

    /// Whether the path existed.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Size in bytes (0 when missing).
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time.
    pub fn mtime(&self) -> Option<FileTime> {
        self.mtime
    }

    /// Returns true if `current` differs from this snapshot.
    pub fn changed(&self, current: &FileStat) -> bool {
        self != current
    }
}

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use ::zip::result::ZipError;
use ::zip::{CompressionMethod, ZipArchive};

use super::{BackendKind, Detail};
use crate::index::MemberIndex;
use crate::range::{ByteRange, SharedHandle};
use crate::safety::normalize_member_path;
use crate::stat::FileStat;
use crate::stream::MemberStream;
use crate::{Error, FileHint, Result};

const INFLATE_PREALLOC_LIMIT: usize = 1 << 20;

/// Location of one zip member.
#[derive(Debug, Clone, Copy)]
struct ZipEntry {
    number: usize,
    stored: bool,
    data_start: u64,
    size: u64,
}

/// Backend for zip archives.
///
/// Stored members are read in place through positioned reads on a shared
/// handle. Compressed members are inflated into memory under a lock, since
/// the decoder needs exclusive use of the archive reader.
pub struct Zip {
    path: PathBuf,
    handle: SharedHandle,
    archive: Mutex<ZipArchive<File>>,
    entries: Vec<(String, ZipEntry)>,
    index: MemberIndex<ZipEntry>,
    stat: FileStat,
}

impl Zip {
    /// Opens and indexes the zip archive at `path`.
    pub fn open(path: &Path, hint: &FileHint) -> Result<Self> {
        let stat = FileStat::from_path(path);
        let mut archive =
            ZipArchive::new(File::open(path)?).map_err(|e| zip_error(path, e))?;
        let entries = scan(path, &mut archive)?;
        let index = MemberIndex::build(path, &entries, hint)?;

        // separate handle: positioned reads must not race the decoder's cursor
        let handle: SharedHandle = Arc::new(File::open(path)?);

        Ok(Self {
            path: path.to_path_buf(),
            handle,
            archive: Mutex::new(archive),
            entries,
            index,
            stat,
        })
    }

    fn inflate(&self, member: &str, entry: &ZipEntry) -> Result<MemberStream> {
        let mut archive = self.archive.lock().unwrap_or_else(PoisonError::into_inner);
        let file = archive
            .by_index(entry.number)
            .map_err(|e| zip_error(&self.path, e))?;

        // the declared size comes from the archive, so preallocate only a bounded amount
        let capacity = usize::try_from(entry.size).map_or(INFLATE_PREALLOC_LIMIT, |size| {
            size.min(INFLATE_PREALLOC_LIMIT)
        });
        let mut data = Vec::with_capacity(capacity);
        // one byte past the size, so the decoder reaches EOF and checks the CRC
        file.take(entry.size.saturating_add(1))
            .read_to_end(&mut data)?;
        if data.len() as u64 != entry.size {
            return Err(Error::InvalidArchive {
                archive: self.path.clone(),
                reason: format!(
                    "member \"{}\" inflated to {} bytes, expected {}",
                    member,
                    data.len(),
                    entry.size
                ),
            });
        }

        let size = entry.size;
        Ok(MemberStream::sized(member, Cursor::new(data), size))
    }
}

impl std::fmt::Debug for Zip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zip")
            .field("path", &self.path)
            .field("members", &self.index.len())
            .field("prefix", &self.index.prefix())
            .finish_non_exhaustive()
    }
}

impl Detail for Zip {
    fn kind(&self) -> BackendKind {
        BackendKind::Zip
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn root(&self) -> PathBuf {
        match self.index.prefix() {
            "" => self.path.clone(),
            prefix => self.path.join(prefix),
        }
    }

    fn open_member(&self, member: &str) -> Result<MemberStream> {
        let entry = *self.index.get(member)?;
        if entry.stored {
            let range = ByteRange::new(
                self.handle.clone(),
                entry.data_start,
                entry.data_start + entry.size,
            );
            Ok(MemberStream::from_range(member, &range))
        } else {
            self.inflate(member, &entry)
        }
    }

    fn member_size(&self, member: &str) -> Option<u64> {
        self.index.get(member).ok().map(|entry| entry.size)
    }

    fn exists(&self, member: &str) -> bool {
        self.index.contains(member)
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.index.list())
    }

    fn find_file(&self, filename: &str) -> Option<String> {
        self.index.find_file(filename)
    }

    fn apply_hint(&mut self, hint: &FileHint) -> Result<()> {
        self.index = MemberIndex::build(&self.path, &self.entries, hint)?;
        Ok(())
    }

    fn used_hint(&self) -> Option<String> {
        self.index.used_hint().map(str::to_string)
    }

    fn snapshot(&self) -> Option<&FileStat> {
        Some(&self.stat)
    }
}

fn scan(path: &Path, archive: &mut ZipArchive<File>) -> Result<Vec<(String, ZipEntry)>> {
    let mut entries = Vec::with_capacity(archive.len());
    for number in 0..archive.len() {
        let file = archive
            .by_index_raw(number)
            .map_err(|e| zip_error(path, e))?;
        if file.is_dir() {
            continue;
        }
        let Some(name) = normalize_member_path(file.name()) else {
            log::warn!(
                "skipping zip member with unsafe name {:?} in {}",
                file.name(),
                path.display()
            );
            continue;
        };
        entries.push((
            name,
            ZipEntry {
                number,
                stored: file.compression() == CompressionMethod::Stored,
                data_start: file.data_start(),
                size: file.size(),
            },
        ));
    }
    log::debug!("scanned {} zip members in {}", entries.len(), path.display());
    Ok(entries)
}

fn zip_error(path: &Path, e: ZipError) -> Error {
    match e {
        ZipError::Io(e) => Error::Io(e),
        other => Error::InvalidArchive {
            archive: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

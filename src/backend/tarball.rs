use std::path::{Path, PathBuf};

use super::tar_reader::TarReader;
use super::{BackendKind, Detail};
use crate::index::MemberIndex;
use crate::range::ByteRange;
use crate::stat::FileStat;
use crate::stream::MemberStream;
use crate::{FileHint, Result};

/// Backend for uncompressed tar archives.
///
/// The headers are scanned once at construction; members are then served as
/// [`SubStream`](crate::range::SubStream)s over one shared file handle, so
/// any number of members can be read at once.
#[derive(Debug)]
pub struct Tarball {
    reader: TarReader,
    /// Every member, kept for re-rooting.
    ranges: Vec<(String, ByteRange)>,
    index: MemberIndex<ByteRange>,
    stat: FileStat,
}

impl Tarball {
    /// Opens and indexes the tar archive at `path`.
    ///
    /// # Errors
    ///
    /// [`Error::HintNotFound`](crate::Error::HintNotFound) if `hint` is
    /// non-empty and matches no member, or an I/O error if the archive
    /// cannot be read.
    pub fn open(path: &Path, hint: &FileHint) -> Result<Self> {
        let stat = FileStat::from_path(path);
        let reader = TarReader::open(path)?;
        let ranges = reader.ranges();
        let index = MemberIndex::build(path, &ranges, hint)?;
        Ok(Self {
            reader,
            ranges,
            index,
            stat,
        })
    }

    /// The stripped prefix, empty at the archive root.
    pub fn prefix(&self) -> &str {
        self.index.prefix()
    }
}

impl Detail for Tarball {
    fn kind(&self) -> BackendKind {
        BackendKind::Tarball
    }

    fn path(&self) -> &Path {
        self.reader.path()
    }

    fn root(&self) -> PathBuf {
        match self.index.prefix() {
            "" => self.reader.path().to_path_buf(),
            prefix => self.reader.path().join(prefix),
        }
    }

    fn open_member(&self, member: &str) -> Result<MemberStream> {
        let range = self.index.get(member)?;
        Ok(MemberStream::from_range(member, range))
    }

    fn member_size(&self, member: &str) -> Option<u64> {
        self.index.get(member).ok().map(ByteRange::len)
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
        self.index = MemberIndex::build(self.reader.path(), &self.ranges, hint)?;
        Ok(())
    }

    fn used_hint(&self) -> Option<String> {
        self.index.used_hint().map(str::to_string)
    }

    fn snapshot(&self) -> Option<&FileStat> {
        Some(&self.stat)
    }
}

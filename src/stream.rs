//! Member streams and the whole-content read strategy.
//!
//! Every backend hands out members as a [`MemberStream`]. A stream knows the
//! member's path, optionally its exact size, and whether the underlying
//! reader can seek. [`MemberStream::read_all`] picks the cheapest way to load
//! the whole member based on that:
//!
//! 1. size known (tar and zip members): allocate exactly, read exactly;
//! 2. seekable (directory files): measure by seeking to the end and back;
//! 3. otherwise (HTTP bodies, filtered streams): copy into a growing buffer.
//!
//! All read errors surface immediately. A source that ends before its
//! declared size is an error, never a truncated result.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::map_io_error;
use crate::range::{ByteRange, SubStream};
use crate::safety::{LimitedReader, check_member_size};
use crate::{Error, Result};

/// A boxed sequential reader, the currency of filter chains.
pub type BoxedReader = Box<dyn Read + Send>;

/// A caller-supplied filter chain.
///
/// Receives the raw member stream and returns the stream to hand back, e.g.
/// the raw stream wrapped in a decompressor.
pub type FilterInit = Box<dyn FnOnce(BoxedReader) -> io::Result<BoxedReader> + Send>;

trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

enum Source {
    Seekable(Box<dyn ReadSeek>),
    Sequential(BoxedReader),
}

/// An open member of a container.
///
/// Implements [`Read`]; also implements [`Seek`] when
/// [`is_seekable`](Self::is_seekable) returns true. Closing is idempotent and
/// reads after [`close`](Self::close) fail.
pub struct MemberStream {
    path: String,
    size: Option<u64>,
    /// Bytes consumed from the start of the member.
    position: u64,
    source: Option<Source>,
}

impl MemberStream {
    /// Wraps a sequential reader whose exact size is known.
    pub fn sized<R>(path: impl Into<String>, reader: R, size: u64) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::with_source(path, Some(size), Source::Sequential(Box::new(reader)))
    }

    /// Wraps a seekable reader, with or without a known size.
    pub fn seekable<R>(path: impl Into<String>, reader: R, size: Option<u64>) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self::with_source(path, size, Source::Seekable(Box::new(reader)))
    }

    /// Wraps a sequential reader of unknown size.
    pub fn sequential<R>(path: impl Into<String>, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::with_source(path, None, Source::Sequential(Box::new(reader)))
    }

    /// Opens a seekable stream of known size over a byte range.
    pub fn from_range(path: impl Into<String>, range: &ByteRange) -> Self {
        let size = range.len();
        Self::seekable(path, SubStream::new(range.clone()), Some(size))
    }

    fn with_source(path: impl Into<String>, size: Option<u64>, source: Source) -> Self {
        Self {
            path: path.into(),
            size,
            position: 0,
            source: Some(source),
        }
    }

    /// The member path this stream was opened for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The exact member size, when known without reading.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Returns true if the stream supports [`Seek`].
    pub fn is_seekable(&self) -> bool {
        matches!(self.source, Some(Source::Seekable(_)))
    }

    /// Returns true once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    /// Releases the underlying reader. Calling it again does nothing.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            log::trace!("closed member stream {}", self.path);
        }
    }

    /// Reads the remaining content of the member into memory.
    ///
    /// # Errors
    ///
    /// Fails if the stream is closed, the underlying reader fails, or the
    /// reader ends before the known size is reached.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let remaining = match self.size {
            Some(size) => Some(size.saturating_sub(self.position)),
            None => match self.source_mut()? {
                Source::Seekable(reader) => {
                    let start = reader.stream_position()?;
                    let end = reader.seek(SeekFrom::End(0))?;
                    reader.seek(SeekFrom::Start(start))?;
                    Some(end.saturating_sub(start))
                }
                Source::Sequential(_) => None,
            },
        };

        let mut buf = Vec::new();
        match remaining {
            Some(len) => {
                let len = usize::try_from(len).map_err(|_| {
                    Error::ResourceLimitExceeded(format!(
                        "Member \"{}\" of {} bytes does not fit in memory",
                        self.path, len
                    ))
                })?;
                buf.resize(len, 0);
                self.read_exact(&mut buf).map_err(map_io_error)?;
            }
            None => {
                self.read_to_end(&mut buf).map_err(map_io_error)?;
            }
        }
        Ok(buf)
    }

    /// Copies the remaining content into `writer`, returning the byte count.
    pub fn copy_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<u64> {
        io::copy(self, writer).map_err(map_io_error)
    }

    /// Copies the remaining content into a file at `path`, creating or
    /// truncating it.
    pub fn copy_to_path(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        let copied = self.copy_to(&mut writer)?;
        writer.flush()?;
        Ok(copied)
    }

    /// Applies a filter chain, returning a sequential stream of unknown size.
    pub fn filtered(self, filter: FilterInit) -> Result<MemberStream> {
        let path = self.path.clone();
        let reader = filter(Box::new(self)).map_err(map_io_error)?;
        Ok(Self::with_source(path, None, Source::Sequential(reader)))
    }

    /// Enforces a per-member byte limit.
    ///
    /// Members of known size are checked right away; others are wrapped in a
    /// [`LimitedReader`] and fail once the limit is crossed.
    pub fn limited(self, limit: Option<u64>) -> Result<MemberStream> {
        let Some(limit) = limit else {
            return Ok(self);
        };
        if let Some(size) = self.size {
            check_member_size(&self.path, size, Some(limit))?;
            return Ok(self);
        }

        let path = self.path.clone();
        let reader = LimitedReader::new(self).max_bytes(limit);
        Ok(Self::with_source(path, None, Source::Sequential(Box::new(reader))))
    }

    fn source_mut(&mut self) -> io::Result<&mut Source> {
        match self.source.as_mut() {
            Some(source) => Ok(source),
            None => Err(io::Error::other(format!(
                "member stream {} is closed",
                self.path
            ))),
        }
    }
}

impl Read for MemberStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match self.source_mut()? {
            Source::Seekable(reader) => reader.read(buf)?,
            Source::Sequential(reader) => reader.read(buf)?,
        };
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for MemberStream {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let position = match self.source_mut()? {
            Source::Seekable(reader) => reader.seek(target)?,
            Source::Sequential(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "member stream is not seekable",
                ));
            }
        };
        self.position = position;
        Ok(position)
    }
}

impl fmt::Debug for MemberStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberStream")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("seekable", &self.is_seekable())
            .field("closed", &self.is_closed())
            .finish()
    }
}

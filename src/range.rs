//! Byte ranges over a shared container handle.
//!
//! A [`ByteRange`] identifies one member's bytes inside a container: a shared
//! handle plus start and end offsets. [`SubStream`] presents such a range as
//! a buffered, seekable reader.
//!
//! All access to the shared handle goes through [`ReadAt`], i.e. positioned
//! reads that carry their own offset. Any number of substreams can read the
//! same handle at different offsets, from different threads, without a shared
//! cursor.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, Read, Seek, SeekFrom};
use std::sync::Arc;

/// Size of the substream refill buffer (64 KiB).
pub const SUBSTREAM_BUFFER_SIZE: usize = 1 << 16;

/// Positioned reads that do not depend on a shared cursor.
pub trait ReadAt: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; 0 means `offset` is at or past the
    /// end of the data.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;
}

impl ReadAt for File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }
}

impl ReadAt for [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let Ok(offset) = usize::try_from(offset) else {
            return Ok(0);
        };
        if offset >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - offset);
        buf[..n].copy_from_slice(&self[offset..offset + n]);
        Ok(n)
    }
}

impl ReadAt for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at(buf, offset)
    }
}

/// A reference-counted, read-only container handle.
pub type SharedHandle = Arc<dyn ReadAt>;

/// A shared handle plus the `[start, end)` offsets of one member.
#[derive(Clone)]
pub struct ByteRange {
    handle: SharedHandle,
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Creates a range; `end` is clamped to be at least `start`.
    pub fn new(handle: SharedHandle, start: u64, end: u64) -> Self {
        debug_assert!(end >= start, "range end {end} before start {start}");
        Self {
            handle,
            start,
            end: end.max(start),
        }
    }

    /// First byte of the member.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// One past the last byte of the member.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Member size in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true for zero-length members.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The shared handle.
    pub fn handle(&self) -> &SharedHandle {
        &self.handle
    }

    /// Opens a buffered reader over this range.
    pub fn open(&self) -> SubStream {
        SubStream::new(self.clone())
    }
}

impl fmt::Debug for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteRange")
            .field("start", &self.start)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

/// A buffered reader confined to one [`ByteRange`].
///
/// Reads never go past the range end. Reaching the end of the underlying
/// handle before the range end is reported as
/// [`io::ErrorKind::UnexpectedEof`] rather than a silent short read.
pub struct SubStream {
    range: ByteRange,
    /// Absolute offset of the next refill.
    pos: u64,
    buf: Box<[u8]>,
    buf_pos: usize,
    buf_len: usize,
}

impl SubStream {
    /// Creates a substream positioned at the start of `range`.
    pub fn new(range: ByteRange) -> Self {
        let pos = range.start;
        Self {
            range,
            pos,
            buf: vec![0u8; SUBSTREAM_BUFFER_SIZE].into_boxed_slice(),
            buf_pos: 0,
            buf_len: 0,
        }
    }

    /// Total size of the range.
    pub fn size(&self) -> u64 {
        self.range.len()
    }

    /// Position relative to the range start.
    pub fn position(&self) -> u64 {
        (self.pos - self.range.start) - (self.buf_len - self.buf_pos) as u64
    }

    fn discard_buffer(&mut self) {
        self.buf_pos = 0;
        self.buf_len = 0;
    }
}

impl BufRead for SubStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buf_pos >= self.buf_len {
            let remaining = self.range.end.saturating_sub(self.pos);
            if remaining == 0 {
                return Ok(&[]);
            }

            let want = self.buf.len().min(remaining as usize);
            let n = self.range.handle.read_at(&mut self.buf[..want], self.pos)?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "container ends at {} inside member range {}..{}",
                        self.pos, self.range.start, self.range.end
                    ),
                ));
            }
            log::trace!("substream refill: {} bytes at {}", n, self.pos);

            self.pos += n as u64;
            self.buf_pos = 0;
            self.buf_len = n;
        }
        Ok(&self.buf[self.buf_pos..self.buf_len])
    }

    fn consume(&mut self, amt: usize) {
        self.buf_pos = (self.buf_pos + amt).min(self.buf_len);
    }
}

impl Read for SubStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl Seek for SubStream {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let size = self.size() as i128;
        let current = self.position() as i128;
        let new = match target {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => current + delta as i128,
            SeekFrom::End(delta) => size + delta as i128,
        };
        if new < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of member",
            ));
        }
        let new = new as u64;

        // stay inside the buffered window when possible
        let window_start = (self.pos - self.range.start) - self.buf_len as u64;
        let window_end = self.pos - self.range.start;
        if self.buf_len > 0 && new >= window_start && new <= window_end {
            self.buf_pos = (new - window_start) as usize;
        } else {
            self.discard_buffer();
            self.pos = self.range.start.saturating_add(new);
        }
        Ok(new)
    }
}

impl fmt::Debug for SubStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubStream")
            .field("range", &self.range)
            .field("position", &self.position())
            .finish()
    }
}

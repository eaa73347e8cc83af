//! Member path validation and resource limits.
//!
//! Member paths coming from container metadata or from callers are normalized
//! with [`normalize_member_path`] before they are indexed or resolved against
//! a directory, so a member can never name a location outside its container.
//! [`LimitedReader`] enforces [`OpenOptions::size_limit`] on member streams.
//!
//! [`OpenOptions::size_limit`]: crate::OpenOptions::size_limit

use std::io::{self, Read};

use crate::Error;

/// Normalizes a relative member path.
///
/// Backslashes are not treated as separators. Empty and `.` components are
/// dropped, so `./dir//a` becomes `dir/a`. Returns `None` for paths that are
/// absolute, contain `..` components, or normalize to nothing.
///
/// # Examples
///
/// ```rust
/// use arcfs::safety::normalize_member_path;
///
/// assert_eq!(normalize_member_path("./dir/a").as_deref(), Some("dir/a"));
/// assert_eq!(normalize_member_path("../etc/passwd"), None);
/// assert_eq!(normalize_member_path("/etc/passwd"), None);
/// ```
pub fn normalize_member_path(path: &str) -> Option<String> {
    if path.starts_with('/') {
        return None;
    }

    let mut parts = Vec::new();
    for component in path.split('/') {
        match component {
            "" | "." => {}
            ".." => return None,
            part => parts.push(part),
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Fails with [`Error::ResourceLimitExceeded`] if a member of known `size`
/// cannot be read within `limit`.
pub fn check_member_size(member: &str, size: u64, limit: Option<u64>) -> crate::Result<()> {
    match limit {
        Some(limit) if size > limit => Err(Error::ResourceLimitExceeded(format!(
            "Member \"{}\" size {} exceeds limit {}",
            member, size, limit
        ))),
        _ => Ok(()),
    }
}

/// A reader wrapper that fails once more than a fixed number of bytes has
/// been produced.
///
/// The error is an [`io::Error`] wrapping [`Error::ResourceLimitExceeded`];
/// crate APIs that surface it unwrap it again.
pub struct LimitedReader<R> {
    inner: R,
    /// Maximum bytes this member can produce.
    max_bytes: u64,
    /// Bytes read so far.
    bytes_read: u64,
}

impl<R> LimitedReader<R> {
    /// Creates a limited reader with no limit.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            max_bytes: u64::MAX,
            bytes_read: 0,
        }
    }

    /// Sets the maximum bytes for this member.
    pub fn max_bytes(mut self, max: u64) -> Self {
        self.max_bytes = max;
        self
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns a reference to the inner reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the inner reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for LimitedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 {
            return Ok(0);
        }

        self.bytes_read += n as u64;
        if self.bytes_read > self.max_bytes {
            return Err(io::Error::other(Error::ResourceLimitExceeded(format!(
                "Member size {} exceeds limit {}",
                self.bytes_read, self.max_bytes
            ))));
        }

        Ok(n)
    }
}

impl<R> std::fmt::Debug for LimitedReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitedReader")
            .field("max_bytes", &self.max_bytes)
            .field("bytes_read", &self.bytes_read)
            .finish_non_exhaustive()
    }
}

//! The [`Archive`] façade.
//!
//! An [`Archive`] owns exactly one backend for its whole lifetime. Opening
//! resolves the container type and constructs the backend; if that fails,
//! no archive is created.
//!
//! # Type resolution
//!
//! 1. With an inline hint marker configured and present in the path, the
//!    path is split at the marker's first occurrence; the suffix becomes the
//!    hint and replaces any hint from [`OpenOptions::hint`].
//! 2. An explicit [`OpenOptions::mime`] wins.
//! 3. Otherwise an `http://` or `https://` URL selects the HTTP backend.
//! 4. Otherwise the path is sniffed with [`detect_mime`].
//!
//! | Type token | Backend |
//! |------------|---------|
//! | `inode/directory` | [`Directory`] |
//! | `application/x-tar` | [`Tarball`] |
//! | `application/zip` | `Zip` (feature `zip`) |
//! | `http` | `Http` (feature `http`) |
//!
//! Any other token fails with [`Error::NotAnArchive`].

use std::path::{Path, PathBuf};

use url::Url;

use crate::backend::{BackendKind, Detail, Directory, Tarball};
use crate::detect::{self, detect_mime};
use crate::options::split_inline_hint;
use crate::safety::check_member_size;
use crate::stream::{BoxedReader, MemberStream};
use crate::{Error, FileHint, OpenOptions, Result};

/// A read-only view of one container.
///
/// # Example
///
/// ```rust,no_run
/// use arcfs::{Archive, OpenOptions};
///
/// let archive = Archive::open_with_options(
///     "assets.tar#data/manifest.json",
///     OpenOptions::new().inline_hint('#'),
/// )?;
///
/// for member in archive.list()? {
///     println!("{member}");
/// }
/// let manifest = archive.open_member("manifest.json")?.read_all()?;
/// # let _ = manifest;
/// # Ok::<(), arcfs::Error>(())
/// ```
#[derive(Debug)]
pub struct Archive {
    detail: Box<dyn Detail>,
    directio: bool,
    size_limit: Option<u64>,
}

impl Archive {
    /// Opens `path` with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, OpenOptions::default())
    }

    /// Opens `path` with a hint and an optional explicit type.
    pub fn open_with_hint(
        path: impl AsRef<Path>,
        hint: impl Into<FileHint>,
        mime: Option<&str>,
    ) -> Result<Self> {
        let mut options = OpenOptions::new().hint(hint);
        if let Some(mime) = mime {
            options = options.mime(mime);
        }
        Self::open_with_options(path, options)
    }

    /// Opens `path` as configured by `options`.
    ///
    /// Inline hints and URLs are only recognized in paths that are valid
    /// UTF-8; other paths are opened as local containers.
    ///
    /// # Errors
    ///
    /// - [`Error::NotAnArchive`] if the resolved type has no backend
    /// - [`Error::HintNotFound`] if a hint matches nothing in the container
    /// - an I/O error if the path cannot be read
    pub fn open_with_options(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let OpenOptions {
            mime,
            inline_hint,
            mut hint,
            size_limit,
        } = options;

        let mut path = path.as_ref();
        if let (Some(marker), Some(text)) = (inline_hint, path.to_str()) {
            if let (real, Some(inline)) = split_inline_hint(text, marker) {
                path = Path::new(real);
                hint = FileHint::single(inline);
            }
        }

        let mime = match mime {
            Some(mime) => mime,
            None if path.to_str().is_some_and(is_http_url) => detect::HTTP.to_string(),
            None => detect_mime(path)?.to_string(),
        };

        let detail = open_detail(path, &mime, &hint)?;
        log::debug!(
            "opened {} as {} ({} backend)",
            path.display(),
            mime,
            detail.kind()
        );

        Ok(Self::from_detail(detail, size_limit))
    }

    /// Wraps an already constructed backend.
    pub fn from_detail(detail: Box<dyn Detail>, size_limit: Option<u64>) -> Self {
        let directio = detail.directio();
        Self {
            detail,
            directio,
            size_limit,
        }
    }

    /// Opens a member for reading.
    ///
    /// With a size limit configured, members known to be larger fail right
    /// away and others fail while reading once the limit is crossed.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the member does not exist, and
    /// [`Error::ResourceLimitExceeded`] if its size is known to exceed the
    /// limit. That check runs before any member data is read.
    pub fn open_member(&self, member: &str) -> Result<MemberStream> {
        if let Some(limit) = self.size_limit {
            if let Some(size) = self.detail.member_size(member) {
                check_member_size(member, size, Some(limit))?;
            }
        }
        self.detail.open_member(member)?.limited(self.size_limit)
    }

    /// Opens a member and passes it through `filter`.
    ///
    /// The filter receives the raw member stream; the size limit applies to
    /// the filtered output.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::io::Read;
    /// use arcfs::Archive;
    ///
    /// let archive = Archive::open("bundle.tar")?;
    /// let head = archive.open_member_filtered("log.txt", |raw| {
    ///     let first_kib: arcfs::BoxedReader = Box::new(raw.take(1024));
    ///     Ok(first_kib)
    /// })?;
    /// # let _ = head;
    /// # Ok::<(), arcfs::Error>(())
    /// ```
    pub fn open_member_filtered<F>(&self, member: &str, filter: F) -> Result<MemberStream>
    where
        F: FnOnce(BoxedReader) -> std::io::Result<BoxedReader> + Send + 'static,
    {
        self.detail
            .open_member_filtered(member, Box::new(filter))?
            .limited(self.size_limit)
    }

    /// Reads a whole member into memory.
    pub fn read_member(&self, member: &str) -> Result<Vec<u8>> {
        self.open_member(member)?.read_all()
    }

    /// Returns true if the member exists.
    pub fn exists(&self, member: &str) -> bool {
        self.detail.exists(member)
    }

    /// Lists member paths relative to the logical root.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for backends that cannot enumerate members.
    pub fn list(&self) -> Result<Vec<String>> {
        self.detail.list()
    }

    /// Finds the first member whose file name equals `filename`.
    pub fn find_file(&self, filename: &str) -> Option<String> {
        self.detail.find_file(filename)
    }

    /// The container's own path.
    pub fn path(&self) -> &Path {
        self.detail.path()
    }

    /// Resolves a member path to a full path.
    ///
    /// Absolute paths are returned unchanged; relative paths are joined to
    /// the logical root.
    pub fn resolve_path(&self, member: impl AsRef<Path>) -> PathBuf {
        let member = member.as_ref();
        if member.is_absolute() {
            member.to_path_buf()
        } else {
            self.detail.root().join(member)
        }
    }

    /// Re-selects the logical root with a new hint.
    ///
    /// # Errors
    ///
    /// [`Error::HintNotFound`] if nothing matches; the previous root is
    /// kept.
    pub fn apply_hint(&mut self, hint: impl Into<FileHint>) -> Result<()> {
        self.detail.apply_hint(&hint.into())
    }

    /// The container path that matched the hint, if any.
    pub fn used_hint(&self) -> Option<String> {
        self.detail.used_hint()
    }

    /// Returns true if the container changed on disk since it was opened.
    pub fn changed(&self) -> bool {
        self.detail.changed()
    }

    /// Returns true if the backend understands paths embedding `schema`.
    pub fn handles_schema(&self, schema: &str) -> bool {
        self.detail.handles_schema(schema)
    }

    /// Returns true if members can be read without an intermediate copy.
    pub fn directio(&self) -> bool {
        self.directio
    }

    /// Which backend serves this archive.
    pub fn backend_kind(&self) -> BackendKind {
        self.detail.kind()
    }

    /// The configured member size limit.
    pub fn size_limit(&self) -> Option<u64> {
        self.size_limit
    }
}

fn is_http_url(path: &str) -> bool {
    Url::parse(path).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

fn open_detail(path: &Path, mime: &str, hint: &FileHint) -> Result<Box<dyn Detail>> {
    match mime {
        detect::DIRECTORY => Ok(Box::new(Directory::open(path, hint)?)),
        detect::TAR => Ok(Box::new(Tarball::open(path, hint)?)),
        #[cfg(feature = "zip")]
        detect::ZIP => Ok(Box::new(crate::backend::Zip::open(path, hint)?)),
        #[cfg(feature = "http")]
        detect::HTTP => {
            let location = path
                .to_str()
                .ok_or_else(|| Error::InvalidUrl(path.display().to_string()))?;
            Ok(Box::new(crate::backend::Http::open(location, hint)?))
        }
        other => Err(Error::NotAnArchive {
            mime: other.to_string(),
        }),
    }
}

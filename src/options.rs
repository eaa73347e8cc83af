//! Options for opening archives.

use crate::FileHint;

/// Options controlling how [`Archive::open_with_options`] resolves a path.
///
/// # Example
///
/// ```
/// use arcfs::{FileHint, OpenOptions};
///
/// let options = OpenOptions::new()
///     .inline_hint('#')
///     .hint(FileHint::new(["tileset.conf", "mapConfig.json"]))
///     .size_limit(64 * 1024 * 1024);
///
/// assert_eq!(options.inline_hint_marker(), Some('#'));
/// ```
///
/// [`Archive::open_with_options`]: crate::Archive::open_with_options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub(crate) mime: Option<String>,
    pub(crate) inline_hint: Option<char>,
    pub(crate) hint: FileHint,
    pub(crate) size_limit: Option<u64>,
}

impl OpenOptions {
    /// Creates default options: sniff the type, no hint, no limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forces the container type instead of detecting it.
    ///
    /// Accepts the same tokens detection produces: `inode/directory`,
    /// `application/x-tar`, `application/zip` or `http`. An empty string
    /// means "detect".
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.mime = if mime.is_empty() { None } else { Some(mime) };
        self
    }

    /// Sets the marker that splits an inline hint off the path.
    ///
    /// With marker `#`, `bundle.tar#inner/hint.file` opens `bundle.tar` with
    /// hint `inner/hint.file`, replacing any hint set through [`hint`](Self::hint).
    pub fn inline_hint(mut self, marker: char) -> Self {
        self.inline_hint = Some(marker);
        self
    }

    /// Sets the hint used to find the container's logical root.
    pub fn hint(mut self, hint: impl Into<FileHint>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Limits the number of bytes readable from any single member.
    pub fn size_limit(mut self, limit: u64) -> Self {
        self.size_limit = Some(limit);
        self
    }

    /// The explicit type override, if any.
    pub fn mime_override(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    /// The inline hint marker, if any.
    pub fn inline_hint_marker(&self) -> Option<char> {
        self.inline_hint
    }

    /// The configured hint.
    pub fn file_hint(&self) -> &FileHint {
        &self.hint
    }

    /// The configured member size limit.
    pub fn member_size_limit(&self) -> Option<u64> {
        self.size_limit
    }
}

/// Splits `path` at the first occurrence of `marker`.
///
/// Returns the real path and, when the marker is present, the hint suffix.
pub fn split_inline_hint(path: &str, marker: char) -> (&str, Option<&str>) {
    match path.split_once(marker) {
        Some((real, hint)) => (real, Some(hint)),
        None => (path, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_inline_hint() {
        assert_eq!(
            split_inline_hint("archive.tar#inner/hint.file", '#'),
            ("archive.tar", Some("inner/hint.file"))
        );
    }

    #[test]
    fn test_split_at_first_marker() {
        assert_eq!(split_inline_hint("a#b#c", '#'), ("a", Some("b#c")));
    }

    #[test]
    fn test_split_without_marker() {
        assert_eq!(split_inline_hint("archive.tar", '#'), ("archive.tar", None));
    }

    #[test]
    fn test_empty_mime_means_detect() {
        let options = OpenOptions::new().mime("");
        assert_eq!(options.mime_override(), None);
        let options = OpenOptions::new().mime("application/x-tar");
        assert_eq!(options.mime_override(), Some("application/x-tar"));
    }

    #[test]
    fn test_builder_chain() {
        let options = OpenOptions::new()
            .inline_hint('#')
            .hint("a.json")
            .size_limit(10);
        assert_eq!(options.inline_hint_marker(), Some('#'));
        assert_eq!(options.file_hint().first(), Some("a.json"));
        assert_eq!(options.member_size_limit(), Some(10));
    }
}

//! Path index for containers with a fixed member list.
//!
//! [`MemberIndex`] maps member paths, relative to the container's logical
//! root, to whatever a backend needs to open the member: a [`ByteRange`] for
//! tar, an entry number for zip. It is built once from the full member list
//! and never mutated; re-rooting builds a fresh index.
//!
//! When a hint is supplied, the member matching it decides the logical root:
//! the directory in front of the match becomes a prefix that is stripped from
//! every member path, and members outside that directory are dropped.
//!
//! [`ByteRange`]: crate::range::ByteRange

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::safety::normalize_member_path;
use crate::{Error, FileHint, Result};

/// An immutable member-path index with optional prefix stripping.
#[derive(Debug, Clone)]
pub struct MemberIndex<T> {
    archive: PathBuf,
    prefix: String,
    used_hint: Option<String>,
    /// Entries in container order.
    entries: Vec<(String, T)>,
    lookup: HashMap<String, usize>,
}

impl<T: Clone> MemberIndex<T> {
    /// Builds an index over `members`, given as `(path, value)` pairs in
    /// container order.
    ///
    /// Paths must already be normalized. When a path occurs more than once,
    /// the first member with that path wins and later ones are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HintNotFound`] if `hint` is non-empty and no member
    /// matches any of its candidates.
    pub fn build(archive: &Path, members: &[(String, T)], hint: &FileHint) -> Result<Self> {
        let (prefix, used_hint) = if hint.is_empty() {
            (String::new(), None)
        } else {
            let mut matcher = hint.matcher();
            for (path, _) in members {
                if matcher.observe(path) {
                    break;
                }
            }
            let prefix = matcher
                .anchor_prefix()
                .ok_or_else(|| Error::HintNotFound {
                    archive: archive.to_path_buf(),
                    hint: hint.to_string(),
                })?
                .to_string();
            (prefix, matcher.into_match())
        };

        let mut entries: Vec<(String, T)> = Vec::new();
        let mut lookup: HashMap<String, usize> = HashMap::new();
        for (path, value) in members {
            let Some(relative) = strip_prefix(path, &prefix) else {
                continue;
            };
            if lookup.contains_key(relative) {
                log::debug!("ignoring duplicate member {:?} in {}", path, archive.display());
                continue;
            }
            lookup.insert(relative.to_string(), entries.len());
            entries.push((relative.to_string(), value.clone()));
        }

        log::debug!(
            "indexed {} of {} members of {} (prefix {:?})",
            entries.len(),
            members.len(),
            archive.display(),
            prefix
        );

        Ok(Self {
            archive: archive.to_path_buf(),
            prefix,
            used_hint,
            entries,
            lookup,
        })
    }
}

impl<T> MemberIndex<T> {
    /// The archive this index describes.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// The stripped prefix; empty when the logical root is the archive root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The member path (relative to the archive root) that matched the hint.
    pub fn used_hint(&self) -> Option<&str> {
        self.used_hint.as_deref()
    }

    /// Looks up a member by its relative path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] naming the archive and the member.
    pub fn get(&self, member: &str) -> Result<&T> {
        normalize_member_path(member)
            .and_then(|path| self.lookup.get(&path))
            .map(|&slot| &self.entries[slot].1)
            .ok_or_else(|| Error::NotFound {
                archive: self.archive.clone(),
                member: member.to_string(),
            })
    }

    /// Returns true if `member` is in the index.
    pub fn contains(&self, member: &str) -> bool {
        normalize_member_path(member).is_some_and(|path| self.lookup.contains_key(&path))
    }

    /// Relative member paths in container order.
    pub fn list(&self) -> Vec<String> {
        self.entries.iter().map(|(path, _)| path.clone()).collect()
    }

    /// The first member, in container order, whose file name is `filename`.
    pub fn find_file(&self, filename: &str) -> Option<String> {
        self.entries
            .iter()
            .map(|(path, _)| path)
            .find(|path| file_name(path) == filename)
            .cloned()
    }

    /// Number of indexed members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no member is indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(relative path, value)` in container order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(path, value)| (path.as_str(), value))
    }
}

/// Last component of a `/`-separated path.
pub(crate) fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(path);
    }
    path.strip_prefix(prefix)?
        .strip_prefix('/')
        .filter(|rest| !rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(paths: &[&str]) -> Vec<(String, usize)> {
        paths
            .iter()
            .enumerate()
            .map(|(i, path)| (path.to_string(), i))
            .collect()
    }

    #[test]
    fn test_no_hint_keeps_full_paths() {
        let index =
            MemberIndex::build(Path::new("t.tar"), &members(&["dir/a", "dir/b"]), &FileHint::default())
                .unwrap();
        assert_eq!(index.list(), ["dir/a", "dir/b"]);
        assert_eq!(index.prefix(), "");
        assert_eq!(index.used_hint(), None);
    }

    #[test]
    fn test_hint_strips_prefix() {
        let index = MemberIndex::build(
            Path::new("t.tar"),
            &members(&["dir/a", "dir/b", "other/c"]),
            &FileHint::single("a"),
        )
        .unwrap();
        assert_eq!(index.list(), ["a", "b"]);
        assert_eq!(index.prefix(), "dir");
        assert_eq!(index.used_hint(), Some("dir/a"));
        assert!(!index.contains("other/c"));
        assert!(!index.contains("c"));
        assert_eq!(*index.get("b").unwrap(), 1);
    }

    #[test]
    fn test_missing_hint_fails() {
        let err = MemberIndex::build(
            Path::new("t.tar"),
            &members(&["dir/a"]),
            &FileHint::single("missing"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::HintNotFound { .. }));
    }

    #[test]
    fn test_lookup_miss_names_archive_and_member() {
        let index =
            MemberIndex::build(Path::new("t.tar"), &members(&["a"]), &FileHint::default()).unwrap();
        match index.get("nope") {
            Err(Error::NotFound { archive, member }) => {
                assert_eq!(archive, Path::new("t.tar"));
                assert_eq!(member, "nope");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_lookup_normalizes_path() {
        let index =
            MemberIndex::build(Path::new("t.tar"), &members(&["dir/a"]), &FileHint::default())
                .unwrap();
        assert!(index.contains("./dir/a"));
        assert!(!index.contains("../dir/a"));
    }

    #[test]
    fn test_find_file_returns_first_in_order() {
        let index = MemberIndex::build(
            Path::new("t.tar"),
            &members(&["x/readme", "y/readme", "z"]),
            &FileHint::default(),
        )
        .unwrap();
        assert_eq!(index.find_file("readme").as_deref(), Some("x/readme"));
        assert_eq!(index.find_file("z").as_deref(), Some("z"));
        assert_eq!(index.find_file("absent"), None);
    }

    #[test]
    fn test_duplicate_member_keeps_first() {
        let index = MemberIndex::build(
            Path::new("t.tar"),
            &members(&["a", "b", "a"]),
            &FileHint::default(),
        )
        .unwrap();
        assert_eq!(index.list(), ["a", "b"]);
        assert_eq!(*index.get("a").unwrap(), 0);
    }

    #[test]
    fn test_prefix_is_not_a_substring_match() {
        let index = MemberIndex::build(
            Path::new("t.tar"),
            &members(&["dir/a", "dirx/b"]),
            &FileHint::single("a"),
        )
        .unwrap();
        assert_eq!(index.list(), ["a"]);
    }
}

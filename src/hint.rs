//! File hints and the priority matcher used to resolve them.
//!
//! A [`FileHint`] is an ordered list of candidate file names, most preferred
//! first. Backends use it to find the logical root of a container (an archive
//! wrapped in a top-level directory, say) and callers use it to pick one of
//! several differently named files.
//!
//! # Matching
//!
//! A candidate without `/` matches any observed path whose file name equals
//! it. A candidate with `/` (`inner/hint.file`) matches an observed path whose
//! trailing components equal the candidate's components. In both cases the
//! components left in front of the match form the *anchor prefix*, i.e. the
//! directory the container is re-rooted at.
//!
//! ```
//! use arcfs::FileHint;
//!
//! let hint = FileHint::new(["config.json", "CONFIG.JSON"]);
//! let mut matcher = hint.matcher();
//!
//! assert!(!matcher.observe("top/CONFIG.JSON"));
//! assert_eq!(matcher.best_index(), Some(1));
//!
//! // a better candidate shows up later and wins
//! assert!(matcher.observe("sub/config.json"));
//! assert_eq!(matcher.best_match(), Some("sub/config.json"));
//! assert_eq!(matcher.anchor_prefix(), Some("sub"));
//! ```

use std::fmt;

/// An ordered list of candidate paths, most preferred first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileHint(Vec<String>);

impl FileHint {
    /// Creates a hint from candidates in priority order.
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(candidates.into_iter().map(Into::into).collect())
    }

    /// Creates a hint with a single candidate.
    pub fn single(candidate: impl Into<String>) -> Self {
        Self(vec![candidate.into()])
    }

    /// Returns true if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the candidates in priority order.
    pub fn candidates(&self) -> &[String] {
        &self.0
    }

    /// Returns the most preferred candidate.
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Starts a new matching pass over this hint.
    pub fn matcher(&self) -> Matcher<'_> {
        Matcher::new(self)
    }
}

impl From<&str> for FileHint {
    fn from(candidate: &str) -> Self {
        Self::single(candidate)
    }
}

impl From<String> for FileHint {
    fn from(candidate: String) -> Self {
        Self::single(candidate)
    }
}

impl From<Vec<String>> for FileHint {
    fn from(candidates: Vec<String>) -> Self {
        Self(candidates)
    }
}

impl From<&[&str]> for FileHint {
    fn from(candidates: &[&str]) -> Self {
        Self::new(candidates.iter().copied())
    }
}

impl fmt::Display for FileHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

/// Tracks the best candidate seen so far during a scan.
///
/// Feed every observed path to [`observe`](Self::observe); it returns `true`
/// once the most preferred candidate has matched and the scan may stop.
/// Later paths are only compared against candidates strictly better than the
/// current best, so the first path to match a given priority keeps it.
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    hint: &'a FileHint,
    best_index: usize,
    best_match: Option<String>,
}

impl<'a> Matcher<'a> {
    /// Creates a matcher with nothing matched yet.
    pub fn new(hint: &'a FileHint) -> Self {
        Self {
            hint,
            best_index: hint.len(),
            best_match: None,
        }
    }

    /// Compares `path` against all candidates better than the current best.
    ///
    /// Returns `true` when the scan may stop (candidate 0 has matched).
    pub fn observe(&mut self, path: &str) -> bool {
        for index in 0..self.best_index {
            if matches_candidate(path, &self.hint.0[index]) {
                self.best_index = index;
                self.best_match = Some(path.to_string());
                break;
            }
        }

        self.best_index == 0
    }

    /// Returns true if any candidate has matched.
    pub fn matched(&self) -> bool {
        self.best_match.is_some()
    }

    /// Index of the best matched candidate.
    pub fn best_index(&self) -> Option<usize> {
        self.best_match.as_ref().map(|_| self.best_index)
    }

    /// The observed path that matched the best candidate.
    pub fn best_match(&self) -> Option<&str> {
        self.best_match.as_deref()
    }

    /// The candidate that produced the best match.
    pub fn candidate(&self) -> Option<&str> {
        self.best_index().map(|index| self.hint.0[index].as_str())
    }

    /// The directory part of the best match that precedes the candidate.
    ///
    /// Empty string when the match sits at the container root.
    pub fn anchor_prefix(&self) -> Option<&str> {
        let path = self.best_match()?;
        let candidate = self.candidate()?.trim_matches('/');
        let prefix = &path[..path.len() - candidate.len()];
        Some(prefix.trim_end_matches('/'))
    }

    /// Consumes the matcher, returning the best match.
    pub fn into_match(self) -> Option<String> {
        self.best_match
    }
}

fn matches_candidate(path: &str, candidate: &str) -> bool {
    let candidate = candidate.trim_matches('/');
    if candidate.is_empty() {
        return false;
    }
    if path == candidate {
        return true;
    }

    path.len() > candidate.len()
        && path.ends_with(candidate)
        && path.as_bytes()[path.len() - candidate.len() - 1] == b'/'
}

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::{BackendKind, Detail};
use crate::index::file_name;
use crate::safety::normalize_member_path;
use crate::stat::FileStat;
use crate::stream::MemberStream;
use crate::{Error, FileHint, Result};

/// Backend for plain directories.
///
/// Members are regular files below the root. Nothing is cached: listings
/// walk the tree on every call.
#[derive(Debug)]
pub struct Directory {
    path: PathBuf,
    root: PathBuf,
    used_hint: Option<String>,
    stat: FileStat,
}

impl Directory {
    /// Opens the directory at `path`, re-rooted by `hint` if non-empty.
    pub fn open(path: &Path, hint: &FileHint) -> Result<Self> {
        let stat = FileStat::from_path(path);
        let (root, used_hint) = resolve_root(path, hint)?;
        Ok(Self {
            path: path.to_path_buf(),
            root,
            used_hint,
            stat,
        })
    }

    fn member_path(&self, member: &str) -> Option<PathBuf> {
        normalize_member_path(member).map(|relative| self.root.join(relative))
    }

    fn not_found(&self, member: &str) -> Error {
        Error::NotFound {
            archive: self.path.clone(),
            member: member.to_string(),
        }
    }
}

impl Detail for Directory {
    fn kind(&self) -> BackendKind {
        BackendKind::Directory
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn open_member(&self, member: &str) -> Result<MemberStream> {
        let path = self.member_path(member).ok_or_else(|| self.not_found(member))?;
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(self.not_found(member)),
            Err(e) => return Err(e.into()),
        };
        if !file.metadata()?.is_file() {
            return Err(self.not_found(member));
        }
        Ok(MemberStream::seekable(member, file, None))
    }

    fn exists(&self, member: &str) -> bool {
        self.member_path(member).is_some_and(|path| path.is_file())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(walk_files(&self.root).collect())
    }

    fn find_file(&self, filename: &str) -> Option<String> {
        walk_files(&self.root).find(|path| file_name(path) == filename)
    }

    fn apply_hint(&mut self, hint: &FileHint) -> Result<()> {
        let (root, used_hint) = resolve_root(&self.path, hint)?;
        self.root = root;
        self.used_hint = used_hint;
        Ok(())
    }

    fn used_hint(&self) -> Option<String> {
        self.used_hint.clone()
    }

    fn snapshot(&self) -> Option<&FileStat> {
        Some(&self.stat)
    }

    fn handles_schema(&self, schema: &str) -> bool {
        schema == "file"
    }

    fn directio(&self) -> bool {
        true
    }
}

fn resolve_root(path: &Path, hint: &FileHint) -> Result<(PathBuf, Option<String>)> {
    if hint.is_empty() {
        return Ok((path.to_path_buf(), None));
    }

    let mut matcher = hint.matcher();
    for relative in walk_files(path) {
        if matcher.observe(&relative) {
            break;
        }
    }

    let root = match matcher.anchor_prefix() {
        Some("") => path.to_path_buf(),
        Some(prefix) => path.join(prefix),
        None => {
            return Err(Error::HintNotFound {
                archive: path.to_path_buf(),
                hint: hint.to_string(),
            });
        }
    };
    log::debug!("directory {} rooted at {}", path.display(), root.display());
    Ok((root, matcher.into_match()))
}

/// Regular files below `root` as `/`-separated relative paths, sorted by name
/// within each directory.
fn walk_files(root: &Path) -> impl Iterator<Item = String> + '_ {
    WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter_map(move |entry| relative_name(root, entry.path()))
}

fn relative_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>();
    match parts {
        Some(parts) => Some(parts.join("/")),
        None => {
            log::warn!("skipping non-UTF-8 path {}", path.display());
            None
        }
    }
}

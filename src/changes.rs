//! Changed files and relevance filtering
//!
//! Report paths are usually absolute while the host hands us
//! repository-relative paths, so both sides are normalized against the
//! working directory before they are compared.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::coverage::FileRecord;

/// Paths created or modified by the change under review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    paths: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new<I, S>(paths: I, cwd: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            paths: paths
                .into_iter()
                .map(|p| normalize_path(p.as_ref(), cwd))
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Union of created and modified paths
    pub fn from_lists(created: &[String], modified: &[String], cwd: &Path) -> Self {
        Self::new(created.iter().chain(modified.iter()), cwd)
    }

    pub fn contains(&self, relative_path: &str) -> bool {
        self.paths.contains(relative_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Normalize a path to `/`-separated form relative to `cwd`
pub fn normalize_path(path: &str, cwd: &Path) -> String {
    let unified = path.trim().replace('\\', "/");

    let stripped = if Path::new(&unified).is_absolute() {
        Path::new(&unified)
            .strip_prefix(cwd)
            .ok()
            .map(|rest| rest.to_string_lossy().replace('\\', "/"))
    } else {
        None
    };
    let relative = stripped.unwrap_or(unified);

    let mut trimmed = relative.as_str();
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }
    trimmed.to_string()
}

/// Path of `relative` (relative to `cwd`) from the repository root.
/// Paths that fall outside the repository come back unchanged.
pub fn repository_path(relative: &str, cwd: &Path, repo_root: &Path) -> String {
    let absolute = cwd.join(relative);
    let rebased = normalize_path(&absolute.to_string_lossy(), repo_root);

    if Path::new(&rebased).is_absolute() {
        relative.to_string()
    } else {
        rebased
    }
}

/// A report entry that survived the relevance filter
#[derive(Debug, Clone, PartialEq)]
pub struct RelevantFile<'a> {
    /// Relative to the working directory, used for display and matching
    pub relative_path: String,
    /// Relative to the repository root, used for blob links
    pub link_path: String,
    pub record: &'a FileRecord,
}

impl<'a> RelevantFile<'a> {
    pub fn new(relative_path: String, record: &'a FileRecord) -> Self {
        Self {
            link_path: relative_path.clone(),
            relative_path,
            record,
        }
    }
}

/// Keep the files touched by the change, or every file when `show_all` is set.
/// Report order is preserved.
pub fn filter_relevant<'a>(
    files: &[&'a FileRecord],
    changes: &ChangeSet,
    cwd: &Path,
    show_all: bool,
) -> Vec<RelevantFile<'a>> {
    files
        .iter()
        .map(|&record| RelevantFile::new(normalize_path(&record.path, cwd), record))
        .filter(|file| show_all || changes.contains(&file.relative_path))
        .collect()
}

/// Changed paths that have no entry in the report
pub fn missing_from_report<'c>(
    files: &[&FileRecord],
    changes: &'c ChangeSet,
    cwd: &Path,
) -> Vec<&'c str> {
    let reported: HashSet<String> = files
        .iter()
        .map(|record| normalize_path(&record.path, cwd))
        .collect();

    changes.iter().filter(|path| !reported.contains(*path)).collect()
}

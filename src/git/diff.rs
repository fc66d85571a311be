//! Changed files between a base reference and HEAD

use anyhow::{Context, Result};
use git2::{Delta, DiffOptions, Repository};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files a branch created or modified, plus the commit they were read at
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitChanges {
    /// Repository-relative, `/`-separated
    pub created: Vec<String>,
    pub modified: Vec<String>,
    pub head_sha: String,
}

/// Git diff operations
pub struct GitDiff {
    repo: Repository,
}

impl GitDiff {
    /// Open the repository containing `path`
    pub fn new(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("Failed to find git repository at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Root of the working tree, `None` for bare repositories
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo.workdir().map(Path::to_path_buf)
    }

    pub fn head_sha(&self) -> Result<String> {
        let head = self.repo.head()?.peel_to_commit()?;
        Ok(head.id().to_string())
    }

    /// Classify everything that changed between `base` and HEAD.
    /// Deleted files are left out since they cannot have coverage.
    pub fn changes_since(&self, base: &str) -> Result<GitChanges> {
        let base_tree = self
            .repo
            .revparse_single(base)
            .with_context(|| format!("Failed to resolve reference: {}", base))?
            .peel_to_commit()?
            .tree()?;

        let head = self.repo.head()?.peel_to_commit()?;
        let head_tree = head.tree()?;

        let mut diff_opts = DiffOptions::new();
        let mut diff = self.repo.diff_tree_to_tree(
            Some(&base_tree),
            Some(&head_tree),
            Some(&mut diff_opts),
        )?;
        diff.find_similar(None)?;

        let mut changes = GitChanges {
            head_sha: head.id().to_string(),
            ..Default::default()
        };

        for delta in diff.deltas() {
            let Some(path) = delta.new_file().path() else {
                continue;
            };
            let path = path.to_string_lossy().replace('\\', "/");

            match delta.status() {
                Delta::Added | Delta::Copied => changes.created.push(path),
                Delta::Modified | Delta::Renamed | Delta::Typechange => changes.modified.push(path),
                _ => {}
            }
        }

        debug!(
            base,
            created = changes.created.len(),
            modified = changes.modified.len(),
            "collected changed files"
        );
        Ok(changes)
    }
}

//! Command-line surface
//!
//! Argument parsing, config overrides and the git-derived review context
//! live here so the binary stays a thin shell around them.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::git::GitDiff;
use crate::plugin::{Outcome, ReviewContext};

#[derive(Parser, Debug)]
#[command(name = "pr-coverage")]
#[command(about = "Report Clover coverage for the files changed in a pull request")]
#[command(version)]
pub struct Cli {
    /// Path to config file (default: pr-coverage.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory paths are resolved against (default: current directory)
    #[arg(short = 'C', long)]
    pub dir: Option<PathBuf>,

    /// Clover report to read
    #[arg(long)]
    pub report: Option<String>,

    /// Files created by the change
    #[arg(long, num_args = 1..)]
    pub created: Vec<String>,

    /// Files modified by the change
    #[arg(long, num_args = 1..)]
    pub modified: Vec<String>,

    /// Derive created/modified files from git, diffing this ref against HEAD
    #[arg(long)]
    pub base: Option<String>,

    /// Commit used for file and line links (default: HEAD when --base is given)
    #[arg(long)]
    pub sha: Option<String>,

    /// Report every file in the coverage report, not only changed ones
    #[arg(long)]
    pub show_all: bool,

    /// Rows shown before the rest are collapsed
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Uncovered line numbers listed per file
    #[arg(long)]
    pub max_uncovered: Option<usize>,

    /// Post the report as a comment on this pull request instead of printing it
    #[arg(long, value_name = "NUMBER")]
    pub post: Option<u64>,

    /// Exit with status 1 when the coverage thresholds are not met
    #[arg(long)]
    pub fail_on_threshold: bool,
}

impl Cli {
    /// `-C` canonicalized, or the process working directory
    pub fn working_dir(&self) -> Result<PathBuf> {
        match self.dir {
            Some(ref dir) => std::fs::canonicalize(dir)
                .with_context(|| format!("Could not find directory: {}", dir.display())),
            None => std::env::current_dir().context("Could not determine current directory"),
        }
    }

    /// Config file (or defaults) with command-line flags layered on top
    pub fn load_config(&self, cwd: &Path) -> Result<Config> {
        let mut config = Config::discover(self.config.as_deref(), cwd)?;
        apply_overrides(&mut config, self)?;
        Ok(config)
    }
}

/// Flags win over the config file. The result is validated again.
pub fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(report) = cli.report.clone() {
        config.report.path = report;
    }
    if cli.show_all {
        config.report.show_all_files = true;
    }
    if let Some(max_rows) = cli.max_rows {
        config.report.max_rows = max_rows;
    }
    if let Some(max_uncovered) = cli.max_uncovered {
        config.report.max_uncovered = max_uncovered;
    }

    config.validate().context("Invalid command-line option")
}

/// Build the review context from flags, plus git when `--base` is given
pub fn review_context(cli: &Cli, cwd: PathBuf) -> Result<ReviewContext> {
    let git = GitDiff::new(&cwd).ok();

    let mut ctx = ReviewContext {
        repo_root: git.as_ref().and_then(GitDiff::workdir),
        cwd,
        created_files: cli.created.clone(),
        modified_files: cli.modified.clone(),
        commit_sha: cli.sha.clone(),
    };

    if let Some(ref base) = cli.base {
        let git = match git {
            Some(git) => git,
            None => GitDiff::new(&ctx.cwd)?,
        };
        let changes = git.changes_since(base)?;

        // Git paths are relative to the repository root, not to cwd
        let root = ctx.repo_root.clone().unwrap_or_else(|| ctx.cwd.clone());
        let absolute = |path: String| root.join(path).display().to_string();

        ctx.created_files.extend(changes.created.into_iter().map(absolute));
        ctx.modified_files.extend(changes.modified.into_iter().map(absolute));
        if ctx.commit_sha.is_none() {
            ctx.commit_sha = Some(changes.head_sha);
        }
    }

    Ok(ctx)
}

/// Only a rendered report that missed a threshold fails the run
pub fn should_fail(outcome: Outcome, fail_on_threshold: bool) -> bool {
    fail_on_threshold && matches!(outcome, Outcome::Reported { passed: false, .. })
}

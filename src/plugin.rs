//! Coverage report orchestration
//!
//! Ties the pieces together: load the Clover report, keep the files the
//! change touched, render the Markdown and hand it to a [`Reporter`].
//! Everything the host knows about the pull request arrives through
//! [`ReviewContext`], so a run never reads ambient state.

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::changes::{filter_relevant, missing_from_report, repository_path, ChangeSet};
use crate::config::Config;
use crate::coverage::load_report;
use crate::report::render_report;

/// Sink for everything a run produces
pub trait Reporter {
    fn markdown(&mut self, body: &str);
    fn warn(&mut self, message: &str);
}

/// What the host knows about the change under review
#[derive(Debug, Clone, Default)]
pub struct ReviewContext {
    /// Directory report paths and changed paths are resolved against
    pub cwd: PathBuf,
    pub created_files: Vec<String>,
    pub modified_files: Vec<String>,
    pub commit_sha: Option<String>,
    /// Working tree root. Blob links are built relative to it when `cwd`
    /// is a subdirectory.
    pub repo_root: Option<PathBuf>,
}

impl ReviewContext {
    pub fn change_set(&self) -> ChangeSet {
        ChangeSet::from_lists(&self.created_files, &self.modified_files, &self.cwd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No report file at the configured path
    NoReport,
    /// The report has no entry for any changed file
    NoRelevantFiles,
    Reported { passed: bool, files: usize },
}

pub fn no_report_warning(report_path: &str) -> String {
    format!(
        "No coverage report was detected at `{}`. Please output a Clover report before running this check.",
        report_path
    )
}

pub fn missing_files_warning(count: usize) -> String {
    if count == 1 {
        "Could not find coverage data for 1 changed file in the report.".to_string()
    } else {
        format!(
            "Could not find coverage data for {} changed files in the report.",
            count
        )
    }
}

/// Generate the coverage report for one pull request
pub fn run(config: &Config, ctx: &ReviewContext, reporter: &mut dyn Reporter) -> Result<Outcome> {
    let report_path = config.report_path(&ctx.cwd)?;

    let Some(tree) = load_report(&report_path)? else {
        if config.report.warn_on_no_report {
            reporter.warn(&no_report_warning(&config.report.path));
        }
        return Ok(Outcome::NoReport);
    };

    let files = tree.flatten();
    let changes = ctx.change_set();

    if config.report.warn_on_missing_files {
        let missing = missing_from_report(&files, &changes, &ctx.cwd);
        if !missing.is_empty() {
            reporter.warn(&missing_files_warning(missing.len()));
        }
    }

    let mut relevant = filter_relevant(&files, &changes, &ctx.cwd, config.report.show_all_files);
    if let Some(root) = &ctx.repo_root {
        for file in &mut relevant {
            file.link_path = repository_path(&file.relative_path, &ctx.cwd, root);
        }
    }
    info!(
        reported = files.len(),
        changed = changes.len(),
        relevant = relevant.len(),
        "filtered coverage report"
    );

    if relevant.is_empty() {
        return Ok(Outcome::NoRelevantFiles);
    }

    let report = render_report(&relevant, config, ctx.commit_sha.as_deref());
    reporter.markdown(&report.markdown);

    Ok(Outcome::Reported {
        passed: report.passed,
        files: relevant.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::BufferedReporter;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    fn file_xml(path: &str, covered_conditionals: u32) -> String {
        format!(
            r#"<file name="x" path="{}">
  <metrics statements="10" coveredstatements="10" conditionals="10" coveredconditionals="{}" methods="10" coveredmethods="10"/>
  <line num="1" count="1" type="stmt"/>
</file>"#,
            path, covered_conditionals
        )
    }

    fn write_report(dir: &Path, files: &[String]) {
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<coverage><project name=\"p\"><package name=\"src\">{}</package></project></coverage>",
            files.join("\n")
        );
        fs::create_dir_all(dir.join("coverage")).unwrap();
        fs::write(dir.join("coverage/clover.xml"), xml).unwrap();
    }

    fn context(dir: &TempDir, modified: &[&str]) -> ReviewContext {
        ReviewContext {
            cwd: dir.path().to_path_buf(),
            created_files: vec![],
            modified_files: modified.iter().map(|s| s.to_string()).collect(),
            commit_sha: None,
            repo_root: None,
        }
    }

    #[test]
    fn test_passing_file() {
        let dir = tempdir().unwrap();
        let abs = dir.path().join("src/one.js");
        write_report(dir.path(), &[file_xml(&abs.display().to_string(), 10)]);

        let config = Config::default();
        let mut reporter = BufferedReporter::default();
        let outcome = run(&config, &context(&dir, &["src/one.js"]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::Reported { passed: true, files: 1 });
        assert_eq!(reporter.markdown.len(), 1);
        let body = &reporter.markdown[0];
        assert!(body.starts_with("## Coverage Report"));
        assert!(body.contains("|src/one.js|100|100|100|100||✅|"));
        assert!(body.contains(&format!("> {}", config.report.success_message)));
        assert!(reporter.warnings.is_empty());
    }

    #[test]
    fn test_failing_branches() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), &[file_xml("src/one.js", 0)]);

        let mut reporter = BufferedReporter::default();
        let outcome = run(&Config::default(), &context(&dir, &["src/one.js"]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::Reported { passed: false, files: 1 });
        let body = &reporter.markdown[0];
        assert!(body.contains("|src/one.js|100|0|100|100||❌|"));
        assert!(body.contains("Coverage threshold for branches (80%) not met: 0%"));
    }

    #[test]
    fn test_overflow_rows() {
        let dir = tempdir().unwrap();
        let names: Vec<String> = (0..10).map(|i| format!("src/f{}.js", i)).collect();
        let files: Vec<String> = names.iter().map(|n| file_xml(n, 10)).collect();
        write_report(dir.path(), &files);

        let modified: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut reporter = BufferedReporter::default();
        let outcome = run(&Config::default(), &context(&dir, &modified), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::Reported { passed: true, files: 10 });
        assert!(reporter.markdown[0].contains("<summary>and 5 more...</summary>"));
    }

    #[test]
    fn test_missing_report_warns() {
        let dir = tempdir().unwrap();
        let mut reporter = BufferedReporter::default();
        let outcome = run(&Config::default(), &context(&dir, &["src/one.js"]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::NoReport);
        assert!(reporter.markdown.is_empty());
        assert_eq!(reporter.warnings.len(), 1);
        assert!(reporter.warnings[0].starts_with("No coverage report"));
    }

    #[test]
    fn test_missing_report_silent_when_disabled() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.report.warn_on_no_report = false;

        let mut reporter = BufferedReporter::default();
        let outcome = run(&config, &context(&dir, &[]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::NoReport);
        assert!(reporter.warnings.is_empty());
    }

    #[test]
    fn test_no_relevant_files_posts_nothing() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), &[file_xml("src/one.js", 10)]);

        let mut reporter = BufferedReporter::default();
        let outcome = run(&Config::default(), &context(&dir, &["README.md"]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::NoRelevantFiles);
        assert!(reporter.markdown.is_empty());
        assert!(reporter.warnings.is_empty());
    }

    #[test]
    fn test_missing_files_warning() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), &[file_xml("src/one.js", 10)]);

        let mut config = Config::default();
        config.report.warn_on_missing_files = true;

        let mut reporter = BufferedReporter::default();
        let ctx = context(&dir, &["src/one.js", "src/two.js", "docs/guide.md"]);
        let outcome = run(&config, &ctx, &mut reporter).unwrap();

        assert!(matches!(outcome, Outcome::Reported { files: 1, .. }));
        assert_eq!(
            reporter.warnings,
            vec!["Could not find coverage data for 2 changed files in the report.".to_string()]
        );

        // still warns when nothing relevant is left to post
        let mut reporter = BufferedReporter::default();
        let outcome = run(&config, &context(&dir, &["src/two.js"]), &mut reporter).unwrap();
        assert_eq!(outcome, Outcome::NoRelevantFiles);
        assert_eq!(reporter.warnings, vec![missing_files_warning(1)]);
    }

    #[test]
    fn test_show_all_files() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), &[file_xml("src/one.js", 10), file_xml("src/two.js", 10)]);

        let mut config = Config::default();
        config.report.show_all_files = true;

        let mut reporter = BufferedReporter::default();
        let outcome = run(&config, &context(&dir, &[]), &mut reporter).unwrap();

        assert_eq!(outcome, Outcome::Reported { passed: true, files: 2 });
        assert!(reporter.markdown[0].contains("|Files|% Stmts|"));
    }

    #[test]
    fn test_malformed_report_is_fatal() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("coverage")).unwrap();
        fs::write(dir.path().join("coverage/clover.xml"), "<coverage><project></coverage>").unwrap();

        let mut reporter = BufferedReporter::default();
        assert!(run(&Config::default(), &context(&dir, &["src/one.js"]), &mut reporter).is_err());
        assert!(reporter.markdown.is_empty());
    }

    #[test]
    fn test_commit_links() {
        let dir = tempdir().unwrap();
        write_report(dir.path(), &[file_xml("src/one.js", 10)]);

        let mut ctx = context(&dir, &["src/one.js"]);
        ctx.commit_sha = Some("deadbeef".to_string());

        let mut reporter = BufferedReporter::default();
        run(&Config::default(), &ctx, &mut reporter).unwrap();
        assert!(reporter.markdown[0].contains("[src/one.js](../blob/deadbeef/src/one.js)"));
    }

    #[test]
    fn test_commit_links_from_subdirectory() {
        let root = tempdir().unwrap();
        let pkg = root.path().join("packages/web");
        let abs = pkg.join("src/one.js");
        write_report(&pkg, &[file_xml(&abs.display().to_string(), 10)]);

        let ctx = ReviewContext {
            cwd: pkg.clone(),
            created_files: vec!["src/one.js".to_string()],
            modified_files: vec![],
            commit_sha: Some("deadbeef".to_string()),
            repo_root: Some(root.path().to_path_buf()),
        };

        let mut reporter = BufferedReporter::default();
        run(&Config::default(), &ctx, &mut reporter).unwrap();

        // display path stays cwd-relative, the link is from the repository root
        assert!(reporter.markdown[0]
            .contains("[src/one.js](../blob/deadbeef/packages/web/src/one.js)"));
    }
}

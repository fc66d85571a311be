//! Markdown report for a pull request
//!
//! Provides:
//! - Path shortening for table cells
//! - The per-file table
//! - The aggregate pass/fail summary

mod path;
mod summary;
mod table;

pub use path::*;
pub use summary::*;
pub use table::*;

use crate::changes::RelevantFile;
use crate::config::Config;

pub const REPORT_HEADING: &str = "## Coverage Report";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub markdown: String,
    pub passed: bool,
}

/// Summary first, then the table, under a single heading
pub fn render_report(files: &[RelevantFile], config: &Config, commit_sha: Option<&str>) -> RenderedReport {
    let summary = render_summary(files, config);
    let table = render_table(files, config, commit_sha);

    RenderedReport {
        markdown: format!("{}\n\n{}\n\n{}\n", REPORT_HEADING, summary.markdown, table),
        passed: summary.passed(),
    }
}

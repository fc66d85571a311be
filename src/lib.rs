//! pr-coverage - Clover coverage reports for pull requests
//!
//! A library for turning a Clover XML coverage report into a pull request
//! comment:
//! - Loading and flattening nested project/package reports
//! - Filtering to the files a change created or modified
//! - Per-file and aggregate percentages checked against thresholds
//! - A Markdown table plus pass/fail summary, posted through a [`Reporter`]

pub mod changes;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod git;
pub mod notifications;
pub mod plugin;
pub mod report;

pub use changes::{filter_relevant, repository_path, ChangeSet, RelevantFile};
pub use config::Config;
pub use coverage::{load_report, percentage, CoverageNode, FileRecord, Metric, MetricPercentages, Percentage, Thresholds};
pub use plugin::{run, Outcome, Reporter, ReviewContext};
pub use report::{render_report, shorten_path, RenderedReport};

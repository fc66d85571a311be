//! Coverage module
//!
//! Provides:
//! - Clover XML loading
//! - Flattening of nested project/package groups into file records
//! - Percentage metrics and threshold validation

mod clover;
mod metrics;
mod threshold;

pub use clover::*;
pub use metrics::*;
pub use threshold::*;

/// Normalized Clover report tree.
///
/// A node either groups further nodes (`<project>` / `<package>` levels) or
/// holds the `<file>` records at the bottom of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageNode {
    Group(Vec<CoverageNode>),
    Files(Vec<FileRecord>),
}

impl CoverageNode {
    /// Flatten the tree into its file records, in document order
    pub fn flatten(&self) -> Vec<&FileRecord> {
        let mut files = Vec::new();
        self.collect_files(&mut files);
        files
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileRecord>) {
        match self {
            CoverageNode::Group(children) => {
                for child in children {
                    child.collect_files(out);
                }
            }
            CoverageNode::Files(files) => out.extend(files.iter()),
        }
    }
}

/// Coverage data for a single `<file>` element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FileRecord {
    pub path: String,
    pub metrics: FileMetrics,
    pub lines: Vec<LineRecord>,
}

impl FileRecord {
    /// Line numbers that were never executed, in report order
    pub fn uncovered_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.lines
            .iter()
            .filter(|line| !line.is_covered())
            .map(|line| line.number)
    }

    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }
}

/// Raw counters from a file's `<metrics>` element.
///
/// Missing or malformed attributes are kept as `NaN` so the percentage
/// calculation can tell them apart from a real zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileMetrics {
    pub statements: f64,
    pub covered_statements: f64,
    pub conditionals: f64,
    pub covered_conditionals: f64,
    pub methods: f64,
    pub covered_methods: f64,
}

impl Default for FileMetrics {
    fn default() -> Self {
        Self {
            statements: f64::NAN,
            covered_statements: f64::NAN,
            conditionals: f64::NAN,
            covered_conditionals: f64::NAN,
            methods: f64::NAN,
            covered_methods: f64::NAN,
        }
    }
}

/// A single `<line>` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub number: u32,
    pub count: u64,
    pub kind: LineKind,
}

impl LineRecord {
    pub fn is_covered(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LineKind {
    #[default]
    Statement,
    Conditional,
    Method,
    Other,
}

impl LineKind {
    pub fn from_attr(value: &str) -> Self {
        match value {
            "stmt" => LineKind::Statement,
            "cond" => LineKind::Conditional,
            "method" => LineKind::Method,
            _ => LineKind::Other,
        }
    }
}

//! Percentage metrics for files and aggregates

use std::fmt;
use std::ops::{Add, AddAssign};

use super::FileRecord;

/// A coverage percentage, or `Undefined` when the counters make no sense
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Percentage {
    Value(f64),
    Undefined,
}

impl Percentage {
    /// `Undefined` always meets a threshold.
    pub fn meets(self, threshold: f64) -> bool {
        match self {
            Percentage::Value(v) => v >= threshold,
            Percentage::Undefined => true,
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Percentage::Value(v) => write!(f, "{}", v),
            Percentage::Undefined => f.write_str("-"),
        }
    }
}

/// Percentage of `covered` over `total`, rounded to two decimals.
///
/// A zero or non-numeric total counts as fully covered.
pub fn percentage(covered: f64, total: f64) -> Percentage {
    if total == 0.0 || total.is_nan() {
        return Percentage::Value(100.0);
    }

    let raw = covered / total * 100.0;
    if raw.is_nan() {
        return Percentage::Undefined;
    }

    Percentage::Value((raw * 100.0).round() / 100.0)
}

/// The four metrics shown per file and in the summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Statements,
    Branches,
    Functions,
    Lines,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Statements,
        Metric::Branches,
        Metric::Functions,
        Metric::Lines,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Statements => "statements",
            Metric::Branches => "branches",
            Metric::Functions => "functions",
            Metric::Lines => "lines",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPercentages {
    pub statements: Percentage,
    pub branches: Percentage,
    pub functions: Percentage,
    pub lines: Percentage,
}

impl MetricPercentages {
    pub fn get(&self, metric: Metric) -> Percentage {
        match metric {
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
            Metric::Functions => self.functions,
            Metric::Lines => self.lines,
        }
    }
}

/// Raw covered/total counters, summed before any percentage is taken
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoverageTotals {
    pub statements: f64,
    pub covered_statements: f64,
    pub conditionals: f64,
    pub covered_conditionals: f64,
    pub methods: f64,
    pub covered_methods: f64,
    pub lines: f64,
    pub covered_lines: f64,
}

impl CoverageTotals {
    pub fn from_file(file: &FileRecord) -> Self {
        let m = &file.metrics;
        Self {
            statements: m.statements,
            covered_statements: m.covered_statements,
            conditionals: m.conditionals,
            covered_conditionals: m.covered_conditionals,
            methods: m.methods,
            covered_methods: m.covered_methods,
            lines: file.lines.len() as f64,
            covered_lines: file.lines.iter().filter(|l| l.is_covered()).count() as f64,
        }
    }

    /// Weighted aggregate: counters are summed across all files
    pub fn aggregate<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a FileRecord>,
    {
        files
            .into_iter()
            .map(Self::from_file)
            .fold(Self::default(), |acc, totals| acc + totals)
    }

    pub fn percentages(&self) -> MetricPercentages {
        MetricPercentages {
            statements: percentage(self.covered_statements, self.statements),
            branches: percentage(self.covered_conditionals, self.conditionals),
            functions: percentage(self.covered_methods, self.methods),
            lines: percentage(self.covered_lines, self.lines),
        }
    }
}

impl Add for CoverageTotals {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for CoverageTotals {
    fn add_assign(&mut self, other: Self) {
        self.statements += other.statements;
        self.covered_statements += other.covered_statements;
        self.conditionals += other.conditionals;
        self.covered_conditionals += other.covered_conditionals;
        self.methods += other.methods;
        self.covered_methods += other.covered_methods;
        self.lines += other.lines;
        self.covered_lines += other.covered_lines;
    }
}

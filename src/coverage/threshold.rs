//! Coverage threshold validation

use serde::Deserialize;
use std::fmt;

use super::{Metric, MetricPercentages, Percentage};

pub const DEFAULT_THRESHOLD: f64 = 80.0;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// Minimum percentage per metric
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Thresholds {
    #[serde(default = "default_threshold")]
    pub statements: f64,
    #[serde(default = "default_threshold")]
    pub branches: f64,
    #[serde(default = "default_threshold")]
    pub functions: f64,
    #[serde(default = "default_threshold")]
    pub lines: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            statements: DEFAULT_THRESHOLD,
            branches: DEFAULT_THRESHOLD,
            functions: DEFAULT_THRESHOLD,
            lines: DEFAULT_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Statements => self.statements,
            Metric::Branches => self.branches,
            Metric::Functions => self.functions,
            Metric::Lines => self.lines,
        }
    }
}

/// A metric that fell below its threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdMiss {
    pub metric: Metric,
    pub threshold: f64,
    pub actual: f64,
}

impl fmt::Display for ThresholdMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Coverage threshold for {} ({}%) not met: {}%",
            self.metric, self.threshold, self.actual
        )
    }
}

/// Result of threshold validation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdResult {
    pub misses: Vec<ThresholdMiss>,
}

impl ThresholdResult {
    pub fn passed(&self) -> bool {
        self.misses.is_empty()
    }
}

/// Validate every metric against its threshold
pub fn validate_threshold(thresholds: &Thresholds, percentages: &MetricPercentages) -> ThresholdResult {
    let misses = Metric::ALL
        .iter()
        .filter_map(|&metric| {
            let threshold = thresholds.get(metric);
            let pct = percentages.get(metric);
            match pct {
                Percentage::Value(actual) if !pct.meets(threshold) => Some(ThresholdMiss {
                    metric,
                    threshold,
                    actual,
                }),
                _ => None,
            }
        })
        .collect();

    ThresholdResult { misses }
}

//! Pass/fail banner for the aggregate of all reported files

use crate::changes::RelevantFile;
use crate::config::Config;
use crate::coverage::{validate_threshold, CoverageTotals, MetricPercentages, ThresholdResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub markdown: String,
    pub percentages: MetricPercentages,
    pub result: ThresholdResult,
}

impl Summary {
    pub fn passed(&self) -> bool {
        self.result.passed()
    }
}

pub fn render_summary(files: &[RelevantFile], config: &Config) -> Summary {
    let percentages = CoverageTotals::aggregate(files.iter().map(|f| f.record)).percentages();
    let result = validate_threshold(&config.thresholds, &percentages);

    let markdown = if result.passed() {
        format!("> {}", config.report.success_message)
    } else {
        let mut out = format!("> {}", config.report.failure_message);
        if !result.misses.is_empty() {
            let misses: Vec<String> = result.misses.iter().map(|m| m.to_string()).collect();
            out.push_str(&format!("\n\n```\n{}\n```", misses.join("\n")));
        }
        out
    };

    Summary {
        markdown,
        percentages,
        result,
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coverage::{Metric, Thresholds, DEFAULT_REPORT_PATH};

pub const CONFIG_FILE: &str = "pr-coverage.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub github: GithubConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Location of the Clover report, relative to the working directory
    pub path: String,
    pub success_message: String,
    pub failure_message: String,
    /// Rows shown before the rest collapse into a `<details>` block
    pub max_rows: usize,
    /// Uncovered line numbers listed per file
    pub max_uncovered: usize,
    pub show_all_files: bool,
    pub warn_on_no_report: bool,
    pub warn_on_missing_files: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_REPORT_PATH.to_string(),
            success_message: ":+1: Test coverage is looking good.".to_string(),
            failure_message: "Test coverage is looking a little low for the files created or modified in this PR, perhaps we need to improve this.".to_string(),
            max_rows: 5,
            max_uncovered: 10,
            show_all_files: false,
            warn_on_no_report: true,
            warn_on_missing_files: false,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubConfig {
    /// Falls back to `GITHUB_TOKEN`
    #[serde(default)]
    pub token: Option<String>,
    /// Falls back to `GITHUB_API_URL`, then the public API
    #[serde(default)]
    pub api_url: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Load an explicit config file, or `pr-coverage.toml` from `cwd` when
    /// present, or fall back to defaults
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = cwd.join(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Also run after command-line overrides are applied
    pub fn validate(&self) -> Result<()> {
        for metric in Metric::ALL {
            let threshold = self.thresholds.get(metric);
            if !(0.0..=100.0).contains(&threshold) {
                anyhow::bail!(
                    "thresholds.{} must be between 0 and 100, got {}",
                    metric,
                    threshold
                );
            }
        }

        if self.report.path.trim().is_empty() {
            anyhow::bail!("report.path must not be empty");
        }

        Ok(())
    }

    /// Absolute location of the coverage report, with environment variables expanded
    pub fn report_path(&self, cwd: &Path) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.report.path)
            .with_context(|| format!("Failed to expand report path: {}", self.report.path))?;

        Ok(cwd.join(expanded.as_ref()))
    }
}

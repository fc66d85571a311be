//! Notifications module
//!
//! Provides:
//! - Console output (Markdown on stdout, warnings on stderr)
//! - In-memory buffering for later delivery
//! - GitHub pull request comments

mod github;

pub use github::*;

use colored::Colorize;

use crate::plugin::Reporter;

/// Print the report to stdout and warnings to stderr
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn markdown(&mut self, body: &str) {
        println!("{}", body);
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

/// Collect everything a run produces
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedReporter {
    pub markdown: Vec<String>,
    pub warnings: Vec<String>,
}

impl BufferedReporter {
    /// Single comment body: the report followed by warnings as a quote block
    pub fn comment_body(&self) -> Option<String> {
        if self.markdown.is_empty() && self.warnings.is_empty() {
            return None;
        }

        let mut body = self.markdown.join("\n\n");
        if !self.warnings.is_empty() {
            if !body.is_empty() {
                body.push_str("\n\n");
            }
            let quoted: Vec<String> = self
                .warnings
                .iter()
                .map(|w| format!("> :warning: {}", w))
                .collect();
            body.push_str(&quoted.join("\n>\n"));
        }

        Some(body)
    }
}

impl Reporter for BufferedReporter {
    fn markdown(&mut self, body: &str) {
        self.markdown.push(body.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

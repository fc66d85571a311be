use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pr_coverage::cli::{review_context, should_fail, Cli};
use pr_coverage::config::Config;
use pr_coverage::notifications::{post_pr_comment, BufferedReporter, ConsoleReporter};
use pr_coverage::plugin;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(true) => std::process::exit(1),
        Ok(false) => {}
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Returns whether the process should exit with a failure status
fn run() -> Result<bool> {
    let cli = Cli::parse();

    let cwd = cli.working_dir()?;
    let config = cli.load_config(&cwd)?;

    let ctx = review_context(&cli, cwd)?;
    debug!(
        created = ctx.created_files.len(),
        modified = ctx.modified_files.len(),
        sha = ctx.commit_sha.as_deref().unwrap_or("-"),
        "review context ready"
    );

    let outcome = match cli.post {
        Some(pr_number) => {
            let mut reporter = BufferedReporter::default();
            let outcome = plugin::run(&config, &ctx, &mut reporter)?;
            match reporter.comment_body() {
                Some(body) => {
                    post_comment(&config, pr_number, &body)?;
                    println!("{} Posted coverage report to #{}", "✓".green(), pr_number);
                }
                None => println!("{}", "Nothing to report".dimmed()),
            }
            outcome
        }
        None => plugin::run(&config, &ctx, &mut ConsoleReporter)?,
    };

    Ok(should_fail(outcome, cli.fail_on_threshold))
}

#[tokio::main]
async fn post_comment(config: &Config, pr_number: u64, body: &str) -> Result<()> {
    post_pr_comment(&config.github, pr_number, body).await
}

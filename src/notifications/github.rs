//! GitHub pull request comments

use anyhow::Result;
use serde_json::json;
use std::env;
use tracing::debug;

use crate::config::GithubConfig;

const DEFAULT_API_URL: &str = "https://api.github.com";

/// Post `body` as a comment on pull request `pr_number`
pub async fn post_pr_comment(config: &GithubConfig, pr_number: u64, body: &str) -> Result<()> {
    // Get token from config or environment
    let token = config.token.clone()
        .or_else(|| env::var("GITHUB_TOKEN").ok())
        .ok_or_else(|| anyhow::anyhow!("GitHub token not found"))?;

    // Set by GitHub Actions
    let repo = env::var("GITHUB_REPOSITORY")
        .ok()
        .ok_or_else(|| anyhow::anyhow!("GITHUB_REPOSITORY not set"))?;

    let api_url = config.api_url.clone()
        .or_else(|| env::var("GITHUB_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let url = comments_url(&api_url, &repo, pr_number);
    debug!(%url, "posting coverage comment");

    let payload = json!({ "body": body });

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header("Authorization", format!("token {}", token))
        .header("User-Agent", "pr-coverage")
        .header("Accept", "application/vnd.github.v3+json")
        .json(&payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        anyhow::bail!("GitHub comment failed: {} - {}", status, text);
    }

    Ok(())
}

/// Pull requests share the issue comment endpoint
fn comments_url(api_url: &str, repo: &str, pr_number: u64) -> String {
    format!(
        "{}/repos/{}/issues/{}/comments",
        api_url.trim_end_matches('/'),
        repo,
        pr_number
    )
}

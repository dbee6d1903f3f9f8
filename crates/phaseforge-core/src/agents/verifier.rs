//! Verifier agent - commit-message verification against GitHub
//!
//! A read-only predicate over a public repository: fetch the most recent
//! commit and check that the phase's expected commit message appears as a
//! case-insensitive substring of its message. Substring rather than exact
//! match tolerates prefixes and suffixes such as conventional-commit
//! scopes or squash-merge annotations. Access is anonymous, so only
//! public repositories are verifiable.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::GithubConfig;
use crate::error::{Error, Result};
use crate::plan::Phase;

/// Verifier agent backed by the GitHub REST API
#[derive(Debug, Clone)]
pub struct VerifierAgent {
    http_client: HttpClient,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

impl VerifierAgent {
    /// Create a verifier agent with the given configuration
    pub fn new(config: GithubConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            // GitHub rejects requests without a User-Agent
            .user_agent("phaseforge")
            .build()?;

        Ok(Self {
            http_client,
            api_base: config.api_base,
        })
    }

    /// Verify that the latest commit of `repo_url` matches the phase's
    /// expected commit message.
    ///
    /// Returns false for malformed URLs (without any network call), empty
    /// repositories, non-matching messages, and any API or transport error.
    pub async fn verify_phase(&self, repo_url: &str, phase: &Phase) -> bool {
        info!(phase = phase.phase, repo_url = %repo_url, "Verifying phase");

        let Some((owner, repo)) = parse_repo_slug(repo_url) else {
            warn!(repo_url = %repo_url, "Invalid GitHub repository URL");
            return false;
        };

        match self.latest_commit_message(&owner, &repo).await {
            Ok(Some(message)) => {
                let matched = message_matches(&phase.commit_message, &message);
                debug!(
                    expected = %phase.commit_message.trim(),
                    actual = %message.trim(),
                    matched,
                    "Compared commit messages"
                );
                matched
            }
            Ok(None) => {
                warn!(owner = %owner, repo = %repo, "Repository has no commits");
                false
            }
            Err(e) => {
                warn!(owner = %owner, repo = %repo, error = %e, "GitHub lookup failed");
                false
            }
        }
    }

    /// Fetch the most recent commit message, `None` for an empty repo
    async fn latest_commit_message(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/{}/commits", self.api_base, owner, repo);

        let response = self
            .http_client
            .get(&url)
            .query(&[("per_page", "1")])
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();

        // GitHub answers 409 for a repository with no commits
        if status == reqwest::StatusCode::CONFLICT {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidInput(format!(
                "GitHub API error {}: {}",
                status, body
            )));
        }

        let commits: Vec<CommitItem> = response.json().await?;
        Ok(commits.into_iter().next().map(|c| c.commit.message))
    }
}

/// Extract `(owner, repo)` from a repository URL.
///
/// Strips one trailing `.git` suffix and takes the last two path
/// segments; fewer than two non-empty segments means the URL is malformed.
fn parse_repo_slug(repo_url: &str) -> Option<(String, String)> {
    let clean = repo_url
        .trim_end_matches('/')
        .strip_suffix(".git")
        .unwrap_or_else(|| repo_url.trim_end_matches('/'));

    let mut segments = clean.rsplit('/').filter(|s| !s.is_empty());
    let repo = segments.next()?;
    let owner = segments.next()?;

    // Rejects scheme remnants ("https:") and SSH-style "host:owner" forms
    if owner.contains(':') {
        return None;
    }

    Some((owner.to_string(), repo.to_string()))
}

/// Case-insensitive substring match between expected and actual messages
fn message_matches(expected: &str, actual: &str) -> bool {
    actual
        .trim()
        .to_lowercase()
        .contains(&expected.trim().to_lowercase())
}

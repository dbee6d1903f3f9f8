//! Research agent - Wikipedia search and extract
//!
//! Performs light research in two steps against the MediaWiki API: a
//! full-text search for the best-matching article title, then an
//! introduction extract for that title. The summary is truncated to the
//! configured character limit with a trailing ellipsis.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ResearchConfig;
use crate::error::Result;

use super::traits::Research;

/// Returned when the search step finds no articles
const NO_ARTICLES: &str = "No Wikipedia articles found.";

/// Research agent backed by the MediaWiki API
#[derive(Debug, Clone)]
pub struct ResearchAgent {
    http_client: HttpClient,
    config: ResearchConfig,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    pages: HashMap<String, ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    extract: Option<String>,
}

impl ResearchAgent {
    /// Create a research agent with the given configuration
    pub fn new(config: ResearchConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Fallible inner flow; `research_topic` converts errors to text
    async fn try_research(&self, topic: &str) -> Result<String> {
        debug!(topic = %topic, "Searching Wikipedia");

        let search: SearchResponse = self
            .http_client
            .get(&self.config.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "search"),
                ("srsearch", topic),
                ("srlimit", "1"),
            ])
            .send()
            .await?
            .json()
            .await?;

        let Some(hit) = search
            .query
            .map(|q| q.search)
            .unwrap_or_default()
            .into_iter()
            .next()
        else {
            return Ok(NO_ARTICLES.to_string());
        };

        info!(title = %hit.title, "Found Wikipedia article");

        let extract: ExtractResponse = self
            .http_client
            .get(&self.config.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "true"),
                ("explaintext", "true"),
                ("titles", hit.title.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let summary = extract
            .query
            .and_then(|q| q.pages.into_values().next())
            .and_then(|p| p.extract)
            .unwrap_or_else(|| "No summary found.".to_string());

        Ok(truncate_summary(&summary, self.config.summary_limit))
    }
}

#[async_trait]
impl Research for ResearchAgent {
    async fn research_topic(&self, topic: &str) -> String {
        match self.try_research(topic).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(topic = %topic, error = %e, "Research failed");
                format!("Research failed: {}", e)
            }
        }
    }
}

/// Truncate to at most `limit` characters, appending an ellipsis marker.
///
/// Counts characters rather than bytes so multi-byte text never splits
/// inside a code point.
fn truncate_summary(summary: &str, limit: usize) -> String {
    let mut truncated: String = summary.chars().take(limit).collect();
    truncated.push_str("...");
    truncated
}

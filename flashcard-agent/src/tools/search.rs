use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use flashcard_core::error::ToolError;
use flashcard_core::tool::{SearchClient, Tool, ToolSpec};

pub const NO_RESULTS: &str = "No good search result found";

const WEB_SEARCH: &str = "Web Search";
const DUCKDUCKGO_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// Research tool that forwards its input to a [`SearchClient`].
pub struct WebSearchTool {
    client: Arc<dyn SearchClient>,
}

impl WebSearchTool {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: WEB_SEARCH.into(),
            description: "Useful for searching the web for information about a specific topic"
                .into(),
        }
    }

    async fn call(&self, input: &str) -> Result<String, ToolError> {
        let query = input.trim();
        tracing::debug!(query = %query, "web_search_started");
        let result = self.client.search(query).await?;
        tracing::debug!(result_len = result.len(), "web_search_finished");
        Ok(result)
    }
}

/// DuckDuckGo Instant Answer API client.
pub struct DuckDuckGoSearchClient {
    http: reqwest::Client,
    endpoint: String,
    max_results: usize,
}

impl DuckDuckGoSearchClient {
    pub fn new(timeout: Duration, max_results: usize) -> Result<Self, ToolError> {
        Self::with_endpoint(DUCKDUCKGO_ENDPOINT, timeout, max_results)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        timeout: Duration,
        max_results: usize,
    ) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("flashcardd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| execution_failed(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            max_results: max_results.max(1),
        })
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoSearchClient {
    async fn search(&self, query: &str) -> Result<String, ToolError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ToolError::Timeout {
                        tool_id: WEB_SEARCH.into(),
                        elapsed: Duration::ZERO,
                    }
                } else {
                    execution_failed(format!("request failed: {err}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(execution_failed(format!("search returned HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|err| execution_failed(format!("failed to read response body: {err}")))?;
        summarize_instant_answer(&body, self.max_results)
    }
}

/// Search backend used when outbound search is turned off.
pub struct DisabledSearchClient;

#[async_trait]
impl SearchClient for DisabledSearchClient {
    async fn search(&self, _query: &str) -> Result<String, ToolError> {
        Ok(NO_RESULTS.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct InstantAnswer {
    abstract_text: String,
    answer: serde_json::Value,
    definition: String,
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct RelatedTopic {
    text: Option<String>,
    topics: Vec<RelatedTopic>,
}

impl RelatedTopic {
    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = self.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            out.push(text);
        }
        for nested in &self.topics {
            nested.collect_texts(out);
        }
    }
}

/// Flatten an Instant Answer payload into at most `max_results` snippets.
pub(crate) fn summarize_instant_answer(body: &str, max_results: usize) -> Result<String, ToolError> {
    let parsed: InstantAnswer = serde_json::from_str(body)
        .map_err(|err| execution_failed(format!("malformed search response: {err}")))?;

    let answer = match &parsed.answer {
        serde_json::Value::String(text) => Some(text.as_str()),
        _ => None,
    };

    let mut snippets: Vec<&str> = [Some(parsed.abstract_text.as_str()), answer, Some(parsed.definition.as_str())]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect();
    for topic in &parsed.related_topics {
        topic.collect_texts(&mut snippets);
    }
    snippets.truncate(max_results);

    if snippets.is_empty() {
        Ok(NO_RESULTS.to_string())
    } else {
        Ok(snippets.join("\n"))
    }
}

fn execution_failed(message: String) -> ToolError {
    ToolError::ExecutionFailed {
        tool_id: WEB_SEARCH.into(),
        message,
    }
}

use std::sync::LazyLock;

use regex::Regex;
use reqwest::blocking::Client;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{parameters_schema, USER_AGENT};
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;

pub const DUCKDUCKGO_HTML_ENDPOINT: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_MAX_RESULTS: usize = 5;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#).expect("valid regex"));
static SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</(?:a|div)>"#).expect("valid regex")
});
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#).expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// The search query
    pub query: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// Web search backed by the DuckDuckGo HTML endpoint, which needs no API key.
#[derive(Debug, Clone)]
pub struct WebSearch {
    client: Client,
    endpoint: String,
    max_results: usize,
}

impl WebSearch {
    pub const NAME: &'static str = "search";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: DUCKDUCKGO_HTML_ENDPOINT.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn definition() -> Tool {
        Tool::new(
            Self::NAME,
            "Search the web for information. Returns titles, snippets and URLs of the top results.",
            parameters_schema::<SearchArgs>(),
        )
    }

    pub fn run(&self, args: SearchArgs) -> AgentResult<String> {
        tracing::debug!(query = %args.query, "web search");

        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[("q", args.query.as_str())])
            .send()
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Search request failed: {}",
                status
            )));
        }

        let html = response
            .text()
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;
        let results = extract_results(&html, self.max_results);

        if results.is_empty() {
            Ok(format!("No results found for: {}", args.query))
        } else {
            Ok(results
                .iter()
                .map(|r| format!("**{}**\n{}\nURL: {}", r.title, r.snippet, r.url))
                .collect::<Vec<_>>()
                .join("\n\n"))
        }
    }
}

/// Pull result blocks out of the DuckDuckGo HTML page
fn extract_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    html.split("result__body")
        .skip(1)
        .filter_map(|chunk| {
            let title = capture(&TITLE, chunk);
            if title.is_empty() {
                return None;
            }
            Some(SearchResult {
                title,
                snippet: capture(&SNIPPET, chunk),
                url: capture(&URL, chunk),
            })
        })
        .take(max_results)
        .collect()
}

fn capture(re: &Regex, chunk: &str) -> String {
    re.captures(chunk)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .unwrap_or_default()
}

fn clean_text(fragment: &str) -> String {
    let text = TAG.replace_all(fragment, "");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    html_decode(&text)
}

fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

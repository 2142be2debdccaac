use reqwest::blocking::Client;
use schemars::JsonSchema;
use serde::Deserialize;

use super::{parameters_schema, USER_AGENT};
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;

pub const WIKIPEDIA_API_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";
pub const DEFAULT_MAX_CHARS: usize = 100;
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WikipediaArgs {
    /// Topic or page title to look up on Wikipedia
    pub query: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank, lowest is best
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: String,
}

/// Looks up the best matching Wikipedia article and returns the start of its intro.
#[derive(Debug, Clone)]
pub struct WikipediaLookup {
    client: Client,
    endpoint: String,
    max_chars: usize,
}

impl WikipediaLookup {
    pub const NAME: &'static str = "wikipedia";

    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: WIKIPEDIA_API_ENDPOINT.to_string(),
            max_chars: DEFAULT_MAX_CHARS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    pub fn definition() -> Tool {
        Tool::new(
            Self::NAME,
            "Look up a topic on Wikipedia. Returns the title and the beginning of the introduction of the best matching article.",
            parameters_schema::<WikipediaArgs>(),
        )
    }

    pub fn run(&self, args: WikipediaArgs) -> AgentResult<String> {
        tracing::debug!(query = %args.query, "wikipedia lookup");

        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", args.query.as_str()),
                ("gsrlimit", "1"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::ExecutionError(format!(
                "Wikipedia request failed: {}",
                status
            )));
        }

        let body: QueryResponse = response
            .json()
            .map_err(|e| AgentError::ExecutionError(e.to_string()))?;

        let page = body
            .query
            .and_then(|q| q.pages.into_iter().min_by_key(|page| page.index));

        match page {
            Some(page) => Ok(truncate(
                &format!("Page: {}\nSummary: {}", page.title, page.extract.trim()),
                self.max_chars,
            )),
            None => Ok(NO_RESULT.to_string()),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

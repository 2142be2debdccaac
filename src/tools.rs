//! The closed set of tools the research agent may call.
//!
//! Every tool is advertised to the model through the same contract: a name, a
//! description and a JSON schema for its arguments. Calls are dispatched by name
//! onto [`ResearchTool`] variants, never by reflection.

use std::path::PathBuf;

use reqwest::blocking::Client;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;

pub mod save;
pub mod search;
pub mod wikipedia;

pub use save::SaveToFile;
pub use search::WebSearch;
pub use wikipedia::WikipediaLookup;

pub const USER_AGENT: &str = concat!("research-agent/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub enum ResearchTool {
    Search(WebSearch),
    Wikipedia(WikipediaLookup),
    Save(SaveToFile),
}

impl ResearchTool {
    pub fn name(&self) -> &'static str {
        match self {
            ResearchTool::Search(_) => WebSearch::NAME,
            ResearchTool::Wikipedia(_) => WikipediaLookup::NAME,
            ResearchTool::Save(_) => SaveToFile::NAME,
        }
    }

    pub fn definition(&self) -> Tool {
        match self {
            ResearchTool::Search(_) => WebSearch::definition(),
            ResearchTool::Wikipedia(_) => WikipediaLookup::definition(),
            ResearchTool::Save(_) => SaveToFile::definition(),
        }
    }

    /// Run the tool with the raw arguments the model supplied
    pub fn call(&self, parameters: &Value) -> AgentResult<String> {
        match self {
            ResearchTool::Search(tool) => tool.run(parse_args(parameters)?),
            ResearchTool::Wikipedia(tool) => tool.run(parse_args(parameters)?),
            ResearchTool::Save(tool) => tool.run(parse_args(parameters)?),
        }
    }
}

/// Settings shared by the standard tool set
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub output_file: PathBuf,
    pub wiki_max_chars: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from(save::DEFAULT_OUTPUT_FILE),
            wiki_max_chars: wikipedia::DEFAULT_MAX_CHARS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSet {
    tools: Vec<ResearchTool>,
}

impl ToolSet {
    pub fn new(tools: Vec<ResearchTool>) -> Self {
        Self { tools }
    }

    /// Web search, Wikipedia lookup and file save, sharing one HTTP client
    pub fn standard(client: Client, config: &ToolConfig) -> Self {
        Self::new(vec![
            ResearchTool::Search(WebSearch::new(client.clone())),
            ResearchTool::Wikipedia(
                WikipediaLookup::new(client).with_max_chars(config.wiki_max_chars),
            ),
            ResearchTool::Save(SaveToFile::new(config.output_file.clone())),
        ])
    }

    pub fn definitions(&self) -> Vec<Tool> {
        self.tools.iter().map(ResearchTool::definition).collect()
    }

    pub fn find(&self, name: &str) -> Option<&ResearchTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn dispatch(&self, name: &str, parameters: &Value) -> AgentResult<String> {
        let tool = self
            .find(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.call(parameters)
    }
}

/// JSON schema for `T` with the draft and title annotations removed
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let mut value = schemars::schema_for!(T).to_value();
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    value
}

fn parse_args<T: DeserializeOwned>(parameters: &Value) -> AgentResult<T> {
    serde_json::from_value(parameters.clone())
        .map_err(|e| AgentError::InvalidParameters(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tool_set(dir: &std::path::Path) -> ToolSet {
        ToolSet::standard(
            Client::new(),
            &ToolConfig {
                output_file: dir.join("out.txt"),
                wiki_max_chars: 100,
            },
        )
    }

    #[test]
    fn test_standard_tool_names() {
        let dir = tempfile::tempdir().unwrap();
        let names: Vec<String> = tool_set(dir.path())
            .definitions()
            .into_iter()
            .map(|tool| tool.name)
            .collect();
        assert_eq!(names, vec!["search", "wikipedia", "save_text_to_file"]);
    }

    #[test]
    fn test_definitions_have_object_schemas() {
        let dir = tempfile::tempdir().unwrap();
        for tool in tool_set(dir.path()).definitions() {
            assert_eq!(tool.parameters["type"], "object", "{}", tool.name);
            assert!(tool.parameters.get("$schema").is_none());
            assert!(!tool.description.is_empty());
        }
    }

    #[test]
    fn test_dispatch_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool_set(dir.path())
            .dispatch("calculator", &json!({}))
            .unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("calculator".to_string()));
    }

    #[test]
    fn test_dispatch_invalid_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let err = tool_set(dir.path())
            .dispatch("search", &json!({"q": "moon"}))
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidParameters(_)));
    }

    #[test]
    fn test_dispatch_save() {
        let dir = tempfile::tempdir().unwrap();
        let output = tool_set(dir.path())
            .dispatch("save_text_to_file", &json!({"data": "notes"}))
            .unwrap();
        assert!(output.starts_with("Data successfully saved to"));
        assert!(std::fs::read_to_string(dir.path().join("out.txt"))
            .unwrap()
            .contains("notes"));
    }
}

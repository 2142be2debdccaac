use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use schemars::JsonSchema;
use serde::Deserialize;

use super::parameters_schema;
use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;

pub const DEFAULT_OUTPUT_FILE: &str = "research_output.txt";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveArgs {
    /// The research text to append to the output file
    pub data: String,
}

/// Appends research output to a local text file, one timestamped entry per call.
#[derive(Debug, Clone)]
pub struct SaveToFile {
    path: PathBuf,
}

impl SaveToFile {
    pub const NAME: &'static str = "save_text_to_file";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn definition() -> Tool {
        Tool::new(
            Self::NAME,
            "Saves structured research data to a text file.",
            parameters_schema::<SaveArgs>(),
        )
    }

    pub fn run(&self, args: SaveArgs) -> AgentResult<String> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let entry = format!(
            "--- Research Output ---\nTimestamp: {}\n\n{}\n\n",
            timestamp, args.data
        );

        tracing::debug!(path = %self.path.display(), "saving research output");

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .map_err(|e| {
                AgentError::ExecutionError(format!(
                    "Could not write to {}: {}",
                    self.path.display(),
                    e
                ))
            })?;

        Ok(format!("Data successfully saved to {}", self.path.display()))
    }
}

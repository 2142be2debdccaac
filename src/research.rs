//! The fixed output contract between the model and the terminal.
//!
//! The model is asked to answer with a JSON document matching
//! [`ResearchResponse`]. Its final text either decodes completely into that
//! shape or it is shown to the user verbatim; fields are never salvaged from a
//! partial match.

use std::io::{self, Write};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::parameters_schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchResponse {
    /// The subject of the research
    pub topic: String,
    /// A summary of the findings
    pub summary: String,
    /// URLs or citations the summary is based on
    pub sources: Vec<String>,
    /// Names of the tools used while researching
    pub tools_used: Vec<String>,
}

#[derive(Debug, Error)]
#[error("response does not match the research schema: {source}")]
pub struct ResponseParseError {
    /// The model's text exactly as it was received
    pub raw: String,
    #[source]
    pub source: serde_json::Error,
}

/// Instructions telling the model how to shape its final answer
pub fn format_instructions() -> String {
    let schema = parameters_schema::<ResearchResponse>();
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         For example, for the schema {{\"properties\": {{\"foo\": {{\"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{}\n```",
        schema
    )
}

/// Remove markdown code fence markers the model tends to wrap JSON in
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_response(raw: &str) -> Result<ResearchResponse, ResponseParseError> {
    serde_json::from_str(&strip_code_fences(raw)).map_err(|source| ResponseParseError {
        raw: raw.to_string(),
        source,
    })
}

/// Print the model's final answer, falling back to the raw text when it does not decode
pub fn render<W: Write>(out: &mut W, raw: &str) -> io::Result<()> {
    match parse_response(raw) {
        Ok(response) => write_response(out, &response),
        Err(err) => {
            tracing::debug!(error = %err, "falling back to raw output");
            writeln!(out, "Could not parse response. Raw output:")?;
            writeln!(out, "{}", err.raw)
        }
    }
}

fn write_response<W: Write>(out: &mut W, response: &ResearchResponse) -> io::Result<()> {
    writeln!(out, "\n--- Agent Response ---")?;
    writeln!(out, "Topic: {}", response.topic)?;
    writeln!(out, "Summary: {}", response.summary)?;
    writeln!(out, "Sources:")?;
    for source in &response.sources {
        writeln!(out, "  - {}", source)?;
    }
    writeln!(out, "Tools Used:")?;
    for tool in &response.tools_used {
        writeln!(out, "  - {}", tool)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOON: &str = r#"{"topic":"Moon","summary":"It orbits Earth.","sources":["nasa.gov"],"tools_used":["search"]}"#;

    fn rendered(raw: &str) -> String {
        let mut out = Vec::new();
        render(&mut out, raw).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_fenced_response() {
        let raw = format!("```json\n{}\n```", MOON);
        assert_eq!(
            rendered(&raw),
            "\n--- Agent Response ---\n\
             Topic: Moon\n\
             Summary: It orbits Earth.\n\
             Sources:\n  - nasa.gov\n\
             Tools Used:\n  - search\n"
        );
    }

    #[test]
    fn test_fences_do_not_change_output() {
        assert_eq!(rendered(MOON), rendered(&format!("```json\n{}\n```", MOON)));
        assert_eq!(rendered(MOON), rendered(&format!("```\n{}\n```", MOON)));
    }

    #[test]
    fn test_render_keeps_list_order() {
        let raw = r#"{"topic":"t","summary":"s","sources":["b","a","c"],"tools_used":["wikipedia","search"]}"#;
        assert_eq!(
            rendered(raw),
            "\n--- Agent Response ---\nTopic: t\nSummary: s\nSources:\n  - b\n  - a\n  - c\nTools Used:\n  - wikipedia\n  - search\n"
        );
    }

    #[test]
    fn test_render_empty_lists() {
        let raw = r#"{"topic":"t","summary":"s","sources":[],"tools_used":[]}"#;
        assert_eq!(
            rendered(raw),
            "\n--- Agent Response ---\nTopic: t\nSummary: s\nSources:\nTools Used:\n"
        );
    }

    #[test]
    fn test_render_fallback() {
        assert_eq!(
            rendered("not json at all"),
            "Could not parse response. Raw output:\nnot json at all\n"
        );
    }

    #[test]
    fn test_fallback_prints_unmodified_text() {
        let raw = "```json\n{\"topic\": \"Moon\"}\n```";
        assert_eq!(
            rendered(raw),
            format!("Could not parse response. Raw output:\n{}\n", raw)
        );
    }

    #[test]
    fn test_parse_requires_every_field() {
        let err = parse_response(r#"{"topic":"Moon","summary":"s","sources":[]}"#).unwrap_err();
        assert!(err.to_string().contains("tools_used"));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(parse_response(r#"{"topic":"Moon","summary":"s","sources":"nasa.gov","tools_used":[]}"#).is_err());
        assert!(parse_response(r#"["Moon"]"#).is_err());
        assert!(parse_response("").is_err());
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let raw = r#"{"topic":"Moon","summary":"s","sources":[],"tools_used":[],"confidence":0.9}"#;
        assert_eq!(parse_response(raw).unwrap().topic, "Moon");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("  ```json\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_format_instructions_embed_schema() {
        let instructions = format_instructions();
        assert!(instructions.starts_with("The output should be formatted as a JSON instance"));
        for field in ["topic", "summary", "sources", "tools_used"] {
            assert!(instructions.contains(&format!("\"{}\"", field)), "{}", field);
        }
        assert!(instructions.contains("\"required\""));
        assert!(!instructions.contains("$schema"));
    }
}

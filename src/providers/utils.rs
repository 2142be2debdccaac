use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Map, Value};

use super::types::{
    content::{Content, ToolUse},
    message::{Message, Role},
    tool::Tool,
};

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_-]").expect("valid regex"));

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut tool_outputs = Vec::new();

        for content in &message.content {
            match content {
                Content::Text(text) => texts.push(text.text.as_str()),
                Content::ToolUse(tool_use) => {
                    tool_calls.push(json!({
                        "id": tool_use.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&tool_use.name),
                            "arguments": tool_use.parameters.to_string(),
                        }
                    }));
                }
                Content::ToolResult(tool_result) => {
                    tool_outputs.push(json!({
                        "role": "tool",
                        "content": tool_result.output,
                        "tool_call_id": tool_result.tool_use_id
                    }));
                }
            }
        }

        if !texts.is_empty() || !tool_calls.is_empty() {
            let mut converted = Map::new();
            converted.insert("role".to_string(), json!(message.role));
            if !texts.is_empty() {
                converted.insert("content".to_string(), json!(texts.join("\n")));
            }
            if !tool_calls.is_empty() {
                converted.insert("tool_calls".to_string(), Value::Array(tool_calls));
            }
            messages_spec.push(Value::Object(converted));
        }
        messages_spec.extend(tool_outputs);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("No message in response: {}", response))?;

    let mut content = Vec::new();

    if let Some(text) = original.get("content").and_then(|t| t.as_str()) {
        content.push(Content::text(text));
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            content.push(Content::ToolUse(tool_call_to_tool_use(tool_call)));
        }
    }

    // A null content with no tool calls (e.g. a refusal) still ends the turn as text
    if content.is_empty() {
        let refusal = original
            .get("refusal")
            .and_then(|r| r.as_str())
            .unwrap_or_default();
        content.push(Content::text(refusal));
    }

    Message::new(Role::Assistant, content)
}

/// Malformed calls are kept as error-flagged tool uses so the model can be told what went wrong
fn tool_call_to_tool_use(tool_call: &Value) -> ToolUse {
    let id = tool_call["id"].as_str().unwrap_or_default().to_string();
    let name = tool_call["function"]["name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let arguments = tool_call["function"]["arguments"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    if !is_valid_function_name(&name) {
        let error_message = format!(
            "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
            name
        );
        return ToolUse {
            id,
            name,
            parameters: json!(arguments),
            is_error: true,
            error_message: Some(error_message),
        };
    }

    match serde_json::from_str::<Value>(&arguments) {
        Ok(parameters) => ToolUse {
            id,
            name,
            parameters,
            is_error: false,
            error_message: None,
        },
        Err(_) => {
            let error_message = format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, arguments
            );
            ToolUse {
                id,
                name,
                parameters: json!(arguments),
                is_error: true,
                error_message: Some(error_message),
            }
        }
    }
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty() && !INVALID_NAME_CHARS.is_match(name)
}

#[derive(Debug, thiserror::Error)]
#[error("Input message too long. Message: {0}")]
pub struct InitialMessageTooLargeError(String);

pub fn check_openai_context_length_error(error: &Value) -> Option<InitialMessageTooLargeError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(InitialMessageTooLargeError(message))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::content::ToolResult;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "role": "assistant",
            "message": {
                "tool_calls": [{
                    "id": "1",
                    "function": {
                        "name": "search",
                        "arguments": "{\"query\": \"moon landing\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    fn search_tool() -> Tool {
        Tool::new(
            "search",
            "Search the web",
            json!({"type": "object", "properties": {"query": {"type": "string"}}}),
        )
    }

    #[test]
    fn test_messages_to_openai_spec() -> Result<()> {
        let spec = messages_to_openai_spec(&[Message::user("Hello")?]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "Hello");
        Ok(())
    }

    #[test]
    fn test_messages_to_openai_spec_tool_round() -> Result<()> {
        let messages = vec![
            Message::user("Tell me about the moon")?,
            Message::new(
                Role::Assistant,
                vec![Content::ToolUse(ToolUse {
                    id: "call_1".to_string(),
                    name: "search".to_string(),
                    parameters: json!({"query": "moon"}),
                    is_error: false,
                    error_message: None,
                })],
            )?,
            Message::tool_results(vec![ToolResult {
                tool_use_id: "call_1".to_string(),
                output: "The Moon orbits Earth".to_string(),
                is_error: false,
            }])?,
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["role"], "assistant");
        assert!(spec[1].get("content").is_none());
        assert_eq!(spec[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(spec[1]["tool_calls"][0]["function"]["name"], "search");
        assert_eq!(
            spec[1]["tool_calls"][0]["function"]["arguments"],
            "{\"query\":\"moon\"}"
        );
        assert_eq!(spec[2]["role"], "tool");
        assert_eq!(spec[2]["content"], "The Moon orbits Earth");
        assert_eq!(spec[2]["tool_call_id"], "call_1");
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let spec = tools_to_openai_spec(&[search_tool()])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "search");
        assert_eq!(spec[0]["function"]["parameters"]["type"], "object");
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let result = tools_to_openai_spec(&[search_tool(), search_tool()]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_tools_to_openai_spec_empty() -> Result<()> {
        assert!(tools_to_openai_spec(&[])?.is_empty());
        Ok(())
    }

    #[test]
    fn test_sanitize_function_name() {
        assert_eq!(sanitize_function_name("save_text_to_file"), "save_text_to_file");
        assert_eq!(sanitize_function_name("hello world"), "hello_world");
        assert_eq!(sanitize_function_name("hello@world"), "hello_world");
    }

    #[test]
    fn test_is_valid_function_name() {
        assert!(is_valid_function_name("hello-world"));
        assert!(is_valid_function_name("hello_world"));
        assert!(!is_valid_function_name("hello world"));
        assert!(!is_valid_function_name(""));
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "The Moon orbits Earth."}
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "The Moon orbits Earth.");
        assert_eq!(message.role, Role::Assistant);
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_valid_tooluse() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        let tool_uses = message.tool_use();
        assert_eq!(tool_uses.len(), 1);
        assert_eq!(tool_uses[0].name, "search");
        assert_eq!(tool_uses[0].parameters, json!({"query": "moon landing"}));
        assert!(!tool_uses[0].is_error);
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_invalid_func_name() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["name"] =
            json!("invalid fn");

        let message = openai_response_to_message(&response)?;
        let tool_uses = message.tool_use();

        assert_eq!(tool_uses[0].name, "invalid fn");
        assert!(tool_uses[0].is_error);
        assert!(tool_uses[0]
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("The provided function name"));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_json_decode_error() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(&response)?;
        let tool_uses = message.tool_use();

        assert!(tool_uses[0].is_error);
        assert!(tool_uses[0]
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Could not interpret tool use parameters"));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_null_content_uses_refusal() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "refusal": "I can't help with that."
                }
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "I can't help with that.");
        assert!(!message.has_tool_use());
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_null_content_is_empty_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "message": {"role": "assistant", "content": null}
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "");
        assert_eq!(message.role, Role::Assistant);
        Ok(())
    }

    #[test]
    fn test_openai_response_without_choices() {
        assert!(openai_response_to_message(&json!({"object": "chat.completion"})).is_err());
    }

    #[test]
    fn test_check_openai_context_length_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });

        let result = check_openai_context_length_error(&error);
        assert_eq!(
            result.map(|e| e.to_string()).as_deref(),
            Some("Input message too long. Message: This message is too long")
        );

        let error = json!({"code": "other_error", "message": "Some other error"});
        assert!(check_openai_context_length_error(&error).is_none());
    }
}

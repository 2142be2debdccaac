use anyhow::Result;

use crate::prompt_template::PromptTemplate;
use crate::providers::base::Provider;
use crate::providers::types::content::{ToolResult, ToolUse};
use crate::providers::types::message::Message;
use crate::tools::ToolSet;

pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const ITERATION_LIMIT_OUTPUT: &str = "Agent stopped due to iteration limit or time limit.";

/// One tool call made while answering a query, with what it returned
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub tool_use: ToolUse,
    pub observation: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// The model's final free-text answer
    pub output: String,
    pub steps: Vec<AgentStep>,
}

/// Agent pairs the language model with the research tools it may call.
///
/// Built once at startup and reused for every query. Each call to
/// [`Agent::reply`] starts from an empty history.
pub struct Agent {
    provider: Box<dyn Provider>,
    tools: ToolSet,
    prompt: PromptTemplate,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, tools: ToolSet, prompt: PromptTemplate) -> Self {
        Self {
            provider,
            tools,
            prompt,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Answer a query, running whatever tools the model asks for along the way.
    ///
    /// Tool calls run one at a time in the order the model listed them. Calls
    /// naming an unknown tool or carrying bad arguments are reported back to the
    /// model; any other tool failure, and any provider failure, ends the reply.
    pub fn reply(&self, query: &str) -> Result<AgentResponse> {
        let tools = self.tools.definitions();
        let mut scratchpad: Vec<Message> = Vec::new();
        let mut steps = Vec::new();

        for iteration in 1..=self.max_iterations {
            let messages = self.prompt.build_messages(&[], query, &scratchpad)?;
            let (response, usage) = self
                .provider
                .complete(self.prompt.system(), &messages, &tools)?;
            tracing::debug!(iteration, ?usage, "{}", response.summary());

            let tool_uses = response.tool_use();
            if tool_uses.is_empty() {
                return Ok(AgentResponse {
                    output: response.text(),
                    steps,
                });
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            for tool_use in tool_uses {
                let (observation, is_error) = self.dispatch_tool_use(&tool_use)?;
                results.push(ToolResult {
                    tool_use_id: tool_use.id.clone(),
                    output: observation.clone(),
                    is_error,
                });
                steps.push(AgentStep {
                    tool_use,
                    observation,
                    is_error,
                });
            }

            scratchpad.push(response);
            scratchpad.push(Message::tool_results(results)?);
        }

        tracing::warn!(max_iterations = self.max_iterations, "iteration limit reached");
        Ok(AgentResponse {
            output: ITERATION_LIMIT_OUTPUT.to_string(),
            steps,
        })
    }

    fn dispatch_tool_use(&self, tool_use: &ToolUse) -> Result<(String, bool)> {
        if tool_use.is_error {
            let message = tool_use
                .error_message
                .clone()
                .unwrap_or_else(|| format!("Invalid call to {}", tool_use.name));
            tracing::warn!(tool = %tool_use.name, "{}", message);
            return Ok((message, true));
        }

        tracing::debug!(tool = %tool_use.name, parameters = %tool_use.parameters, "calling tool");
        match self.tools.dispatch(&tool_use.name, &tool_use.parameters) {
            Ok(output) => Ok((output, false)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!(tool = %tool_use.name, "{}", err);
                Ok((err.to_string(), true))
            }
            Err(err) => Err(err.into()),
        }
    }
}

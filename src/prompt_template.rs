use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

use crate::providers::types::message::Message;
use crate::research::format_instructions;

pub const RESEARCH_SYSTEM_TEMPLATE: &str = "\
You are a research assistant that will help generate a research paper.
Answer the user query and use necessary tools.
Wrap the output in this format and provide no other text
{{ format_instructions }}";

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    tera.render("inline_template", &context)
}

/// System instruction plus the slots a single agent invocation fills in.
///
/// The system text is rendered once; each query only supplies the history,
/// the query itself and the tool exchanges made so far.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    system: String,
}

impl PromptTemplate {
    pub fn new(template: &str) -> Result<Self> {
        let mut context = HashMap::new();
        context.insert("format_instructions", format_instructions());
        let system = load_prompt(template, &context)?;
        Ok(Self { system })
    }

    pub fn research() -> Result<Self> {
        Self::new(RESEARCH_SYSTEM_TEMPLATE)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Conversation for one model call: history, then the query, then the scratchpad
    pub fn build_messages(
        &self,
        history: &[Message],
        query: &str,
        scratchpad: &[Message],
    ) -> Result<Vec<Message>> {
        let mut messages = Vec::with_capacity(history.len() + scratchpad.len() + 1);
        messages.extend_from_slice(history);
        messages.push(Message::user(query)?);
        messages.extend_from_slice(scratchpad);
        Ok(messages)
    }
}

use std::io::Write;

use anyhow::Result;

use crate::agent::Agent;
use crate::prompt::{Input, Prompt};
use crate::research::render;

/// The interactive research loop: read a query, run the agent, print the answer.
pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
    out: Box<dyn Write + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>, out: Box<dyn Write + 'a>) -> Self {
        Session { agent, prompt, out }
    }

    /// Runs until the user types "exit"
    pub fn start(&mut self) -> Result<()> {
        self.prompt.ready();

        loop {
            match self.prompt.get_input()? {
                Input::Message(query) => self.process_query(&query)?,
                Input::AskAgain => continue,
                Input::Exit => break,
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// A failed query is reported and the session carries on with the next one
    fn process_query(&mut self, query: &str) -> Result<()> {
        tracing::info!(query, "researching");

        self.prompt.show_busy();
        let reply = self.agent.reply(query);
        self.prompt.hide_busy();

        match reply {
            Ok(response) => {
                tracing::debug!(steps = response.steps.len(), "agent finished");
                render(&mut self.out, &response.output)?;
            }
            Err(e) => {
                tracing::error!(error = %e, "query failed");
                writeln!(self.out, "Error: {:#}", e)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

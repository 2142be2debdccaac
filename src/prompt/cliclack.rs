use std::io::ErrorKind;

use anyhow::Result;
use cliclack::{input, spinner, ProgressBar};

use super::{Input, Prompt, RESEARCH_PROMPT};

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { spinner: None }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompt for CliclackPrompt {
    fn get_input(&mut self) -> Result<Input> {
        let line: String = match input(RESEARCH_PROMPT).placeholder("").interact() {
            Ok(line) => line,
            // Ctrl-C or a closed stdin at the prompt ends the session like "exit"
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::UnexpectedEof) => {
                return Ok(Input::Exit)
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Input::from_line(&line))
    }

    fn show_busy(&mut self) {
        let spin = spinner();
        spin.start("researching");
        self.spinner = Some(spin);
    }

    fn hide_busy(&mut self) {
        if let Some(spin) = self.spinner.take() {
            spin.stop("");
        }
    }
}

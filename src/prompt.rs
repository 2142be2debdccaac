use anyhow::Result;
use console::style;

pub mod cliclack;

pub const RESEARCH_PROMPT: &str = "What can I help you research? (type 'exit' to quit)";

pub trait Prompt {
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self) {}
    fn ready(&self) {
        println!(
            "Research assistant {}",
            style("- type \"exit\" to end the session").dim()
        );
        println!();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing usable was entered, ask again
    AskAgain,
    /// A research query
    Message(String),
    /// The user wants to end the session
    Exit,
}

impl Input {
    pub fn from_line(line: &str) -> Self {
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") {
            Input::Exit
        } else if text.is_empty() {
            Input::AskAgain
        } else {
            Input::Message(text.to_string())
        }
    }
}

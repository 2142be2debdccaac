pub mod agent;
pub mod errors;
pub mod prompt;
pub mod prompt_template;
pub mod providers;
pub mod research;
pub mod session;
pub mod tools;

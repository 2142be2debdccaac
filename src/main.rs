use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use reqwest::blocking::Client;
use tracing::Level;

use research_agent::agent::{Agent, DEFAULT_MAX_ITERATIONS};
use research_agent::prompt::cliclack::CliclackPrompt;
use research_agent::prompt_template::PromptTemplate;
use research_agent::providers::configs::base::ProviderConfig;
use research_agent::providers::configs::openai::OpenAiProviderConfig;
use research_agent::providers::openai::OpenAiProvider;
use research_agent::session::Session;
use research_agent::tools::{save, wikipedia, ToolConfig, ToolSet};

const TOOL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// OpenAI API Key (can also be set via OPENAI_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,

    /// Model to use (defaults to OPENAI_MODEL or gpt-4o)
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature passed to the model
    #[arg(long)]
    temperature: Option<f32>,

    /// Upper bound on tokens generated per model call
    #[arg(long)]
    max_tokens: Option<i32>,

    /// Maximum number of model calls per query
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// File the save tool appends research output to
    #[arg(short, long, default_value = save::DEFAULT_OUTPUT_FILE)]
    output_file: PathBuf,

    /// Maximum characters returned by a Wikipedia lookup
    #[arg(long, default_value_t = wikipedia::DEFAULT_MAX_CHARS)]
    wiki_max_chars: usize,

    /// Timeout in seconds for model requests
    #[arg(long, default_value_t = 600)]
    timeout: u64,

    /// Log agent steps and tool calls to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!(path = %path.display(), "loaded environment");
    }

    let provider = OpenAiProvider::new(provider_config(&cli)?)?;
    tracing::debug!(model = provider.model(), "provider ready");

    let client = Client::builder().timeout(TOOL_TIMEOUT).build()?;
    let tools = ToolSet::standard(
        client,
        &ToolConfig {
            output_file: cli.output_file.clone(),
            wiki_max_chars: cli.wiki_max_chars,
        },
    );

    let agent = Agent::new(Box::new(provider), tools, PromptTemplate::research()?)
        .with_max_iterations(cli.max_iterations);

    let mut session = Session::new(
        agent,
        Box::new(CliclackPrompt::new()),
        Box::new(io::stdout()),
    );
    session.start()
}

fn provider_config(cli: &Cli) -> Result<OpenAiProviderConfig> {
    let mut config = match &cli.api_key {
        Some(api_key) => OpenAiProviderConfig::from_env_with_key(api_key.clone())?,
        None => OpenAiProviderConfig::from_env().context(
            "API key must be provided via --api-key or OPENAI_API_KEY environment variable",
        )?,
    };

    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }

    Ok(config
        .with_temperature(cli.temperature)
        .with_max_tokens(cli.max_tokens)
        .with_timeout(Duration::from_secs(cli.timeout)))
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    // stdout belongs to the interactive prompt
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

//! code-assistant CLI
//!
//! Terminal chat with an agent that can read, list and edit local files.

mod repl;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, builder::RangedU64ValueParser};

use agent_core::{AgentBuilder, AgentConfig};
use agent_runtime::{
    AnthropicConfig, AnthropicProvider,
    anthropic::API_KEY_ENV,
    logging::{self, LogOptions},
};

#[derive(Debug, Parser)]
#[command(
    name = "code-assistant",
    version,
    about = "AI Code Assistant - A conversational AI agent with file editing capabilities"
)]
struct Cli {
    /// Anthropic API key (or set ANTHROPIC_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Model identifier (or set AGENT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Maximum tool rounds per message, at least 1 (or set AGENT_MAX_TOOL_TURNS)
    #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_tool_turns: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Terminal stays clean; diagnostics go to the log file only
    logging::init(&LogOptions::from_env(false))?;

    let Some(api_key) = cli
        .api_key
        .or_else(|| std::env::var(API_KEY_ENV).ok())
        .filter(|key| !key.trim().is_empty())
    else {
        println!(
            "Error: Please provide an API key via --api-key or {API_KEY_ENV} environment variable"
        );
        return Ok(ExitCode::FAILURE);
    };

    let mut provider_config = AnthropicConfig::new(api_key);
    if let Ok(base_url) = std::env::var(agent_runtime::anthropic::BASE_URL_ENV) {
        provider_config = provider_config.with_base_url(base_url);
    }
    let provider = AnthropicProvider::from_config(provider_config)?;

    let config = AgentConfig::from_env();
    let model = cli.model.unwrap_or_else(|| config.generation.model.clone());
    let max_tool_turns = cli.max_tool_turns.or(config.max_tool_turns);

    let mut agent = AgentBuilder::new()
        .provider(Arc::new(provider))
        .tools(Arc::new(file_tools::default_registry()))
        .config(config)
        .model(model)
        .max_tool_turns(max_tool_turns)
        .on_tool_use(|name, input| println!("using tool: {name} {input}"))
        .build()?;

    tracing::info!(model = %agent.config().generation.model, "CLI session started");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = repl::run(&mut agent, stdin, tokio::io::stdout()) => result?,
        _ = tokio::signal::ctrl_c() => println!("\n\nGoodbye!"),
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "code-assistant",
            "--api-key",
            "sk-test",
            "--model",
            "claude-test",
            "--max-tool-turns",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.api_key.as_deref(), Some("sk-test"));
        assert_eq!(cli.model.as_deref(), Some("claude-test"));
        assert_eq!(cli.max_tool_turns, Some(4));
    }

    #[test]
    fn test_zero_tool_turns_rejected() {
        assert!(Cli::try_parse_from(["code-assistant", "--max-tool-turns", "0"]).is_err());
    }
}

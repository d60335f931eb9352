//! Tracing Setup
//!
//! Console output filtered by `RUST_LOG`, plus an append-only diagnostic log
//! file that records user input, tool invocations and truncated tool results.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer, filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Environment variable overriding the diagnostic log path
pub const LOG_FILE_ENV: &str = "AGENT_LOG_FILE";

const DEFAULT_LOG_FILE: &str = "agent.log";
const DEFAULT_CONSOLE_FILTER: &str = "info,tower_http=debug";

/// Logging options for a binary
#[derive(Clone, Debug)]
pub struct LogOptions {
    /// Diagnostic log path
    pub file: PathBuf,

    /// Whether to log to the terminal as well
    pub console: bool,
}

impl LogOptions {
    pub fn from_env(console: bool) -> Self {
        let file = std::env::var(LOG_FILE_ENV).unwrap_or_else(|_| DEFAULT_LOG_FILE.into());
        Self {
            file: file.into(),
            console,
        }
    }
}

/// Targets written to the diagnostic log file
fn diagnostic_targets() -> Targets {
    Targets::new()
        .with_target(agent_core::tool::LOG_TARGET, Level::INFO)
        .with_target(agent_core::reasoning::LOG_TARGET, Level::INFO)
}

/// Install the global subscriber
pub fn init(options: &LogOptions) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&options.file)?;

    let diagnostics = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .with_filter(diagnostic_targets());

    let console = options.console.then(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
        fmt::layer().with_filter(filter)
    });

    tracing_subscriber::registry()
        .with(diagnostics)
        .with(console)
        .try_init()?;

    Ok(())
}

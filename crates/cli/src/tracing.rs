//! Log setup for `taskline`.
//!
//! Reports and JSON go to stdout; every log line goes to stderr so the two can
//! be piped separately. `RUST_LOG` overrides `--level` when it is set.

use std::io;
use std::sync::OnceLock;
pub use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Shape of the log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TracingFormat {
    /// Multi-line, indented, with span context
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per event (implied by --json)
    Json,
}

impl std::str::FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {s}")),
        }
    }
}

/// Verbosity accepted by `--level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogLevel {
    /// Every graph and schedule step
    Trace,
    /// Graph construction and per-command details
    Debug,
    /// One summary line per project
    Info,
    /// Dropped tokens, unresolved references and cycles (default)
    Warn,
    /// Failures only
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub format: TracingFormat,
    pub level: Level,
}

static RUN_ID: OnceLock<Uuid> = OnceLock::new();

/// Id shared by every log line of one `taskline` invocation.
pub fn correlation_id() -> Uuid {
    *RUN_ID.get_or_init(Uuid::new_v4)
}

/// Filter directive applying `level` to the binary and the engine crate.
fn default_directive(level: Level) -> String {
    let level = level.as_str().to_lowercase();
    format!("taskline={level},taskline_engine={level}")
}

/// Install the global subscriber. Call once, before any command runs.
pub fn init_tracing(config: TracingConfig) -> miette::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config.level)))
        .map_err(|e| miette::miette!("Invalid log filter: {e}"))?;
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer().with_writer(io::stderr);

    match config.format {
        TracingFormat::Pretty => registry.with(fmt.pretty()).init(),
        TracingFormat::Compact => registry.with(fmt.compact().with_target(false)).init(),
        TracingFormat::Json => registry
            .with(fmt.json().with_current_span(true).with_span_list(true))
            .init(),
    }

    tracing::debug!(
        correlation_id = %correlation_id(),
        version = env!("CARGO_PKG_VERSION"),
        format = ?config.format,
        "Logging ready"
    );
    Ok(())
}

/// Span wrapping one subcommand, tagged with the run's correlation id.
#[macro_export]
macro_rules! command_span {
    ($command:expr) => {
        ::tracing::info_span!(
            "command",
            command = %$command,
            correlation_id = %$crate::tracing::correlation_id(),
            start_time = %::chrono::Utc::now().to_rfc3339(),
        )
    };
}

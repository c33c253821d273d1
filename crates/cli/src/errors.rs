//! CLI error types with miette diagnostics
//!
//! Input and config parse failures carry the offending source so miette can
//! point at the exact location.

use miette::{Diagnostic, SourceSpan};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// CLI-specific error types with enhanced diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("Failed to {operation} {}", path.display())]
    #[diagnostic(
        code(taskline::cli::file_error),
        help("Check file permissions and ensure the path exists")
    )]
    FileError {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Task list in {input} is not valid: {reason}")]
    #[diagnostic(
        code(taskline::cli::invalid_tasks),
        help("Expected a JSON array of task records with id, project_id and sequence")
    )]
    InvalidTasks {
        input: String,
        reason: String,
        #[source_code]
        src: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Configuration parsing failed for {}", config_file.display())]
    #[diagnostic(code(taskline::cli::config_parse_error))]
    ConfigParseError {
        config_file: PathBuf,
        #[source_code]
        src: String,
        #[label("error occurred here")]
        error_span: SourceSpan,
        #[help]
        reason: String,
    },

    #[error("Order table in {} is not valid: {reason}", path.display())]
    #[diagnostic(
        code(taskline::cli::invalid_order_table),
        help("Expected a JSON array of {{\"name\": ..., \"order\": ...}} entries")
    )]
    InvalidOrderTable { path: PathBuf, reason: String },

    #[error("Failed to write output")]
    #[diagnostic(code(taskline::cli::output_error))]
    Output {
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Build from a serde_json failure, pointing at its line and column.
    pub fn invalid_tasks(input: impl Into<String>, src: String, error: &serde_json::Error) -> Self {
        let offset = line_column_offset(&src, error.line(), error.column());
        Self::InvalidTasks {
            input: input.into(),
            reason: error.to_string(),
            span: SourceSpan::new(offset.into(), 0_usize),
            src,
        }
    }

    /// Build from a toml failure, pointing at its span when it has one.
    pub fn config_parse_error(config_file: &Path, src: String, error: &toml::de::Error) -> Self {
        let span = error.span().unwrap_or(0..0);
        Self::ConfigParseError {
            config_file: config_file.to_path_buf(),
            error_span: SourceSpan::new(span.start.into(), span.len()),
            reason: error.message().to_string(),
            src,
        }
    }

    pub fn invalid_order_table(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidOrderTable {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::Output { source }
    }
}

/// Byte offset of a 1-based line and column, clamped to the source length.
fn line_column_offset(src: &str, line: usize, column: usize) -> usize {
    let line_start: usize = src
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(src.len())
}

pub type CliResult<T> = Result<T, CliError>;

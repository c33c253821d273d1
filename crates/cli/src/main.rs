mod cli;
mod commands;
mod config;
mod errors;
mod tracing;

use crate::cli::parse;
use crate::commands::{Command, Context, Outcome};
use crate::config::Config;
use crate::tracing::{TracingConfig, TracingFormat};
use ::tracing::instrument;
use std::io::Write;
use std::process::ExitCode;

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    match run_main() {
        Ok(outcome) => ExitCode::from(u8::try_from(outcome.exit_code()).unwrap_or(1)),
        Err(error) => {
            eprintln!("{error:?}");
            ExitCode::FAILURE
        }
    }
}

fn run_main() -> miette::Result<Outcome> {
    let cli = parse();

    let tracing_config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            cli.log_format
        },
        level: cli.level.into(),
    };
    crate::tracing::init_tracing(tracing_config)?;

    let config = Config::load(cli.config.as_deref())?;
    let ctx = Context {
        json: cli.json,
        config,
    };
    run_cli(cli.command.into(), &ctx)
}

#[instrument(skip_all)]
fn run_cli(command: Command, ctx: &Context) -> miette::Result<Outcome> {
    let span = command_span!(command.name());
    let _guard = span.enter();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let outcome = commands::execute(command, ctx, &mut out)?;
    out.flush().map_err(errors::CliError::from)?;

    ::tracing::debug!(?outcome, "Command finished");
    Ok(outcome)
}

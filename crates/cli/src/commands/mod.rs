pub mod check;
pub mod repair;
pub mod schedule;
pub mod timeline;
pub mod version;

use crate::config::Config;
use crate::errors::{CliError, CliResult};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use taskline_engine::TaskRecord;
use tracing::{debug, instrument};

#[derive(Debug, Clone)]
pub enum Command {
    Version,
    Check {
        tasks: PathBuf,
    },
    Schedule {
        tasks: PathBuf,
        derive_from_duration: bool,
    },
    Timeline {
        tasks: PathBuf,
        order: Option<PathBuf>,
        derive_from_duration: bool,
    },
    Repair {
        tasks: PathBuf,
    },
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Check { .. } => "check",
            Self::Schedule { .. } => "schedule",
            Self::Timeline { .. } => "timeline",
            Self::Repair { .. } => "repair",
        }
    }
}

/// How a command finished, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// At least one project has a dependency cycle.
    CycleFound,
}

impl Outcome {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::CycleFound => 2,
        }
    }
}

/// Settings shared by every command.
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub json: bool,
    pub config: Config,
}

#[instrument(skip_all, fields(command = command.name()))]
pub fn execute(command: Command, ctx: &Context, out: &mut impl Write) -> CliResult<Outcome> {
    match command {
        Command::Version => {
            version::execute(ctx, out)?;
            Ok(Outcome::Success)
        }
        Command::Check { tasks } => check::execute(&read_tasks(&tasks)?, ctx, out),
        Command::Schedule {
            tasks,
            derive_from_duration,
        } => {
            let options = ctx.config.schedule_options(derive_from_duration);
            schedule::execute(read_tasks(&tasks)?, &options, ctx, out)
        }
        Command::Timeline {
            tasks,
            order,
            derive_from_duration,
        } => {
            let options = ctx.config.schedule_options(derive_from_duration);
            let table = ctx.config.canonical_order(order.as_deref())?;
            timeline::execute(read_tasks(&tasks)?, &options, &table, ctx, out)
        }
        Command::Repair { tasks } => {
            repair::execute(read_tasks(&tasks)?, out)?;
            Ok(Outcome::Success)
        }
    }
}

/// Read task records from a JSON file, or from stdin for `-`.
pub fn read_tasks(path: &Path) -> CliResult<Vec<TaskRecord>> {
    let (input, src) = if path == Path::new("-") {
        let mut src = String::new();
        io::stdin()
            .read_to_string(&mut src)
            .map_err(|e| CliError::file_error("read", "<stdin>", e))?;
        ("<stdin>".to_string(), src)
    } else {
        let src =
            std::fs::read_to_string(path).map_err(|e| CliError::file_error("read", path, e))?;
        (path.display().to_string(), src)
    };

    let tasks: Vec<TaskRecord> =
        serde_json::from_str(&src).map_err(|e| CliError::invalid_tasks(&input, src.clone(), &e))?;
    debug!(input = %input, tasks = tasks.len(), "Read task records");
    Ok(tasks)
}

pub fn write_json(out: &mut impl Write, value: &impl Serialize) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

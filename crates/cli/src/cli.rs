use crate::commands::Command;
use crate::tracing::{LogLevel, TracingFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskline")]
#[command(about = "Dependency checks and schedule propagation for project task lists")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(long, global = true, help = "Emit JSON output and JSON logs")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        help = "Log format when not in JSON mode",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,

    #[arg(
        long,
        global = true,
        env = "TASKLINE_CONFIG",
        help = "Path to taskline.toml (defaults to ./taskline.toml when present)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Show version information")]
    Version,
    #[command(about = "Show how dependency strings resolve and look for cycles")]
    Check {
        #[arg(help = "JSON file with task records, or '-' for stdin")]
        tasks: PathBuf,
    },
    #[command(about = "Compute derived start and end dates per project")]
    Schedule {
        #[arg(help = "JSON file with task records, or '-' for stdin")]
        tasks: PathBuf,
        #[arg(long, help = "Fill a missing start or end from the task duration")]
        derive_from_duration: bool,
    },
    #[command(about = "Cross-project timeline ordered by the canonical name table")]
    Timeline {
        #[arg(help = "JSON file with task records, or '-' for stdin")]
        tasks: PathBuf,
        #[arg(long, help = "JSON order table, overrides the config file")]
        order: Option<PathBuf>,
        #[arg(long, help = "Fill a missing start or end from the task duration")]
        derive_from_duration: bool,
    },
    #[command(about = "Print dependency strings with self-references removed")]
    Repair {
        #[arg(help = "JSON file with task records, or '-' for stdin")]
        tasks: PathBuf,
    },
}

impl From<Commands> for Command {
    fn from(cmd: Commands) -> Self {
        match cmd {
            Commands::Version => Self::Version,
            Commands::Check { tasks } => Self::Check { tasks },
            Commands::Schedule {
                tasks,
                derive_from_duration,
            } => Self::Schedule {
                tasks,
                derive_from_duration,
            },
            Commands::Timeline {
                tasks,
                order,
                derive_from_duration,
            } => Self::Timeline {
                tasks,
                order,
                derive_from_duration,
            },
            Commands::Repair { tasks } => Self::Repair { tasks },
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}

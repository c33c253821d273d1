//! Error types for schedule engine operations.
//!
//! Only conditions that stop a computation live here. Everything the engine can
//! work around (bad tokens, dangling references, self-references) is reported
//! as a [`Diagnostic`](crate::Diagnostic) instead.

use crate::TaskId;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// A dependency cycle was detected in the graph.
    #[error("Cycle detected in task dependencies: {}", render_path(.path))]
    #[diagnostic(
        code(taskline::graph::cycle),
        help("remove one of the listed dependencies to break the cycle")
    )]
    CycleDetected {
        /// Task ids along the cycle, starting and ending at the same task.
        path: Vec<TaskId>,
    },
}

impl Error {
    /// Create a cycle error from a path of task ids.
    pub fn cycle(path: impl Into<Vec<TaskId>>) -> Self {
        Self::CycleDetected { path: path.into() }
    }
}

fn render_path(path: &[TaskId]) -> String {
    path.iter()
        .map(TaskId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

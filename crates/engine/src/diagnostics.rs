//! Soft conditions collected while processing a project.
//!
//! None of these stop the pipeline. They are accumulated in order of
//! discovery and returned next to the normal output.

use crate::{ProjectId, TaskId};
use serde::Serialize;
use std::fmt;

/// A recoverable problem found in a project's dependency data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Diagnostic {
    /// A token could not be parsed and was dropped.
    Parse {
        /// Task whose dependency string held the token.
        task_id: TaskId,
        /// The offending token, trimmed.
        token: String,
        /// Why the token was rejected.
        reason: String,
    },
    /// A token referenced a sequence number that no task in the project has.
    UnresolvedReference {
        /// Task whose dependency string held the token.
        task_id: TaskId,
        /// The reference as written.
        reference: String,
    },
    /// A task depended on itself; the dependency was removed.
    SelfReference {
        /// The task that referenced itself.
        task_id: TaskId,
        /// The removed token in wire form.
        token: String,
    },
    /// Two tasks share a sequence number; the later one wins.
    DuplicateSequence {
        /// The shared sequence number.
        sequence: u32,
        /// Task that lost the mapping.
        shadowed: TaskId,
        /// Task that now owns the sequence number.
        winner: TaskId,
    },
    /// The same task id appeared twice; the later record was skipped.
    DuplicateTask {
        /// The repeated id.
        task_id: TaskId,
    },
    /// A record belonging to another project was skipped.
    ForeignProject {
        /// The skipped task.
        task_id: TaskId,
        /// Project the record claims.
        project_id: ProjectId,
    },
    /// A date computation left the supported calendar range.
    DateOverflow {
        /// Task whose date could not be computed.
        task_id: TaskId,
    },
}

impl Diagnostic {
    /// The task the diagnostic is about.
    #[must_use]
    pub fn task_id(&self) -> &TaskId {
        match self {
            Self::Parse { task_id, .. }
            | Self::UnresolvedReference { task_id, .. }
            | Self::SelfReference { task_id, .. }
            | Self::DuplicateTask { task_id }
            | Self::ForeignProject { task_id, .. }
            | Self::DateOverflow { task_id } => task_id,
            Self::DuplicateSequence { shadowed, .. } => shadowed,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse {
                task_id,
                token,
                reason,
            } => write!(f, "task '{task_id}': dropped token '{token}': {reason}"),
            Self::UnresolvedReference { task_id, reference } => {
                write!(f, "task '{task_id}': reference '{reference}' matches no task")
            }
            Self::SelfReference { task_id, token } => {
                write!(f, "task '{task_id}': removed self-reference '{token}'")
            }
            Self::DuplicateSequence {
                sequence,
                shadowed,
                winner,
            } => write!(
                f,
                "sequence {sequence} is used by '{shadowed}' and '{winner}'; '{winner}' wins"
            ),
            Self::DuplicateTask { task_id } => {
                write!(f, "task '{task_id}' appears more than once; later copy skipped")
            }
            Self::ForeignProject {
                task_id,
                project_id,
            } => write!(
                f,
                "task '{task_id}' belongs to project '{project_id}'; skipped"
            ),
            Self::DateOverflow { task_id } => {
                write!(f, "task '{task_id}': computed date out of range")
            }
        }
    }
}

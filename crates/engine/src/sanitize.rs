//! Removal of tasks' references to themselves.
//!
//! This is a repair pass, not a detector: it runs on every graph build,
//! drops the offending dependencies and reports what it dropped.

use crate::graph::DependencyEdge;
use crate::parser::{DependencyToken, split_tokens};
use crate::resolver::SequenceIndex;
use crate::{TaskId, TaskRecord};
use serde::Serialize;
use tracing::warn;

/// Self-references removed from one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfReferenceRepair {
    /// The task that referenced itself.
    pub task_id: TaskId,
    /// Removed tokens, as written in the dependency string.
    pub removed: Vec<String>,
    /// The dependency string with the self-references taken out.
    ///
    /// Every other token, including malformed or unresolved ones, is kept
    /// verbatim so the caller can persist the fix without losing data.
    pub repaired_predecessors: String,
}

/// Everything the sanitizer removed from a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SanitizeReport {
    /// One entry per task that lost at least one self-reference.
    pub repairs: Vec<SelfReferenceRepair>,
}

impl SanitizeReport {
    /// Total number of removed self-references.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.repairs.iter().map(|r| r.removed.len()).sum()
    }

    /// Whether nothing was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Strip a task's self-references from its resolved edges.
///
/// Returns the remaining edges, in their original order, and the repair
/// record when anything was removed.
pub fn sanitize_task(
    task: &TaskRecord,
    index: &SequenceIndex,
    mut edges: Vec<DependencyEdge>,
) -> (Vec<DependencyEdge>, Option<SelfReferenceRepair>) {
    let before = edges.len();
    edges.retain(|edge| !edge.is_self_loop());
    if edges.len() == before {
        return (edges, None);
    }

    let mut removed = Vec::new();
    let mut kept = Vec::new();
    for token in split_tokens(&task.predecessors) {
        let points_at_self = DependencyToken::parse(token)
            .ok()
            .and_then(|parsed| index.resolve(&parsed.reference).cloned())
            .is_some_and(|target| target == task.id);
        if points_at_self {
            removed.push(token.to_string());
        } else {
            kept.push(token);
        }
    }

    warn!(
        task = %task.id,
        removed = removed.len(),
        "Removed self-referencing dependencies"
    );

    let repair = SelfReferenceRepair {
        task_id: task.id.clone(),
        removed,
        repaired_predecessors: kept.join(";"),
    };
    (edges, Some(repair))
}

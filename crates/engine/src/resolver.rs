//! Resolution of token references to task ids.
//!
//! Tokens name their predecessor by the project-local sequence number. This
//! module maps those numbers back to the internal [`TaskId`]s.

use crate::graph::DependencyEdge;
use crate::parser::DependencyToken;
use crate::{Diagnostic, TaskId, TaskRecord};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Sequence number -> task id lookup for one project.
#[derive(Debug, Clone, Default)]
pub struct SequenceIndex {
    by_sequence: HashMap<String, TaskId>,
}

impl SequenceIndex {
    /// Build the index for a project's tasks.
    ///
    /// When two tasks share a sequence number the later one owns it and a
    /// [`Diagnostic::DuplicateSequence`] is returned for the earlier one.
    #[must_use]
    pub fn build<'a>(tasks: impl IntoIterator<Item = &'a TaskRecord>) -> (Self, Vec<Diagnostic>) {
        let mut by_sequence = HashMap::new();
        let mut diagnostics = Vec::new();

        for task in tasks {
            if let Some(previous) = by_sequence.insert(task.sequence.to_string(), task.id.clone()) {
                warn!(
                    sequence = task.sequence,
                    shadowed = %previous,
                    winner = %task.id,
                    "Duplicate sequence number"
                );
                diagnostics.push(Diagnostic::DuplicateSequence {
                    sequence: task.sequence,
                    shadowed: previous,
                    winner: task.id.clone(),
                });
            }
        }

        debug!(entries = by_sequence.len(), "Built sequence index");
        (Self { by_sequence }, diagnostics)
    }

    /// Look up the task a reference points to.
    #[must_use]
    pub fn resolve(&self, reference: &str) -> Option<&TaskId> {
        self.by_sequence.get(reference.trim())
    }

    /// Number of sequence numbers in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_sequence.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_sequence.is_empty()
    }

    /// Resolve a task's tokens into edges, in token order.
    ///
    /// Tokens whose reference does not resolve are reported through
    /// `diagnostics` and left out.
    pub fn resolve_tokens(
        &self,
        successor: &TaskId,
        tokens: &[DependencyToken],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<DependencyEdge> {
        tokens
            .iter()
            .filter_map(|token| match self.resolve(&token.reference) {
                Some(predecessor) => Some(DependencyEdge {
                    predecessor: predecessor.clone(),
                    successor: successor.clone(),
                    relation: token.relation,
                    lag_days: token.lag_days,
                }),
                None => {
                    warn!(task = %successor, reference = %token.reference, "Unresolved reference");
                    diagnostics.push(Diagnostic::UnresolvedReference {
                        task_id: successor.clone(),
                        reference: token.reference.clone(),
                    });
                    None
                }
            })
            .collect()
    }
}

//! Cycle detection over a project's dependency graph.
//!
//! Depth-first search with an explicit stack and three visitation states.
//! Roots are tried in snapshot order and edges in token order, so the same
//! input always reports the same cycle.

use crate::{DependencyGraph, Error, TaskId};
use petgraph::graph::NodeIndex;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Task ids along a cycle, starting and ending at the same task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<TaskId>);

impl CyclePath {
    /// The ids in traversal order, first and last equal.
    #[must_use]
    pub fn ids(&self) -> &[TaskId] {
        &self.0
    }

    /// Number of distinct tasks on the cycle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the ids out of the path.
    #[must_use]
    pub fn into_ids(self) -> Vec<TaskId> {
        self.0
    }
}

/// Outcome of a cycle check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "path")]
pub enum CycleCheck {
    /// No cycle exists.
    Acyclic,
    /// The first cycle found.
    Cycle(CyclePath),
}

impl CycleCheck {
    /// Whether the graph is free of cycles.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        matches!(self, Self::Acyclic)
    }

    /// The cycle, if one was found.
    #[must_use]
    pub fn cycle(&self) -> Option<&CyclePath> {
        match self {
            Self::Acyclic => None,
            Self::Cycle(path) => Some(path),
        }
    }

    /// Turn a found cycle into a hard error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CycleDetected`] when a cycle was found.
    pub fn into_result(self) -> crate::Result<()> {
        match self {
            Self::Acyclic => Ok(()),
            Self::Cycle(path) => Err(Error::cycle(path.into_ids())),
        }
    }
}

/// Look for a cycle in the graph.
///
/// Returns at most one cycle: the first one met by the traversal.
#[must_use]
pub fn detect_cycle(graph: &DependencyGraph) -> CycleCheck {
    let adjacency: Vec<Vec<NodeIndex>> = graph
        .tasks()
        .map(|(node, _)| graph.predecessor_nodes(node))
        .collect();
    let mut state = vec![VisitState::Unvisited; adjacency.len()];

    for (root, _) in graph.tasks() {
        if state[root.index()] != VisitState::Unvisited {
            continue;
        }

        let mut stack: Vec<(NodeIndex, usize)> = vec![(root, 0)];
        state[root.index()] = VisitState::InProgress;

        while let Some(&(node, next_edge)) = stack.last() {
            let Some(&neighbor) = adjacency[node.index()].get(next_edge) else {
                state[node.index()] = VisitState::Done;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match state[neighbor.index()] {
                VisitState::Unvisited => {
                    state[neighbor.index()] = VisitState::InProgress;
                    stack.push((neighbor, 0));
                }
                VisitState::InProgress => {
                    let start = stack
                        .iter()
                        .position(|&(on_stack, _)| on_stack == neighbor)
                        .unwrap_or(0);
                    let path: Vec<TaskId> = stack[start..]
                        .iter()
                        .map(|&(on_stack, _)| on_stack)
                        .chain(std::iter::once(neighbor))
                        .filter_map(|n| graph.task(n).map(|task| task.id.clone()))
                        .collect();
                    warn!(
                        project = %graph.project_id(),
                        length = path.len().saturating_sub(1),
                        "Dependency cycle detected"
                    );
                    return CycleCheck::Cycle(CyclePath(path));
                }
                VisitState::Done => {}
            }
        }
    }

    debug!(project = %graph.project_id(), "No dependency cycle");
    CycleCheck::Acyclic
}

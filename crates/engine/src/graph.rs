//! Dependency graph builder using petgraph.
//!
//! This module builds the per-project graph from a snapshot of task records:
//! every token is parsed, resolved against the project's sequence numbers and
//! sanitized before it becomes an edge.
//!
//! Edges point from a dependent task to its predecessor ("depends on"), so a
//! walk along outgoing edges visits what a task waits for.

use crate::parser::{RelationKind, parse_predecessors};
use crate::resolver::SequenceIndex;
use crate::sanitize::{SanitizeReport, sanitize_task};
use crate::{Diagnostic, ProjectId, ProjectSnapshot, TaskId, TaskRecord};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A resolved dependency between two tasks of the same project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    /// The task being waited for (link source).
    pub predecessor: TaskId,
    /// The dependent task (link target).
    pub successor: TaskId,
    /// Relation between the two.
    pub relation: RelationKind,
    /// Signed offset in days.
    pub lag_days: i32,
}

impl DependencyEdge {
    /// Whether the edge points a task at itself.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.predecessor == self.successor
    }
}

/// Output of [`DependencyGraph::build`].
#[derive(Debug)]
pub struct GraphBuild {
    /// The sanitized graph.
    pub graph: DependencyGraph,
    /// Self-references removed during the build.
    pub sanitize: SanitizeReport,
    /// Soft conditions found while building, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Dependency graph over one project's tasks.
///
/// Built fresh from a snapshot and never modified afterwards.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    project_id: ProjectId,
    /// Node weights are the task records; edges run successor -> predecessor.
    graph: DiGraph<TaskRecord, DependencyEdge>,
    /// Map from task ids to node indices.
    id_to_node: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph for a project snapshot.
    ///
    /// Never fails. Malformed tokens, unresolved references, duplicate ids,
    /// records from other projects and self-references are all reported as
    /// diagnostics and left out of the graph.
    #[must_use]
    pub fn build(snapshot: &ProjectSnapshot) -> GraphBuild {
        let mut diagnostics = Vec::new();
        let mut graph = DiGraph::new();
        let mut id_to_node = HashMap::new();

        for task in &snapshot.tasks {
            if task.project_id != snapshot.project_id {
                warn!(task = %task.id, project = %task.project_id, "Skipping task from another project");
                diagnostics.push(Diagnostic::ForeignProject {
                    task_id: task.id.clone(),
                    project_id: task.project_id.clone(),
                });
                continue;
            }
            if id_to_node.contains_key(&task.id) {
                warn!(task = %task.id, "Skipping duplicate task id");
                diagnostics.push(Diagnostic::DuplicateTask {
                    task_id: task.id.clone(),
                });
                continue;
            }
            let node = graph.add_node(task.clone());
            id_to_node.insert(task.id.clone(), node);
            debug!(task = %task.id, sequence = task.sequence, "Added task node");
        }

        let (index, duplicates) = SequenceIndex::build(graph.node_weights());
        diagnostics.extend(duplicates);

        let mut sanitize = SanitizeReport::default();
        let mut edges_to_add = Vec::new();

        for (node, task) in graph.node_indices().zip(graph.node_weights()) {
            let parsed = parse_predecessors(&task.predecessors);
            for rejected in parsed.rejected {
                warn!(task = %task.id, token = %rejected.token, reason = %rejected.reason, "Dropped malformed token");
                diagnostics.push(Diagnostic::Parse {
                    task_id: task.id.clone(),
                    token: rejected.token,
                    reason: rejected.reason,
                });
            }

            let resolved = index.resolve_tokens(&task.id, &parsed.tokens, &mut diagnostics);
            let (edges, repair) = sanitize_task(task, &index, resolved);
            if let Some(repair) = repair {
                diagnostics.extend(repair.removed.iter().map(|token| Diagnostic::SelfReference {
                    task_id: task.id.clone(),
                    token: token.clone(),
                }));
                sanitize.repairs.push(repair);
            }

            for edge in edges {
                if let Some(&predecessor) = id_to_node.get(&edge.predecessor) {
                    edges_to_add.push((node, predecessor, edge));
                }
            }
        }

        for (from, to, edge) in edges_to_add {
            graph.add_edge(from, to, edge);
        }

        debug!(
            project = %snapshot.project_id,
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            diagnostics = diagnostics.len(),
            "Built dependency graph"
        );

        GraphBuild {
            graph: Self {
                project_id: snapshot.project_id.clone(),
                graph,
                id_to_node,
            },
            sanitize,
            diagnostics,
        }
    }

    /// The project this graph covers.
    #[must_use]
    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of dependency edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the node index for a task by id.
    #[must_use]
    pub fn node_index(&self, id: &TaskId) -> Option<NodeIndex> {
        self.id_to_node.get(id).copied()
    }

    /// Get a task record by node index.
    #[must_use]
    pub fn task(&self, node: NodeIndex) -> Option<&TaskRecord> {
        self.graph.node_weight(node)
    }

    /// Iterate over tasks in snapshot order.
    pub fn tasks(&self) -> impl Iterator<Item = (NodeIndex, &TaskRecord)> {
        self.graph.node_indices().zip(self.graph.node_weights())
    }

    /// Iterate over every edge, grouped by successor in snapshot order and
    /// in token order within a successor.
    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.graph.edge_weights()
    }

    /// Predecessor edges of a task, in token order.
    #[must_use]
    pub fn predecessors(&self, node: NodeIndex) -> Vec<&DependencyEdge> {
        self.ordered_edges(node, Direction::Outgoing)
            .into_iter()
            .map(|(_, edge)| edge)
            .collect()
    }

    /// Node indices of a task's predecessors, in token order.
    #[must_use]
    pub fn predecessor_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_edges(node, Direction::Outgoing)
            .into_iter()
            .map(|(other, _)| other)
            .collect()
    }

    /// Node indices of the tasks that depend on `node`.
    #[must_use]
    pub fn dependent_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.ordered_edges(node, Direction::Incoming)
            .into_iter()
            .map(|(other, _)| other)
            .collect()
    }

    /// Whether any edge points a task at itself.
    #[must_use]
    pub fn has_self_loops(&self) -> bool {
        self.graph.edge_weights().any(DependencyEdge::is_self_loop)
    }

    /// petgraph hands out adjacent edges newest first; sort back into
    /// insertion order.
    fn ordered_edges(
        &self,
        node: NodeIndex,
        direction: Direction,
    ) -> Vec<(NodeIndex, &DependencyEdge)> {
        let mut edges: Vec<_> = self.graph.edges_directed(node, direction).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                (other, edge.weight())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(tasks: Vec<TaskRecord>) -> ProjectSnapshot {
        ProjectSnapshot::new("p", tasks)
    }

    #[test]
    fn test_build_empty_graph() {
        let build = DependencyGraph::build(&snapshot(vec![]));
        assert!(build.graph.is_empty());
        assert_eq!(build.graph.edge_count(), 0);
        assert!(build.diagnostics.is_empty());
    }

    #[test]
    fn test_edges_point_to_predecessors() {
        let build = DependencyGraph::build(&snapshot(vec![
            TaskRecord::new("a", "p", 1, "A"),
            TaskRecord::new("b", "p", 2, "B").with_predecessors("1FS+2d"),
            TaskRecord::new("c", "p", 3, "C").with_predecessors("2SS;1FF-1d"),
        ]));
        let graph = build.graph;
        assert_eq!(graph.task_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let c = graph.node_index(&TaskId::from("c")).unwrap();
        let preds: Vec<&str> = graph
            .predecessors(c)
            .iter()
            .map(|e| e.predecessor.as_str())
            .collect();
        assert_eq!(preds, vec!["b", "a"]);
        let c_edges = graph.predecessors(c);
        assert_eq!(c_edges[1].relation, RelationKind::FinishToFinish);
        assert_eq!(c_edges[1].lag_days, -1);

        let a = graph.node_index(&TaskId::from("a")).unwrap();
        assert!(graph.predecessors(a).is_empty());
        let dependents: Vec<&str> = graph
            .dependent_nodes(a)
            .into_iter()
            .map(|n| graph.task(n).unwrap().id.as_str())
            .collect();
        assert_eq!(dependents, vec!["b", "c"]);
    }

    #[test]
    fn test_build_reports_soft_conditions() {
        let build = DependencyGraph::build(&snapshot(vec![
            TaskRecord::new("a", "p", 1, "A").with_predecessors("1FS"),
            TaskRecord::new("b", "p", 2, "B").with_predecessors("7FS;FS+1d;1SS"),
            TaskRecord::new("b", "p", 3, "B again"),
            TaskRecord::new("x", "other", 4, "X"),
        ]));

        assert_eq!(build.graph.task_count(), 2);
        assert_eq!(build.graph.edge_count(), 1);
        assert!(!build.graph.has_self_loops());
        assert_eq!(build.sanitize.removed_count(), 1);

        let kinds: Vec<&str> = build
            .diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::Parse { .. } => "parse",
                Diagnostic::UnresolvedReference { .. } => "unresolved",
                Diagnostic::SelfReference { .. } => "self",
                Diagnostic::DuplicateSequence { .. } => "dup-seq",
                Diagnostic::DuplicateTask { .. } => "dup-task",
                Diagnostic::ForeignProject { .. } => "foreign",
                Diagnostic::DateOverflow { .. } => "overflow",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["dup-task", "foreign", "self", "parse", "unresolved"]
        );
    }
}

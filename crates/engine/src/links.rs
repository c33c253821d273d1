//! Visualization links for the Gantt widget.

use crate::parser::RelationKind;
use crate::{DependencyGraph, TaskId};
use serde::Serialize;

/// One dependency arrow on the timeline.
///
/// The lag is deliberately not carried: the widget only draws that a
/// dependency exists and which way it points. A `2FS+5d` and a `2FS` render
/// the same.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GanttLink {
    /// `<target id>_<edge index>`.
    pub id: String,
    /// The predecessor.
    pub source: TaskId,
    /// The dependent task.
    pub target: TaskId,
    /// Relation, serialized as the widget's link type code.
    #[serde(rename = "type", serialize_with = "serialize_link_type")]
    pub relation: RelationKind,
}

fn serialize_link_type<S: serde::Serializer>(
    relation: &RelationKind,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(relation.gantt_link_type())
}

/// Emit one link per resolved edge, tasks in snapshot order.
#[must_use]
pub fn build_links(graph: &DependencyGraph) -> Vec<GanttLink> {
    graph
        .tasks()
        .flat_map(|(node, task)| {
            graph
                .predecessors(node)
                .into_iter()
                .enumerate()
                .map(move |(index, edge)| GanttLink {
                    id: format!("{}_{}", task.id, index),
                    source: edge.predecessor.clone(),
                    target: edge.successor.clone(),
                    relation: edge.relation,
                })
        })
        .collect()
}

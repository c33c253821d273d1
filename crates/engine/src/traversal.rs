//! Traversal orders over a dependency graph.

use crate::cycle::{CycleCheck, detect_cycle};
use crate::{DependencyGraph, Error, Result};
use petgraph::graph::NodeIndex;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Tasks ordered so that every predecessor comes before its dependents.
pub type TopologicalOrder = Vec<NodeIndex>;

/// Compute a topological order, breaking ties by ascending sequence number.
///
/// Tasks that share a sequence number fall back to snapshot order.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`] if the graph contains a cycle.
pub fn topological_order(graph: &DependencyGraph) -> Result<TopologicalOrder> {
    let mut waiting_on: Vec<usize> = graph
        .tasks()
        .map(|(node, _)| graph.predecessor_nodes(node).len())
        .collect();

    let mut ready = BinaryHeap::new();
    for (node, task) in graph.tasks() {
        if waiting_on[node.index()] == 0 {
            ready.push(Reverse((task.sequence, node)));
        }
    }

    let mut order = Vec::with_capacity(waiting_on.len());
    while let Some(Reverse((_, node))) = ready.pop() {
        order.push(node);
        for dependent in graph.dependent_nodes(node) {
            let remaining = &mut waiting_on[dependent.index()];
            *remaining -= 1;
            if *remaining == 0 {
                if let Some(task) = graph.task(dependent) {
                    ready.push(Reverse((task.sequence, dependent)));
                }
            }
        }
    }

    if order.len() == waiting_on.len() {
        return Ok(order);
    }

    match detect_cycle(graph) {
        CycleCheck::Cycle(path) => Err(Error::cycle(path.into_ids())),
        CycleCheck::Acyclic => Err(Error::cycle(Vec::new())),
    }
}

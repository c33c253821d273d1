//! Forward-pass date propagation.
//!
//! Tasks are visited in topological order. Any start or end date the task
//! does not carry explicitly is derived from its predecessors:
//!
//! | Relation | Derives | From |
//! |---|---|---|
//! | FS | start | predecessor end + lag + 1 day |
//! | SS | start | predecessor start + lag |
//! | FF | end | predecessor end + lag |
//! | SF | end | predecessor start + lag |
//!
//! With several predecessors the latest candidate wins. Explicit dates are
//! authoritative and are never replaced. Results are returned to the caller
//! and never written back into the records.

use crate::parser::RelationKind;
use crate::traversal::topological_order;
use crate::{DependencyGraph, Diagnostic, Result, TaskId, TaskRecord};
use chrono::{NaiveDate, TimeDelta};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Knobs for the schedule pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleOptions {
    /// Fill a missing end (or start) from the other end and the task's
    /// duration once the forward pass is done.
    #[serde(default)]
    pub derive_from_duration: bool,
}

/// Effective dates of one task after the forward pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSchedule {
    /// The task.
    pub task_id: TaskId,
    /// Explicit start, otherwise the derived one.
    pub start: Option<NaiveDate>,
    /// Explicit end, otherwise the derived one.
    pub end: Option<NaiveDate>,
    /// `start` was derived rather than read from the record.
    pub start_calculated: bool,
    /// `end` was derived rather than read from the record.
    pub end_calculated: bool,
}

impl TaskSchedule {
    /// The start date only if it was derived.
    #[must_use]
    pub fn computed_start(&self) -> Option<NaiveDate> {
        self.start.filter(|_| self.start_calculated)
    }

    /// The end date only if it was derived.
    #[must_use]
    pub fn computed_end(&self) -> Option<NaiveDate> {
        self.end.filter(|_| self.end_calculated)
    }
}

/// Schedule for every task of a project, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleResult {
    tasks: Vec<TaskSchedule>,
    #[serde(skip)]
    index: HashMap<TaskId, usize>,
    /// Date computations that could not be carried out.
    pub diagnostics: Vec<Diagnostic>,
}

impl ScheduleResult {
    /// Schedule entry for a task.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&TaskSchedule> {
        self.index.get(id).and_then(|&i| self.tasks.get(i))
    }

    /// All entries in snapshot order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskSchedule] {
        &self.tasks
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Run the forward pass over an acyclic graph.
///
/// # Errors
///
/// Returns [`Error::CycleDetected`](crate::Error::CycleDetected) if the graph
/// cannot be ordered topologically.
#[instrument(skip_all, fields(project = %graph.project_id()))]
pub fn resolve_schedule(graph: &DependencyGraph, options: &ScheduleOptions) -> Result<ScheduleResult> {
    let order = topological_order(graph)?;
    let mut slots: Vec<Option<TaskSchedule>> = vec![None; graph.task_count()];
    let mut diagnostics = Vec::new();

    for node in order {
        let Some(task) = graph.task(node) else {
            continue;
        };
        let (schedule, overflowed) = schedule_task(graph, node, task, &slots, options);
        if overflowed {
            warn!(task = %task.id, "Date computation out of range");
            diagnostics.push(Diagnostic::DateOverflow {
                task_id: task.id.clone(),
            });
        }
        slots[node.index()] = Some(schedule);
    }

    let tasks: Vec<TaskSchedule> = graph
        .tasks()
        .filter_map(|(node, _)| slots[node.index()].take())
        .collect();
    let index = tasks
        .iter()
        .enumerate()
        .map(|(i, entry)| (entry.task_id.clone(), i))
        .collect();

    debug!(
        tasks = tasks.len(),
        derived_starts = tasks.iter().filter(|t| t.start_calculated).count(),
        derived_ends = tasks.iter().filter(|t| t.end_calculated).count(),
        "Resolved schedule"
    );

    Ok(ScheduleResult {
        tasks,
        index,
        diagnostics,
    })
}

fn schedule_task(
    graph: &DependencyGraph,
    node: NodeIndex,
    task: &TaskRecord,
    slots: &[Option<TaskSchedule>],
    options: &ScheduleOptions,
) -> (TaskSchedule, bool) {
    let mut start_candidate: Option<NaiveDate> = None;
    let mut end_candidate: Option<NaiveDate> = None;
    let mut overflowed = false;

    for edge in graph.predecessors(node) {
        let constrains_start = edge.relation.constrains_start();
        let explicit = if constrains_start {
            task.start_date
        } else {
            task.end_date
        };
        if explicit.is_some() {
            continue;
        }

        let Some(predecessor) = graph
            .node_index(&edge.predecessor)
            .and_then(|n| slots.get(n.index()))
            .and_then(Option::as_ref)
        else {
            continue;
        };

        let lag = i64::from(edge.lag_days);
        let (base, offset) = match edge.relation {
            RelationKind::FinishToStart => (predecessor.end, lag + 1),
            RelationKind::StartToStart => (predecessor.start, lag),
            RelationKind::FinishToFinish => (predecessor.end, lag),
            RelationKind::StartToFinish => (predecessor.start, lag),
        };
        let Some(base) = base else {
            continue;
        };

        match shift(base, offset) {
            Some(candidate) if constrains_start => {
                start_candidate = start_candidate.max(Some(candidate));
            }
            Some(candidate) => end_candidate = end_candidate.max(Some(candidate)),
            None => overflowed = true,
        }
    }

    let mut schedule = TaskSchedule {
        task_id: task.id.clone(),
        start: task.start_date.or(start_candidate),
        end: task.end_date.or(end_candidate),
        start_calculated: task.start_date.is_none() && start_candidate.is_some(),
        end_calculated: task.end_date.is_none() && end_candidate.is_some(),
    };

    if options.derive_from_duration {
        if let Some(span) = task.duration.filter(|&days| days > 0) {
            let span = i64::from(span) - 1;
            match (schedule.start, schedule.end) {
                (Some(start), None) => match shift(start, span) {
                    Some(end) => {
                        schedule.end = Some(end);
                        schedule.end_calculated = true;
                    }
                    None => overflowed = true,
                },
                (None, Some(end)) => match shift(end, -span) {
                    Some(start) => {
                        schedule.start = Some(start);
                        schedule.start_calculated = true;
                    }
                    None => overflowed = true,
                },
                _ => {}
            }
        }
    }

    (schedule, overflowed)
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    TimeDelta::try_days(days).and_then(|delta| date.checked_add_signed(delta))
}

//! End-to-end processing of task snapshots.
//!
//! Chains the pieces in their fixed order: parse, resolve, build, sanitize,
//! check for cycles, schedule (only when acyclic), order, link and lay out
//! timeline rows.

use crate::cycle::{CycleCheck, detect_cycle};
use crate::links::{GanttLink, build_links};
use crate::order::{CanonicalOrder, project_order};
use crate::sanitize::SanitizeReport;
use crate::schedule::{ScheduleOptions, ScheduleResult, resolve_schedule};
use crate::timeline::{TimelineRow, aggregate_rows, project_rows};
use crate::{DependencyGraph, Diagnostic, ProjectId, ProjectSnapshot, TaskId, TaskRecord};
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Everything derived for one project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalysis {
    /// The analysed project.
    pub project_id: ProjectId,
    /// Cycle check outcome.
    pub cycle: CycleCheck,
    /// Forward-pass result; absent when the project has a cycle.
    pub schedule: Option<ScheduleResult>,
    /// Task ids for the project's own table view.
    pub project_order: Vec<TaskId>,
    /// Dependency arrows for the timeline.
    pub links: Vec<GanttLink>,
    /// Bars for the project's own timeline.
    pub timeline: Vec<TimelineRow>,
    /// Self-references the sanitizer removed.
    pub sanitize: SanitizeReport,
    /// All soft conditions, in discovery order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ProjectAnalysis {
    /// Whether scheduling was skipped because of a cycle.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        !self.cycle.is_acyclic()
    }
}

/// Run the whole pipeline for one project.
///
/// Cycles stop the schedule pass only: ordering, links and timeline rows
/// (from raw record dates) are still produced.
#[must_use]
#[instrument(skip_all, fields(project = %snapshot.project_id, tasks = snapshot.len()))]
pub fn analyze_project(snapshot: &ProjectSnapshot, options: &ScheduleOptions) -> ProjectAnalysis {
    let build = DependencyGraph::build(snapshot);
    let graph = build.graph;
    let mut diagnostics = build.diagnostics;

    let cycle = detect_cycle(&graph);
    let schedule = if cycle.is_acyclic() {
        match resolve_schedule(&graph, options) {
            Ok(schedule) => {
                diagnostics.extend(schedule.diagnostics.iter().cloned());
                Some(schedule)
            }
            Err(e) => {
                warn!(error = %e, "Schedule pass failed");
                None
            }
        }
    } else {
        None
    };

    let project_order = project_order(graph.tasks().map(|(_, task)| task));
    let links = build_links(&graph);
    let timeline = project_rows(&graph, schedule.as_ref());

    info!(
        acyclic = cycle.is_acyclic(),
        links = links.len(),
        rows = timeline.len(),
        diagnostics = diagnostics.len(),
        "Analysed project"
    );

    ProjectAnalysis {
        project_id: snapshot.project_id.clone(),
        cycle,
        schedule,
        project_order,
        links,
        timeline,
        sanitize: build.sanitize,
        diagnostics,
    }
}

/// Split a flat record list by project and analyse each project on its own.
#[must_use]
pub fn analyze_records(
    records: impl IntoIterator<Item = TaskRecord>,
    options: &ScheduleOptions,
) -> Vec<ProjectAnalysis> {
    ProjectSnapshot::partition(records)
        .iter()
        .map(|snapshot| analyze_project(snapshot, options))
        .collect()
}

/// Cross-project timeline ordered by the canonical name table.
///
/// Display ranks play no part here: ties keep each project's task-list order.
#[must_use]
pub fn aggregate_timeline(analyses: &[ProjectAnalysis], table: &CanonicalOrder) -> Vec<TimelineRow> {
    let rows = analyses.iter().flat_map(|analysis| {
        let mut rows: Vec<&TimelineRow> = analysis.timeline.iter().collect();
        rows.sort_by_key(|row| row.position);
        rows
    });
    aggregate_rows(rows, table)
}

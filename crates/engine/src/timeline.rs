//! Timeline rows handed to the chart layer.

use crate::order::{CanonicalOrder, UNLISTED_ORDER, sort_by_display_rank};
use crate::schedule::ScheduleResult;
use crate::{DependencyGraph, ProjectId, TaskId};
use chrono::NaiveDate;
use serde::Serialize;

/// One bar on a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineRow {
    /// The task.
    pub id: TaskId,
    /// Task name, the bar label.
    pub name: String,
    /// Owning project.
    pub project_id: ProjectId,
    /// First day of the bar.
    pub start: NaiveDate,
    /// Last day of the bar.
    pub end: NaiveDate,
    /// Days covered, both ends included.
    pub duration: i64,
    /// `start` was derived by the schedule pass.
    pub start_calculated: bool,
    /// `end` was derived by the schedule pass.
    pub end_calculated: bool,
    /// Order value used to place the row in its view.
    pub order: i64,
    /// Index of the task within its project's task list.
    pub position: usize,
}

/// Rows for one project's own timeline, in display-rank order.
///
/// Uses the schedule when there is one and the raw record dates otherwise
/// (for example when the project has a cycle). Tasks without both a start
/// and an end have no bar and are left out.
#[must_use]
pub fn project_rows(graph: &DependencyGraph, schedule: Option<&ScheduleResult>) -> Vec<TimelineRow> {
    let mut ranked: Vec<(Option<i64>, TimelineRow)> = graph
        .tasks()
        .enumerate()
        .filter_map(|(position, (_, task))| {
            let (start, end, start_calculated, end_calculated) =
                match schedule.and_then(|s| s.get(&task.id)) {
                    Some(entry) => (
                        entry.start,
                        entry.end,
                        entry.start_calculated,
                        entry.end_calculated,
                    ),
                    None => (task.start_date, task.end_date, false, false),
                };
            let (start, end) = (start?, end?);
            let row = TimelineRow {
                id: task.id.clone(),
                name: task.name.clone(),
                project_id: task.project_id.clone(),
                start,
                end,
                duration: (end - start).num_days() + 1,
                start_calculated,
                end_calculated,
                order: task.display_rank.unwrap_or(UNLISTED_ORDER),
                position,
            };
            Some((task.display_rank, row))
        })
        .collect();

    // Sort on the record's rank, not the reported order: 9999 is a valid rank.
    sort_by_display_rank(&mut ranked, |(rank, _)| *rank);
    ranked.into_iter().map(|(_, row)| row).collect()
}

/// Merge per-project rows into the cross-project timeline.
///
/// Rows are re-ranked by the canonical name table; unlisted names go last
/// and keep their incoming order, so pass each project's rows in
/// [`TimelineRow::position`] order.
#[must_use]
pub fn aggregate_rows<'a>(
    rows: impl IntoIterator<Item = &'a TimelineRow>,
    table: &CanonicalOrder,
) -> Vec<TimelineRow> {
    let mut merged: Vec<TimelineRow> = rows
        .into_iter()
        .map(|row| TimelineRow {
            order: table.rank(&row.name),
            ..row.clone()
        })
        .collect();
    table.sort_by_name(&mut merged, |row| row.name.as_str());
    merged
}

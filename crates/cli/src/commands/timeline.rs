//! `taskline timeline`: the cross-project timeline.

use super::{Context, Outcome, write_json};
use crate::errors::CliResult;
use serde::Serialize;
use std::io::Write;
use taskline_engine::{
    CanonicalOrder, DATE_FORMAT, GanttLink, ScheduleOptions, TaskRecord, TimelineRow,
    aggregate_timeline, analyze_records,
};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct TimelineOutput {
    pub rows: Vec<TimelineRow>,
    pub links: Vec<GanttLink>,
}

pub fn execute(
    records: Vec<TaskRecord>,
    options: &ScheduleOptions,
    table: &CanonicalOrder,
    ctx: &Context,
    out: &mut impl Write,
) -> CliResult<Outcome> {
    let analyses = analyze_records(records, options);
    let output = TimelineOutput {
        rows: aggregate_timeline(&analyses, table),
        links: analyses.iter().flat_map(|a| a.links.iter().cloned()).collect(),
    };
    info!(
        projects = analyses.len(),
        rows = output.rows.len(),
        table_entries = table.len(),
        "Built aggregate timeline"
    );

    if ctx.json {
        write_json(out, &output)?;
    } else {
        writeln!(
            out,
            "{:<6} {:<24} {:<12} {:<12} {:<12} {:>5}",
            "ORDER", "NAME", "PROJECT", "START", "END", "DAYS"
        )?;
        for row in &output.rows {
            writeln!(
                out,
                "{:<6} {:<24} {:<12} {:<12} {:<12} {:>5}",
                row.order,
                row.name,
                row.project_id.as_str(),
                row.start.format(DATE_FORMAT).to_string(),
                row.end.format(DATE_FORMAT).to_string(),
                row.duration
            )?;
        }
    }

    let blocked = analyses.iter().any(|a| a.is_blocked());
    Ok(if blocked {
        Outcome::CycleFound
    } else {
        Outcome::Success
    })
}

//! `taskline schedule`: full per-project analysis.

use super::{Context, Outcome, write_json};
use crate::errors::CliResult;
use chrono::NaiveDate;
use std::io::Write;
use taskline_engine::{
    CycleCheck, DATE_FORMAT, ProjectAnalysis, ScheduleOptions, TaskId, TaskRecord, analyze_records,
};
use tracing::info;

pub fn execute(
    records: Vec<TaskRecord>,
    options: &ScheduleOptions,
    ctx: &Context,
    out: &mut impl Write,
) -> CliResult<Outcome> {
    let names: Vec<(TaskId, String)> = records
        .iter()
        .map(|t| (t.id.clone(), t.name.clone()))
        .collect();
    let analyses = analyze_records(records, options);
    let blocked = analyses.iter().filter(|a| a.is_blocked()).count();
    info!(projects = analyses.len(), blocked, "Scheduled projects");

    if ctx.json {
        write_json(out, &analyses)?;
    } else {
        for analysis in &analyses {
            render(analysis, &names, out)?;
        }
    }

    Ok(if blocked == 0 {
        Outcome::Success
    } else {
        Outcome::CycleFound
    })
}

fn format_date(date: Option<NaiveDate>, calculated: bool) -> String {
    match date {
        Some(date) if calculated => format!("{}*", date.format(DATE_FORMAT)),
        Some(date) => date.format(DATE_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

fn render(
    analysis: &ProjectAnalysis,
    names: &[(TaskId, String)],
    out: &mut impl Write,
) -> CliResult<()> {
    writeln!(out, "=== Project {} ===", analysis.project_id)?;

    let Some(schedule) = &analysis.schedule else {
        if let CycleCheck::Cycle(path) = &analysis.cycle {
            let ids: Vec<&str> = path.ids().iter().map(TaskId::as_str).collect();
            writeln!(out, "Not scheduled, cycle: {}", ids.join(" -> "))?;
        }
        return Ok(());
    };

    writeln!(out, "{:<12} {:<24} {:<12} {:<12}", "ID", "NAME", "START", "END")?;
    for id in &analysis.project_order {
        let Some(entry) = schedule.get(id) else {
            continue;
        };
        let name = names
            .iter()
            .find(|(task_id, _)| task_id == id)
            .map_or("", |(_, name)| name.as_str());
        writeln!(
            out,
            "{:<12} {:<24} {:<12} {:<12}",
            id.as_str(),
            name,
            format_date(entry.start, entry.start_calculated),
            format_date(entry.end, entry.end_calculated)
        )?;
    }
    for diagnostic in &analysis.diagnostics {
        writeln!(out, "warning: {diagnostic}")?;
    }
    writeln!(out, "(* = derived from dependencies)")?;
    Ok(())
}

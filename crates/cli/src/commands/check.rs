//! `taskline check`: show how every dependency string is read and report
//! cycles per project.

use super::{Context, Outcome, write_json};
use crate::errors::CliResult;
use serde::Serialize;
use std::io::Write;
use taskline_engine::{
    CycleCheck, DependencyGraph, Diagnostic, ProjectId, ProjectSnapshot, RelationKind,
    SanitizeReport, SequenceIndex, TaskId, TaskRecord, detect_cycle, parse_predecessors,
};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct MappingRow {
    pub sequence: u32,
    pub name: String,
    pub id: TaskId,
    pub predecessors: String,
}

/// How one token of a dependency string was read.
#[derive(Debug, Serialize)]
pub struct TokenReading {
    pub task_id: TaskId,
    pub token: String,
    pub reference: Option<String>,
    pub relation: Option<RelationKind>,
    pub lag_days: Option<i32>,
    /// Task the reference resolved to.
    pub resolved: Option<TaskId>,
    /// Parse failure, if the token was dropped.
    pub rejected: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectCheck {
    pub project_id: ProjectId,
    pub mapping: Vec<MappingRow>,
    pub readings: Vec<TokenReading>,
    pub sanitize: SanitizeReport,
    pub cycle: CycleCheck,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn check_project(snapshot: &ProjectSnapshot) -> ProjectCheck {
    let mapping = snapshot
        .tasks
        .iter()
        .map(|task| MappingRow {
            sequence: task.sequence,
            name: task.name.clone(),
            id: task.id.clone(),
            predecessors: task.predecessors.clone(),
        })
        .collect();

    let build = DependencyGraph::build(snapshot);

    // Read tokens against the tasks that made it into the graph, so each
    // resolved id matches the edge that was built.
    let (index, _) = SequenceIndex::build(build.graph.tasks().map(|(_, task)| task));
    let readings = build
        .graph
        .tasks()
        .flat_map(|(_, task)| read_tokens(task, &index))
        .collect();

    let cycle = detect_cycle(&build.graph);
    if let Some(path) = cycle.cycle() {
        warn!(project = %snapshot.project_id, length = path.len(), "Cycle detected");
    }

    ProjectCheck {
        project_id: snapshot.project_id.clone(),
        mapping,
        readings,
        sanitize: build.sanitize,
        cycle,
        diagnostics: build.diagnostics,
    }
}

fn read_tokens(task: &TaskRecord, index: &SequenceIndex) -> Vec<TokenReading> {
    let parsed = parse_predecessors(&task.predecessors);
    let accepted = parsed.tokens.into_iter().map(|token| TokenReading {
        task_id: task.id.clone(),
        token: token.to_string(),
        resolved: index.resolve(&token.reference).cloned(),
        reference: Some(token.reference),
        relation: Some(token.relation),
        lag_days: Some(token.lag_days),
        rejected: None,
    });
    let rejected = parsed.rejected.into_iter().map(|r| TokenReading {
        task_id: task.id.clone(),
        token: r.token,
        reference: None,
        relation: None,
        lag_days: None,
        resolved: None,
        rejected: Some(r.reason),
    });
    accepted.chain(rejected).collect()
}

pub fn execute(records: &[TaskRecord], ctx: &Context, out: &mut impl Write) -> CliResult<Outcome> {
    let checks: Vec<ProjectCheck> = ProjectSnapshot::partition(records.iter().cloned())
        .iter()
        .map(check_project)
        .collect();
    let cycles = checks.iter().filter(|c| !c.cycle.is_acyclic()).count();
    info!(projects = checks.len(), cycles, "Checked dependencies");

    if ctx.json {
        write_json(out, &checks)?;
    } else {
        writeln!(out, "Tasks found: {}", records.len())?;
        for check in &checks {
            render(check, out)?;
        }
    }

    Ok(if cycles == 0 {
        Outcome::Success
    } else {
        Outcome::CycleFound
    })
}

fn render(check: &ProjectCheck, out: &mut impl Write) -> CliResult<()> {
    writeln!(out, "\n=== Project {} ===", check.project_id)?;

    writeln!(out, "--- Task mapping (sequence, name, id) ---")?;
    for row in &check.mapping {
        writeln!(
            out,
            "{}: {} ({}) | predecessors: {}",
            row.sequence, row.name, row.id, row.predecessors
        )?;
    }

    writeln!(out, "--- Dependency interpretation ---")?;
    for reading in &check.readings {
        match (&reading.rejected, &reading.reference) {
            (Some(reason), _) => writeln!(
                out,
                "  {}: raw '{}' | dropped: {}",
                reading.task_id, reading.token, reason
            )?,
            (None, Some(reference)) => {
                let resolved = reading
                    .resolved
                    .as_ref()
                    .map_or_else(|| "<unresolved>".to_string(), ToString::to_string);
                writeln!(
                    out,
                    "  {}: raw '{}' | sequence '{}' | resolved id '{}'",
                    reading.task_id, reading.token, reference, resolved
                )?;
            }
            (None, None) => {}
        }
    }

    for repair in &check.sanitize.repairs {
        writeln!(
            out,
            "Self-reference removed from {}: {} -> '{}'",
            repair.task_id,
            repair.removed.join(";"),
            repair.repaired_predecessors
        )?;
    }

    match &check.cycle {
        CycleCheck::Acyclic => writeln!(out, "No cycles found.")?,
        CycleCheck::Cycle(path) => {
            let ids: Vec<&str> = path.ids().iter().map(TaskId::as_str).collect();
            writeln!(out, "Cycle detected: {}", ids.join(" -> "))?;
        }
    }
    Ok(())
}

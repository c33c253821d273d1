//! `taskline repair`: dependency strings with self-references taken out,
//! ready to be written back to the task store.

use super::write_json;
use crate::errors::CliResult;
use std::io::Write;
use taskline_engine::{ScheduleOptions, SelfReferenceRepair, TaskRecord, analyze_records};
use tracing::info;

pub fn execute(records: Vec<TaskRecord>, out: &mut impl Write) -> CliResult<()> {
    let repairs: Vec<SelfReferenceRepair> = analyze_records(records, &ScheduleOptions::default())
        .into_iter()
        .flat_map(|analysis| analysis.sanitize.repairs)
        .collect();
    info!(repaired = repairs.len(), "Collected self-reference repairs");
    write_json(out, &repairs)
}

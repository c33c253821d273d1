//! Task dependency graph and schedule propagation for taskline.
//!
//! This crate turns a snapshot of one project's task records into a
//! dependency graph, checks it for cycles and derives the start and end
//! dates that tasks do not carry explicitly. It also produces the orders and
//! link lists the timeline views need.
//!
//! The engine is a pure function of its inputs: no I/O, no shared state, and
//! a fresh graph for every call.
//!
//! # Key Types
//!
//! - [`TaskRecord`]: one task as delivered by the task store
//! - [`DependencyGraph`]: the per-project graph, built with petgraph
//! - [`CycleCheck`]: outcome of cycle detection
//! - [`ScheduleResult`]: effective dates and calculated flags per task
//! - [`ProjectAnalysis`]: everything above for one project
//!
//! # Example
//!
//! ```
//! use taskline_engine::{ProjectSnapshot, ScheduleOptions, TaskId, TaskRecord, analyze_project};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
//! let snapshot = ProjectSnapshot::new(
//!     "roof",
//!     vec![
//!         TaskRecord::new("t-1", "roof", 1, "Frame").with_start(start).with_end(end),
//!         TaskRecord::new("t-2", "roof", 2, "Tiles").with_predecessors("1FS+2d"),
//!     ],
//! );
//!
//! let analysis = analyze_project(&snapshot, &ScheduleOptions::default());
//! let tiles = analysis.schedule.unwrap();
//! let tiles = tiles.get(&TaskId::from("t-2")).unwrap();
//! assert_eq!(tiles.start, NaiveDate::from_ymd_opt(2025, 1, 13));
//! assert!(tiles.start_calculated);
//! ```

mod analysis;
mod cycle;
mod diagnostics;
mod error;
mod graph;
mod links;
mod order;
mod parser;
mod resolver;
mod sanitize;
mod schedule;
mod task;
mod timeline;
mod traversal;

pub use analysis::{ProjectAnalysis, aggregate_timeline, analyze_project, analyze_records};
pub use cycle::{CycleCheck, CyclePath, detect_cycle};
pub use diagnostics::Diagnostic;
pub use error::{Error, Result};
pub use graph::{DependencyEdge, DependencyGraph, GraphBuild};
pub use links::{GanttLink, build_links};
pub use order::{
    CanonicalOrder, OrderEntry, RankAssignment, UNLISTED_ORDER, aggregate_order, normalize_name,
    project_order, reassign_display_ranks, sort_by_display_rank,
};
pub use parser::{
    DependencyToken, ParsedPredecessors, RejectedToken, RelationKind, parse_predecessors,
    split_tokens,
};
pub use resolver::SequenceIndex;
pub use sanitize::{SanitizeReport, SelfReferenceRepair, sanitize_task};
pub use schedule::{ScheduleOptions, ScheduleResult, TaskSchedule, resolve_schedule};
pub use task::{DATE_FORMAT, ProjectId, ProjectSnapshot, TaskId, TaskRecord};
pub use timeline::{TimelineRow, aggregate_rows, project_rows};
pub use traversal::{TopologicalOrder, topological_order};

/// Version of the engine crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

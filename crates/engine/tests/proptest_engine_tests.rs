//! Property-based tests for graph and schedule invariants.
//!
//! These tests verify the behavioral contracts of the engine:
//! - Cycle detection is accurate
//! - Derived dates satisfy every dependency constraint
//! - Scheduling is deterministic
//! - Parsing never panics and sanitized graphs have no self-edges

use chrono::NaiveDate;
use proptest::prelude::*;
use std::collections::HashMap;
use taskline_engine::{
    CycleCheck, DependencyGraph, ProjectSnapshot, RelationKind, ScheduleOptions, TaskId,
    TaskRecord, detect_cycle, parse_predecessors, resolve_schedule, topological_order,
};

// =============================================================================
// Strategies for generating test data
// =============================================================================

fn relation_strategy() -> impl Strategy<Value = RelationKind> {
    prop_oneof![
        Just(RelationKind::FinishToStart),
        Just(RelationKind::StartToStart),
        Just(RelationKind::FinishToFinish),
        Just(RelationKind::StartToFinish),
    ]
}

/// One dependency on an earlier task: (index, relation, lag).
fn dependency_strategy(earlier: usize) -> impl Strategy<Value = (usize, RelationKind, i32)> {
    (0..earlier, relation_strategy(), -5..=5_i32)
}

/// Generate a DAG as per-task dependency lists.
///
/// Tasks only depend on tasks with lower indices, so no cycle can form. The
/// first task always gets explicit dates so the forward pass has an anchor.
fn dag_strategy(
    min_tasks: usize,
    max_tasks: usize,
) -> impl Strategy<Value = Vec<Vec<(usize, RelationKind, i32)>>> {
    (min_tasks..=max_tasks).prop_flat_map(|task_count| {
        let deps: Vec<_> = (0..task_count)
            .map(|i| {
                if i == 0 {
                    Just(vec![]).boxed()
                } else {
                    proptest::collection::vec(dependency_strategy(i), 0..=i.min(3)).boxed()
                }
            })
            .collect();
        deps
    })
}

fn dependency_string(deps: &[(usize, RelationKind, i32)]) -> String {
    deps.iter()
        .map(|(index, relation, lag)| {
            if *lag == 0 {
                format!("{}{}", index + 1, relation)
            } else {
                format!("{}{}{:+}d", index + 1, relation, lag)
            }
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn anchor_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
}

/// Build task records for a generated DAG; task `i` has sequence `i + 1`.
fn records(deps: &[Vec<(usize, RelationKind, i32)>]) -> Vec<TaskRecord> {
    deps.iter()
        .enumerate()
        .map(|(i, task_deps)| {
            let sequence = u32::try_from(i + 1).unwrap();
            let record = TaskRecord::new(format!("t{i}"), "p", sequence, format!("Task {i}"))
                .with_predecessors(dependency_string(task_deps));
            if i == 0 {
                record
                    .with_start(anchor_start())
                    .with_end(anchor_start() + chrono::TimeDelta::days(4))
            } else {
                record
            }
        })
        .collect()
}

fn graph_for(tasks: Vec<TaskRecord>) -> DependencyGraph {
    DependencyGraph::build(&ProjectSnapshot::new("p", tasks)).graph
}

// =============================================================================
// Property Tests: Cycle Detection
// =============================================================================

proptest! {
    /// Contract: Graphs whose edges only point to earlier tasks are acyclic.
    #[test]
    fn cycle_detection_identifies_dags(deps in dag_strategy(1, 20)) {
        let graph = graph_for(records(&deps));

        prop_assert!(detect_cycle(&graph).is_acyclic());
        let order = topological_order(&graph).expect("Order should exist for a DAG");
        prop_assert_eq!(order.len(), deps.len());
    }

    /// Contract: A back edge closing a chain is always reported, and the
    /// returned path starts and ends on the same task.
    #[test]
    fn cycle_detection_identifies_cycles(len in 2..12_usize) {
        let mut tasks: Vec<TaskRecord> = (0..len)
            .map(|i| {
                let sequence = u32::try_from(i + 1).unwrap();
                let record = TaskRecord::new(format!("t{i}"), "p", sequence, "Step");
                if i == 0 {
                    record
                } else {
                    record.with_predecessors(format!("{i}FS"))
                }
            })
            .collect();
        tasks[0] = tasks[0].clone().with_predecessors(format!("{len}FS"));

        let graph = graph_for(tasks);
        let check = detect_cycle(&graph);

        let CycleCheck::Cycle(path) = check else {
            return Err(TestCaseError::fail("cycle not detected"));
        };
        let ids = path.ids();
        prop_assert_eq!(ids.first(), ids.last());
        prop_assert_eq!(path.len(), len);
        prop_assert!(resolve_schedule(&graph, &ScheduleOptions::default()).is_err());
    }
}

// =============================================================================
// Property Tests: Scheduling
// =============================================================================

proptest! {
    /// Contract: Every derived date is the latest date any of its
    /// constraints allows, so no constraint is violated.
    #[test]
    fn derived_dates_respect_constraints(deps in dag_strategy(2, 15)) {
        let graph = graph_for(records(&deps));
        let schedule = resolve_schedule(&graph, &ScheduleOptions::default())
            .expect("Schedule should succeed for a DAG");

        let by_id: HashMap<&TaskId, _> = schedule
            .tasks()
            .iter()
            .map(|entry| (&entry.task_id, entry))
            .collect();

        for edge in graph.edges() {
            let succ = by_id[&edge.successor];
            let pred = by_id[&edge.predecessor];
            let lag = chrono::TimeDelta::days(i64::from(edge.lag_days));
            let (base, bound) = match edge.relation {
                RelationKind::FinishToStart => (pred.end, succ.start),
                RelationKind::StartToStart => (pred.start, succ.start),
                RelationKind::FinishToFinish => (pred.end, succ.end),
                RelationKind::StartToFinish => (pred.start, succ.end),
            };
            let (Some(base), Some(bound)) = (base, bound) else {
                continue;
            };
            let offset = if edge.relation == RelationKind::FinishToStart {
                lag + chrono::TimeDelta::days(1)
            } else {
                lag
            };
            prop_assert!(
                bound >= base + offset,
                "{} violates {} from {}",
                edge.successor, edge.relation, edge.predecessor
            );
        }
    }

    /// Contract: Scheduling the same input twice gives the same result.
    #[test]
    fn scheduling_is_idempotent(deps in dag_strategy(1, 15), fill in any::<bool>()) {
        let graph = graph_for(records(&deps));
        let options = ScheduleOptions { derive_from_duration: fill };

        let first = resolve_schedule(&graph, &options).expect("first pass");
        let second = resolve_schedule(&graph, &options).expect("second pass");

        prop_assert_eq!(first, second);
    }

    /// Contract: Explicit dates are never replaced or marked as calculated.
    #[test]
    fn explicit_dates_are_kept(deps in dag_strategy(1, 15)) {
        let tasks = records(&deps);
        let graph = graph_for(tasks.clone());
        let schedule = resolve_schedule(&graph, &ScheduleOptions::default()).expect("schedule");

        for task in &tasks {
            let entry = schedule.get(&task.id).expect("entry per task");
            if let Some(start) = task.start_date {
                prop_assert_eq!(entry.start, Some(start));
                prop_assert!(!entry.start_calculated);
            }
            if let Some(end) = task.end_date {
                prop_assert_eq!(entry.end, Some(end));
                prop_assert!(!entry.end_calculated);
            }
        }
    }
}

// =============================================================================
// Property Tests: Parsing and Sanitizing
// =============================================================================

proptest! {
    /// Contract: Arbitrary dependency strings never panic, and every
    /// non-empty token is either parsed or rejected.
    #[test]
    fn parser_accepts_arbitrary_input(raw in ".{0,64}") {
        let parsed = parse_predecessors(&raw);
        let non_empty = raw.split(';').filter(|t| !t.trim().is_empty()).count();
        prop_assert_eq!(parsed.tokens.len() + parsed.rejected.len(), non_empty);
    }

    /// Contract: Self-references never survive into the graph.
    #[test]
    fn no_self_edges_after_sanitizing(
        deps in dag_strategy(1, 10),
        self_refs in proptest::collection::vec(any::<bool>(), 10),
    ) {
        let tasks: Vec<TaskRecord> = records(&deps)
            .into_iter()
            .zip(self_refs.iter().chain(std::iter::repeat(&false)))
            .map(|(task, &add_self)| {
                if add_self {
                    let raw = format!("{};{}SS", task.predecessors, task.sequence);
                    task.with_predecessors(raw)
                } else {
                    task
                }
            })
            .collect();
        let expected = tasks
            .iter()
            .zip(&self_refs)
            .filter(|(_, add_self)| **add_self)
            .count();

        let build = DependencyGraph::build(&ProjectSnapshot::new("p", tasks));

        prop_assert!(!build.graph.has_self_loops());
        prop_assert!(build.graph.edges().all(|e| e.predecessor != e.successor));
        prop_assert_eq!(build.sanitize.removed_count(), expected);
    }
}

//! End-to-end tests over the public engine API.

use chrono::NaiveDate;
use taskline_engine::{
    CanonicalOrder, CycleCheck, Diagnostic, Error, ProjectSnapshot, RelationKind, ScheduleOptions,
    TaskId, TaskRecord, aggregate_timeline, analyze_project, analyze_records, detect_cycle,
    parse_predecessors, resolve_schedule,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, taskline_engine::DATE_FORMAT).unwrap()
}

fn ids(path: &[TaskId]) -> Vec<&str> {
    path.iter().map(TaskId::as_str).collect()
}

#[test]
fn test_parse_two_tokens_with_lag_and_lead() {
    let parsed = parse_predecessors("2FS+2d;3SS-1d");

    assert_eq!(parsed.tokens.len(), 2);
    assert_eq!(parsed.tokens[0].reference, "2");
    assert_eq!(parsed.tokens[0].relation, RelationKind::FinishToStart);
    assert_eq!(parsed.tokens[0].lag_days, 2);
    assert_eq!(parsed.tokens[1].reference, "3");
    assert_eq!(parsed.tokens[1].relation, RelationKind::StartToStart);
    assert_eq!(parsed.tokens[1].lag_days, -1);
}

#[test]
fn test_parse_empty_strings_yield_nothing() {
    for raw in ["", ";;", " ; "] {
        let parsed = parse_predecessors(raw);
        assert!(parsed.tokens.is_empty(), "{raw:?}");
        assert!(parsed.rejected.is_empty(), "{raw:?}");
    }
}

#[test]
fn test_self_reference_removed_before_cycle_check() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("t4", "p", 4, "Prep"),
            TaskRecord::new("t5", "p", 5, "Pour").with_predecessors("4FS;5FS"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());

    assert!(analysis.cycle.is_acyclic());
    assert_eq!(analysis.sanitize.removed_count(), 1);
    assert_eq!(analysis.sanitize.repairs[0].repaired_predecessors, "4FS");
    assert_eq!(analysis.links.len(), 1);
    assert!(analysis.links.iter().all(|l| l.source != l.target));
}

#[test]
fn test_three_task_cycle_path() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A").with_predecessors("2"),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("3"),
            TaskRecord::new("C", "p", 3, "C").with_predecessors("1"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());

    let CycleCheck::Cycle(path) = &analysis.cycle else {
        panic!("expected a cycle, got {:?}", analysis.cycle);
    };
    assert_eq!(ids(path.ids()), vec!["A", "B", "C", "A"]);
    assert_eq!(path.len(), 3);
    assert!(analysis.schedule.is_none());
}

#[test]
fn test_cycle_rejected_by_scheduler() {
    let build = taskline_engine::DependencyGraph::build(&ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A").with_predecessors("2"),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("1"),
        ],
    ));

    let err = resolve_schedule(&build.graph, &ScheduleOptions::default()).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }));
    assert!(!detect_cycle(&build.graph).is_acyclic());
}

#[test]
fn test_finish_to_start_chain() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A")
                .with_start(date("2025-01-01"))
                .with_end(date("2025-01-10")),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("1FS+2d"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());
    let schedule = analysis.schedule.unwrap();
    let b = schedule.get(&TaskId::from("B")).unwrap();

    assert_eq!(b.start, Some(date("2025-01-13")));
    assert!(b.start_calculated);
    assert_eq!(b.end, None);
}

#[test]
fn test_latest_candidate_wins() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A")
                .with_start(date("2025-01-20"))
                .with_end(date("2025-01-31")),
            TaskRecord::new("B", "p", 2, "B")
                .with_start(date("2025-02-05"))
                .with_end(date("2025-02-10")),
            TaskRecord::new("C", "p", 3, "C").with_predecessors("1FS;2SS"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());
    let schedule = analysis.schedule.unwrap();

    assert_eq!(
        schedule.get(&TaskId::from("C")).unwrap().start,
        Some(date("2025-02-05"))
    );
}

#[test]
fn test_explicit_start_is_kept() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A")
                .with_start(date("2025-01-01"))
                .with_end(date("2025-01-10")),
            TaskRecord::new("B", "p", 2, "B")
                .with_start(date("2025-01-02"))
                .with_predecessors("1FS"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());
    let b = analysis.schedule.unwrap();
    let b = b.get(&TaskId::from("B")).unwrap().clone();

    assert_eq!(b.start, Some(date("2025-01-02")));
    assert!(!b.start_calculated);
}

#[test]
fn test_schedule_is_idempotent() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A")
                .with_start(date("2025-03-01"))
                .with_end(date("2025-03-04")),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("1FF+1d"),
            TaskRecord::new("C", "p", 3, "C")
                .with_duration(3)
                .with_predecessors("1FS;2SF-2d"),
        ],
    );
    let options = ScheduleOptions {
        derive_from_duration: true,
    };

    let first = analyze_project(&snapshot, &options).schedule.unwrap();
    let second = analyze_project(&snapshot, &options).schedule.unwrap();

    assert_eq!(first.tasks(), second.tasks());
}

#[test]
fn test_unresolved_reference_is_reported() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A"),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("1FS;42FS;1FSx"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());

    assert_eq!(analysis.links.len(), 1);
    assert!(analysis.diagnostics.iter().any(|d| matches!(
        d,
        Diagnostic::UnresolvedReference { reference, .. } if reference == "42"
    )));
    assert!(
        analysis
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::Parse { .. }))
    );
}

#[test]
fn test_aggregate_timeline_across_projects() {
    let records = vec![
        TaskRecord::new("a1", "north", 1, "Unlisted one")
            .with_start(date("2025-01-01"))
            .with_end(date("2025-01-02")),
        TaskRecord::new("b1", "south", 1, "Build")
            .with_start(date("2025-01-01"))
            .with_end(date("2025-01-05")),
        TaskRecord::new("a2", "north", 2, "Design")
            .with_start(date("2025-01-03"))
            .with_end(date("2025-01-04")),
        TaskRecord::new("b2", "south", 2, "Unlisted two")
            .with_start(date("2025-01-06"))
            .with_end(date("2025-01-07")),
    ];
    let table: CanonicalOrder = [("Design", 1), ("Build", 2)].into_iter().collect();

    let analyses = analyze_records(records, &ScheduleOptions::default());
    let rows = aggregate_timeline(&analyses, &table);

    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Design", "Build", "Unlisted one", "Unlisted two"]);
    assert_eq!(rows[0].order, 1);
    assert_eq!(rows[3].order, taskline_engine::UNLISTED_ORDER);
}

#[test]
fn test_analysis_serializes() {
    let snapshot = ProjectSnapshot::new(
        "p",
        vec![
            TaskRecord::new("A", "p", 1, "A")
                .with_start(date("2025-01-01"))
                .with_end(date("2025-01-02")),
            TaskRecord::new("B", "p", 2, "B").with_predecessors("1SS"),
        ],
    );

    let analysis = analyze_project(&snapshot, &ScheduleOptions::default());
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["cycle"]["status"], "acyclic");
    assert_eq!(json["links"][0]["type"], "1");
    assert_eq!(json["schedule"]["tasks"][1]["start"], "2025-01-01");
}

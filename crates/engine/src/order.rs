//! Rendering orders for the two timeline views.
//!
//! The aggregate, cross-project view ranks tasks by name through an
//! externally maintained [`CanonicalOrder`] table. The per-project view uses
//! the manual `display_rank` carried on each record. The two never mix.

use crate::{TaskId, TaskRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Order reported for names missing from the canonical table.
pub const UNLISTED_ORDER: i64 = 9999;

/// One row of the canonical name order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Task name as maintained in the table.
    pub name: String,
    /// Rank of the name; lower sorts first.
    pub order: i64,
}

/// Name -> rank table for the aggregate timeline.
///
/// Lookups ignore case, surrounding whitespace and runs of inner whitespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalOrder {
    ranks: HashMap<String, i64>,
}

impl CanonicalOrder {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a name's rank.
    pub fn insert(&mut self, name: &str, order: i64) {
        self.ranks.insert(normalize_name(name), order);
    }

    /// Rank configured for a name, if any.
    #[must_use]
    pub fn order_of(&self, name: &str) -> Option<i64> {
        self.ranks.get(&normalize_name(name)).copied()
    }

    /// Rank for a name, or [`UNLISTED_ORDER`] when it is not in the table.
    #[must_use]
    pub fn rank(&self, name: &str) -> i64 {
        self.order_of(name).unwrap_or(UNLISTED_ORDER)
    }

    /// Number of names in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Stable sort by canonical rank; unlisted names go after every listed one.
    pub fn sort_by_name<T>(&self, items: &mut [T], name: impl Fn(&T) -> &str) {
        items.sort_by_cached_key(|item| {
            let order = self.order_of(name(item));
            (order.is_none(), order.unwrap_or(UNLISTED_ORDER))
        });
    }
}

impl FromIterator<OrderEntry> for CanonicalOrder {
    fn from_iter<I: IntoIterator<Item = OrderEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(&entry.name, entry.order);
        }
        table
    }
}

impl<'a> FromIterator<(&'a str, i64)> for CanonicalOrder {
    fn from_iter<I: IntoIterator<Item = (&'a str, i64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, order) in iter {
            table.insert(name, order);
        }
        table
    }
}

/// Normalize a task name for table lookups.
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Order tasks for the aggregate view.
#[must_use]
pub fn aggregate_order<'a>(tasks: &'a [TaskRecord], table: &CanonicalOrder) -> Vec<&'a TaskRecord> {
    let mut ordered: Vec<&TaskRecord> = tasks.iter().collect();
    table.sort_by_name(&mut ordered, |task| task.name.as_str());
    ordered
}

/// Stable sort by manual display rank; unranked items go last.
pub fn sort_by_display_rank<T>(items: &mut [T], rank: impl Fn(&T) -> Option<i64>) {
    items.sort_by_key(|item| {
        let rank = rank(item);
        (rank.is_none(), rank.unwrap_or_default())
    });
}

/// Order a project's tasks for its own table view.
#[must_use]
pub fn project_order<'a>(tasks: impl IntoIterator<Item = &'a TaskRecord>) -> Vec<TaskId> {
    let mut ordered: Vec<&TaskRecord> = tasks.into_iter().collect();
    sort_by_display_rank(&mut ordered, |task| task.display_rank);
    ordered.into_iter().map(|task| task.id.clone()).collect()
}

/// A new display rank for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankAssignment {
    /// The task.
    pub task_id: TaskId,
    /// Its new rank, starting at 1.
    pub display_rank: i64,
}

/// Number tasks 1..=n in the order given, e.g. after a drag-and-drop reorder.
#[must_use]
pub fn reassign_display_ranks(ids: &[TaskId]) -> Vec<RankAssignment> {
    (1_i64..)
        .zip(ids)
        .map(|(display_rank, id)| RankAssignment {
            task_id: id.clone(),
            display_rank,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tasks: &[&TaskRecord]) -> Vec<String> {
        tasks.iter().map(|t| t.name.clone()).collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Site   SURVEY "), "site survey");
    }

    #[test]
    fn test_canonical_lookup_is_normalized() {
        let table: CanonicalOrder = [("Site Survey", 2)].into_iter().collect();
        assert_eq!(table.order_of("site survey"), Some(2));
        assert_eq!(table.rank(" SITE  survey"), 2);
        assert_eq!(table.rank("Unknown"), UNLISTED_ORDER);
    }

    #[test]
    fn test_aggregate_order_listed_then_unlisted() {
        let table: CanonicalOrder = [("Design", 1), ("Build", 2), ("Late", 20_000)]
            .into_iter()
            .collect();
        let tasks = vec![
            TaskRecord::new("1", "p1", 1, "Zeta"),
            TaskRecord::new("2", "p1", 2, "Build"),
            TaskRecord::new("3", "p2", 1, "Alpha"),
            TaskRecord::new("4", "p2", 2, "design"),
            TaskRecord::new("5", "p2", 3, "Late"),
        ];
        let ordered = aggregate_order(&tasks, &table);
        assert_eq!(names(&ordered), vec!["design", "Build", "Late", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_aggregate_order_is_stable_for_ties() {
        let table: CanonicalOrder = [("Build", 1)].into_iter().collect();
        let tasks = vec![
            TaskRecord::new("a", "p1", 1, "Build"),
            TaskRecord::new("b", "p2", 1, "Build"),
        ];
        let ids: Vec<&str> = aggregate_order(&tasks, &table)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_project_order_by_display_rank() {
        let tasks = vec![
            TaskRecord::new("a", "p", 1, "A"),
            TaskRecord::new("b", "p", 2, "B").with_display_rank(2),
            TaskRecord::new("c", "p", 3, "C").with_display_rank(1),
            TaskRecord::new("d", "p", 4, "D"),
        ];
        let order = project_order(&tasks);
        let ids: Vec<&str> = order.iter().map(TaskId::as_str).collect();
        assert_eq!(ids, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_reassign_display_ranks() {
        let ids = vec![TaskId::from("x"), TaskId::from("y")];
        let ranks = reassign_display_ranks(&ids);
        assert_eq!(ranks[0].display_rank, 1);
        assert_eq!(ranks[1].task_id, TaskId::from("y"));
        assert_eq!(ranks[1].display_rank, 2);
    }

    #[test]
    fn test_table_from_entries() {
        let entries: Vec<OrderEntry> =
            serde_json::from_str(r#"[{"name": "Build", "order": 3}]"#).unwrap();
        let table: CanonicalOrder = entries.into_iter().collect();
        assert_eq!(table.len(), 1);
        assert_eq!(table.order_of("build"), Some(3));
    }
}

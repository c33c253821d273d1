//! Task records as delivered by the task store.
//!
//! Records are parsed once at the boundary into these types and never
//! re-read as loose maps afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Date format used by task records on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Opaque, stable task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque project identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One task as stored by the surrounding application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Internal identifier.
    pub id: TaskId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Human-facing number used as the reference inside dependency tokens.
    pub sequence: u32,
    /// Display name, also the key into the canonical name order.
    #[serde(default)]
    pub name: String,
    /// Explicit start date, if the task carries one.
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    /// Explicit end date, if the task carries one.
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<NaiveDate>,
    /// Planned duration in days.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Raw dependency string, e.g. `2FS+2d;3SS-1d`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub predecessors: String,
    /// Manually assigned rank for the per-project table view.
    #[serde(default)]
    pub display_rank: Option<i64>,
}

impl TaskRecord {
    /// Create a record with no dates, no dependencies and no rank.
    pub fn new(
        id: impl Into<TaskId>,
        project_id: impl Into<ProjectId>,
        sequence: u32,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            sequence,
            name: name.into(),
            start_date: None,
            end_date: None,
            duration: None,
            predecessors: String::new(),
            display_rank: None,
        }
    }

    /// Set the explicit start date.
    #[must_use]
    pub fn with_start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the explicit end date.
    #[must_use]
    pub fn with_end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Set the planned duration in days.
    #[must_use]
    pub fn with_duration(mut self, days: u32) -> Self {
        self.duration = Some(days);
        self
    }

    /// Set the raw dependency string.
    #[must_use]
    pub fn with_predecessors(mut self, raw: impl Into<String>) -> Self {
        self.predecessors = raw.into();
        self
    }

    /// Set the manual display rank.
    #[must_use]
    pub fn with_display_rank(mut self, rank: i64) -> Self {
        self.display_rank = Some(rank);
        self
    }
}

/// Snapshot of one project's tasks, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// The project every task in the snapshot should belong to.
    pub project_id: ProjectId,
    /// Tasks in the order the store returned them.
    pub tasks: Vec<TaskRecord>,
}

impl ProjectSnapshot {
    /// Create a snapshot from an already filtered task list.
    pub fn new(project_id: impl Into<ProjectId>, tasks: Vec<TaskRecord>) -> Self {
        Self {
            project_id: project_id.into(),
            tasks,
        }
    }

    /// Split a flat, multi-project record list into per-project snapshots.
    ///
    /// Projects appear in first-seen order; tasks keep their relative order.
    pub fn partition(records: impl IntoIterator<Item = TaskRecord>) -> Vec<Self> {
        let mut snapshots: Vec<Self> = Vec::new();
        for record in records {
            match snapshots
                .iter_mut()
                .find(|s| s.project_id == record.project_id)
            {
                Some(snapshot) => snapshot.tasks.push(record),
                None => snapshots.push(Self {
                    project_id: record.project_id.clone(),
                    tasks: vec![record],
                }),
            }
        }
        snapshots
    }

    /// Number of tasks in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the snapshot holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Empty or unparsable dates are treated as absent.
fn lenient_date<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(date) => Ok(Some(date)),
        Err(e) => {
            warn!(value = %trimmed, error = %e, "Ignoring unparsable task date");
            Ok(None)
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

//! Time-tracked task records.
//!
//! # Invariants
//! - `started_at` and `ended_at` are each assigned at most once.
//! - `ended_at` is only set after `started_at`.
//! - `duration_secs` is `ended_at - started_at` in whole seconds, fixed when
//!   the task stops.

use crate::model::person::PersonId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Store-assigned task identifier.
pub type TaskId = i64;

/// Lifecycle position derived from the recorded timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Neither start nor end recorded.
    Created,
    /// Start recorded, end pending.
    Started,
    /// Start and end recorded; duration is final.
    Stopped,
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: TaskId,
    pub person_id: PersonId,
    pub name: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_secs: Option<i64>,
}

impl Task {
    pub fn state(&self) -> TaskState {
        match (self.started_at, self.ended_at) {
            (None, _) => TaskState::Created,
            (Some(_), None) => TaskState::Started,
            (Some(_), Some(_)) => TaskState::Stopped,
        }
    }
}

/// Stopped task as returned by the period store query, before formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodTaskRow {
    pub id: TaskId,
    pub name: String,
    pub duration_secs: i64,
}

/// One line of a period report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    #[serde(rename = "task_name")]
    pub name: String,
    /// Human-readable duration, see [`crate::format::format_duration`].
    pub all_time: String,
    pub duration_secs: u64,
}

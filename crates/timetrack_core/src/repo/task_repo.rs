//! Task store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist tasks and their start/end timestamps.
//! - Answer the period aggregation query server-side.
//!
//! # Invariants
//! - `set_start` / `set_end` are conditional single-statement updates; a
//!   `false` result means the precondition no longer held at write time.
//! - The period query never returns a task without a recorded end.

use crate::model::period::PeriodQuery;
use crate::model::person::PersonId;
use crate::model::task::{PeriodTaskRow, Task, TaskId};
use crate::repo::{ensure_schema, from_epoch_ms, is_constraint, to_epoch_ms, RepoError, RepoResult};
use chrono::{DateTime, Utc};
use rusqlite::{ffi, params, Connection, OptionalExtension};

/// Storage contract consumed by the task lifecycle engine.
pub trait TaskRepository {
    /// Inserts a task with unset start/end and returns its new id.
    fn insert_task(&self, person_id: PersonId, name: &str) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Records the start time only if none is recorded yet.
    fn set_start(&self, id: TaskId, at: DateTime<Utc>) -> RepoResult<bool>;
    /// Records the end time and duration only if the task is started and not
    /// yet stopped.
    fn set_end(&self, id: TaskId, at: DateTime<Utc>, duration_secs: i64) -> RepoResult<bool>;
    /// Stopped tasks of one person inside the period, longest first, ties by id.
    fn query_by_person_and_period(&self, period: &PeriodQuery) -> RepoResult<Vec<PeriodTaskRow>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection that already has the current schema applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema(conn, "tasks")?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn insert_task(&self, person_id: PersonId, name: &str) -> RepoResult<TaskId> {
        self.conn
            .execute(
                "INSERT INTO tasks (person_id, name) VALUES (?1, ?2);",
                params![person_id, name],
            )
            .map_err(|err| {
                if is_constraint(&err, ffi::SQLITE_CONSTRAINT_FOREIGNKEY) {
                    RepoError::PersonNotFound(person_id)
                } else {
                    err.into()
                }
            })?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, person_id, name, started_at, ended_at, duration_secs
                 FROM tasks
                 WHERE id = ?1;",
                [id],
                |row| {
                    Ok(RawTask {
                        id: row.get(0)?,
                        person_id: row.get(1)?,
                        name: row.get(2)?,
                        started_at: row.get(3)?,
                        ended_at: row.get(4)?,
                        duration_secs: row.get(5)?,
                    })
                },
            )
            .optional()?;

        raw.map(RawTask::into_task).transpose()
    }

    fn set_start(&self, id: TaskId, at: DateTime<Utc>) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET started_at = ?2
             WHERE id = ?1 AND started_at IS NULL;",
            params![id, to_epoch_ms(at)],
        )?;
        Ok(changed == 1)
    }

    fn set_end(&self, id: TaskId, at: DateTime<Utc>, duration_secs: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET ended_at = ?2, duration_secs = ?3
             WHERE id = ?1 AND started_at IS NOT NULL AND ended_at IS NULL;",
            params![id, to_epoch_ms(at), duration_secs],
        )?;
        Ok(changed == 1)
    }

    fn query_by_person_and_period(&self, period: &PeriodQuery) -> RepoResult<Vec<PeriodTaskRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, duration_secs
             FROM tasks
             WHERE person_id = ?1
               AND started_at >= ?2
               AND ended_at IS NOT NULL
               AND ended_at <= ?3
               AND duration_secs IS NOT NULL
             ORDER BY duration_secs DESC, id ASC;",
        )?;

        let rows = stmt.query_map(
            params![
                period.person_id(),
                to_epoch_ms(period.start()),
                to_epoch_ms(period.end()),
            ],
            |row| {
                Ok(PeriodTaskRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    duration_secs: row.get(2)?,
                })
            },
        )?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }
}

struct RawTask {
    id: TaskId,
    person_id: PersonId,
    name: String,
    started_at: Option<i64>,
    ended_at: Option<i64>,
    duration_secs: Option<i64>,
}

impl RawTask {
    fn into_task(self) -> RepoResult<Task> {
        let started_at = self
            .started_at
            .map(|value| from_epoch_ms(value, "tasks.started_at"))
            .transpose()?;
        let ended_at = self
            .ended_at
            .map(|value| from_epoch_ms(value, "tasks.ended_at"))
            .transpose()?;

        if ended_at.is_some() && (started_at.is_none() || self.duration_secs.is_none()) {
            return Err(RepoError::InvalidData(format!(
                "task {} has an end time without start time or duration",
                self.id
            )));
        }

        Ok(Task {
            id: self.id,
            person_id: self.person_id,
            name: self.name,
            started_at,
            ended_at,
            duration_secs: self.duration_secs,
        })
    }
}

//! Time tracker schema versions.
//!
//! | version | file | adds |
//! |---|---|---|
//! | 1 | `0001_init.sql` | `persons` with unique passport pair; `tasks` with single-assignment start/end checks and cascade delete |
//! | 2 | `0002_task_period_index.sql` | partial index serving period reports over stopped tasks |
//!
//! # Invariants
//! - The database version lives in `PRAGMA user_version` and only moves forward.
//! - All pending steps commit in one transaction, so a failed step leaves the
//!   previous version intact.
//! - A database written by a newer build is refused rather than downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "persons_and_tasks",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "task_period_index",
        sql: include_str!("0002_task_period_index.sql"),
    },
];

/// Schema version this build writes and expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is ahead of this build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let target = latest_version();
    if from_version > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: target,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        info!(
            "event=db_migrate module=db status=applied version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={from_version} to={target}");
    Ok(())
}

/// Schema version recorded on the connection; `0` for a fresh database.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

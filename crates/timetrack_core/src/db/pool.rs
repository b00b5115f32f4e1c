//! Pooled SQLite connections for concurrent request handling.
//!
//! Each checkout gets a connection with WAL journaling, foreign keys and a
//! busy timeout applied; migrations run once when the pool is opened.

use super::migrations::apply_migrations;
use super::open::BUSY_TIMEOUT;
use super::DbResult;
use log::{error, info};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

pub type DbPool = Pool<SqliteConnectionManager>;

/// Sizing and timeout knobs for [`open_pool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of open connections.
    pub max_size: u32,
    /// How long a checkout waits for a free connection.
    pub connection_timeout: Duration,
    /// SQLite busy timeout applied to every connection.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: BUSY_TIMEOUT,
        }
    }
}

#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(())
    }
}

/// Opens a file-backed connection pool and migrates the schema.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `db_pool_open` logging events with duration and status.
pub fn open_pool(path: impl AsRef<Path>, config: &PoolConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    let path = path.as_ref();
    info!(
        "event=db_pool_open module=db status=start path={} max_size={}",
        path.display(),
        config.max_size
    );

    let result = build_pool(path, config);
    match &result {
        Ok(_) => info!(
            "event=db_pool_open module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_pool_open module=db status=error duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn build_pool(path: &Path, config: &PoolConfig) -> DbResult<DbPool> {
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(config.max_size)
        .connection_timeout(config.connection_timeout)
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout: config.busy_timeout,
        }))
        .build(manager)?;

    let mut conn = pool.get()?;
    apply_migrations(&mut conn)?;
    Ok(pool)
}

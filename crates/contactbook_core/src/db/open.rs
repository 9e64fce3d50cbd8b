//! Connection opening and per-connection configuration.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum OpenTarget {
    File(PathBuf),
    Memory,
}

impl Display for OpenTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(_) => f.write_str("file"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Opens (creating if needed) a database file and migrates it.
///
/// File databases run in WAL journal mode.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(OpenTarget::File(path.as_ref().to_path_buf()))
}

/// Opens a private in-memory database and migrates it.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(OpenTarget::Memory)
}

fn open_target(target: OpenTarget) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={target}");

    let result = connect(&target).and_then(|mut conn| {
        configure(&conn, &target)?;
        apply_migrations(&mut conn)?;
        Ok(conn)
    });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            target,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            target,
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn connect(target: &OpenTarget) -> DbResult<Connection> {
    let conn = match target {
        OpenTarget::File(path) => Connection::open(path)?,
        OpenTarget::Memory => Connection::open_in_memory()?,
    };
    Ok(conn)
}

fn configure(conn: &Connection, target: &OpenTarget) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if let OpenTarget::File(_) = target {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        info!("event=db_configure module=db status=ok journal_mode={mode}");
    }
    Ok(())
}

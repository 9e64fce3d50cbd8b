//! Row decoding and connection checks shared by the SQLite repositories.

use crate::db::migrations::{current_user_version, latest_version};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::{Connection, Row};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Verifies the connection is fully migrated and carries `tables`.
pub(crate) fn ensure_connection_ready(
    conn: &Connection,
    tables: &[(&'static str, &[&'static str])],
) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in tables {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn parse_uuid(value: &str, location: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {location}")))
}

pub(crate) fn uuid_column(row: &Row<'_>, column: &str, location: &str) -> RepoResult<Uuid> {
    let text: String = row.get(column)?;
    parse_uuid(&text, location)
}

/// Decodes a TEXT enum column through the model's `parse` function.
pub(crate) fn enum_column<T>(
    row: &Row<'_>,
    column: &str,
    location: &str,
    parse: fn(&str) -> Option<T>,
) -> RepoResult<T> {
    let text: String = row.get(column)?;
    parse(&text)
        .ok_or_else(|| RepoError::InvalidData(format!("invalid value `{text}` in {location}")))
}

pub(crate) fn optional_enum_column<T>(
    row: &Row<'_>,
    column: &str,
    location: &str,
    parse: fn(&str) -> Option<T>,
) -> RepoResult<Option<T>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => parse(&text).map(Some).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid value `{text}` in {location}"))
        }),
        None => Ok(None),
    }
}

pub(crate) fn bool_column(row: &Row<'_>, column: &str, location: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {location}"
        ))),
    }
}

pub(crate) fn json_column(
    row: &Row<'_>,
    column: &str,
    location: &str,
) -> RepoResult<Option<JsonValue>> {
    match row.get::<_, Option<String>>(column)? {
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|err| {
            RepoError::InvalidData(format!("invalid json in {location}: {err}"))
        }),
        None => Ok(None),
    }
}

pub(crate) fn json_to_db(value: Option<&JsonValue>) -> Option<String> {
    value.map(JsonValue::to_string)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

/// Escapes `%`, `_` and `\` for use inside a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::like_contains_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_contains_pattern("acme"), "%acme%");
        assert_eq!(like_contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}

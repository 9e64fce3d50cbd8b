//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define per-table data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must call the model's `validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, constraint
//!   violations) in addition to DB transport errors.
//! - Repositories only accept connections migrated to the latest version.

pub mod activity_repo;
pub mod contact_repo;
pub mod email_repo;
pub mod error;
pub mod reminder_repo;
pub mod tag_repo;
pub mod user_repo;

mod sqlite_support;

use rusqlite::types::Value;

/// Page size used when a list query does not set one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;
/// Upper bound applied to every list query.
pub const MAX_LIST_LIMIT: u32 = 200;

/// Normalizes a requested page size: `None`/`0` -> default, clamped to max.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIST_LIMIT,
        Some(value) if value > MAX_LIST_LIMIT => MAX_LIST_LIMIT,
        Some(value) => value,
    }
}

fn push_pagination(sql: &mut String, bind_values: &mut Vec<Value>, limit: Option<u32>, offset: u32) {
    sql.push_str(" LIMIT ?");
    bind_values.push(Value::Integer(i64::from(normalize_list_limit(limit))));
    if offset > 0 {
        sql.push_str(" OFFSET ?");
        bind_values.push(Value::Integer(i64::from(offset)));
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_list_limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

    #[test]
    fn list_limit_defaults_and_clamps() {
        assert_eq!(normalize_list_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(normalize_list_limit(Some(0)), DEFAULT_LIST_LIMIT);
        assert_eq!(normalize_list_limit(Some(7)), 7);
        assert_eq!(normalize_list_limit(Some(10_000)), MAX_LIST_LIMIT);
    }
}

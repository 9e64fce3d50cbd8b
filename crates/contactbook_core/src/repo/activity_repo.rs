//! Activity timeline repository.
//!
//! Activities are append-only: there is no update path, only create and
//! delete.

use crate::model::activity::{Activity, ActivityId, ActivityType};
use crate::model::contact::ContactId;
use crate::model::user::UserId;
use crate::model::EpochMillis;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::push_pagination;
use crate::repo::sqlite_support::{
    enum_column, ensure_connection_ready, json_column, json_to_db, uuid_column,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const ACTIVITY_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    contact_id,
    type,
    description,
    occurred_at,
    metadata
FROM activities";

const ACTIVITY_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "contact_id",
    "type",
    "description",
    "occurred_at",
    "metadata",
];

/// Query options for listing activities, newest first.
#[derive(Debug, Clone, Default)]
pub struct ActivityListQuery {
    pub user_id: Option<UserId>,
    pub contact_id: Option<ContactId>,
    pub kind: Option<ActivityType>,
    /// Inclusive lower bound on `occurred_at`.
    pub occurred_from: Option<EpochMillis>,
    /// Exclusive upper bound on `occurred_at`.
    pub occurred_until: Option<EpochMillis>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for activity records.
pub trait ActivityRepository {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId>;
    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>>;
    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>>;
    fn delete_activity(&self, id: ActivityId) -> RepoResult<()>;
}

/// SQLite-backed activity repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("activities", ACTIVITY_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn create_activity(&self, activity: &Activity) -> RepoResult<ActivityId> {
        activity.validate()?;

        self.conn.execute(
            "INSERT INTO activities (
                id,
                user_id,
                contact_id,
                type,
                description,
                occurred_at,
                metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                activity.id.to_string(),
                activity.user_id.to_string(),
                activity.contact_id.to_string(),
                activity.kind.as_str(),
                activity.description.as_deref(),
                activity.occurred_at,
                json_to_db(activity.metadata.as_ref()),
            ],
        )?;

        Ok(activity.id)
    }

    fn get_activity(&self, id: ActivityId) -> RepoResult<Option<Activity>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_activity_row(row)?));
        }
        Ok(None)
    }

    fn list_activities(&self, query: &ActivityListQuery) -> RepoResult<Vec<Activity>> {
        let mut sql = format!("{ACTIVITY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.to_string()));
        }
        if let Some(contact_id) = query.contact_id {
            sql.push_str(" AND contact_id = ?");
            bind_values.push(Value::Text(contact_id.to_string()));
        }
        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }
        if let Some(from) = query.occurred_from {
            sql.push_str(" AND occurred_at >= ?");
            bind_values.push(Value::Integer(from));
        }
        if let Some(until) = query.occurred_until {
            sql.push_str(" AND occurred_at < ?");
            bind_values.push(Value::Integer(until));
        }

        sql.push_str(" ORDER BY occurred_at DESC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(parse_activity_row(row)?);
        }
        Ok(activities)
    }

    fn delete_activity(&self, id: ActivityId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM activities WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("activity", id));
        }
        Ok(())
    }
}

fn parse_activity_row(row: &Row<'_>) -> RepoResult<Activity> {
    let activity = Activity {
        id: uuid_column(row, "id", "activities.id")?,
        user_id: uuid_column(row, "user_id", "activities.user_id")?,
        contact_id: uuid_column(row, "contact_id", "activities.contact_id")?,
        kind: enum_column(row, "type", "activities.type", ActivityType::parse)?,
        description: row.get("description")?,
        occurred_at: row.get("occurred_at")?,
        metadata: json_column(row, "metadata", "activities.metadata")?,
    };
    activity.validate()?;
    Ok(activity)
}

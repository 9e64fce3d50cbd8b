//! Reminder repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `completed_at` is non-null exactly when `completed = 1` (CHECK
//!   constraint mirrored by `Reminder::validate`).
//! - Listing order is deterministic: `due_date ASC, id ASC`.

use crate::model::contact::ContactId;
use crate::model::reminder::{Reminder, ReminderId};
use crate::model::user::UserId;
use crate::model::EpochMillis;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::push_pagination;
use crate::repo::sqlite_support::{bool_column, bool_to_int, ensure_connection_ready, uuid_column};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    contact_id,
    title,
    due_date,
    completed,
    completed_at,
    created_at
FROM reminders";

const REMINDER_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "contact_id",
    "title",
    "due_date",
    "completed",
    "completed_at",
    "created_at",
];

/// Query options for listing reminders.
#[derive(Debug, Clone, Default)]
pub struct ReminderListQuery {
    pub user_id: Option<UserId>,
    pub contact_id: Option<ContactId>,
    pub completed: Option<bool>,
    /// Exclusive upper bound on `due_date`.
    pub due_before: Option<EpochMillis>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for reminders.
pub trait ReminderRepository {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<ReminderId>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>>;
    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<Reminder>>;
    /// Overwrites title, due date and completion state.
    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()>;
    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()>;
}

/// SQLite-backed reminder repository.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("reminders", REMINDER_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(&self, reminder: &Reminder) -> RepoResult<ReminderId> {
        reminder.validate()?;

        self.conn.execute(
            "INSERT INTO reminders (
                id,
                user_id,
                contact_id,
                title,
                due_date,
                completed,
                completed_at,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                reminder.id.to_string(),
                reminder.user_id.to_string(),
                reminder.contact_id.to_string(),
                reminder.title.trim(),
                reminder.due_date,
                bool_to_int(reminder.completed),
                reminder.completed_at,
                reminder.created_at,
            ],
        )?;

        Ok(reminder.id)
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }
        Ok(None)
    }

    fn list_reminders(&self, query: &ReminderListQuery) -> RepoResult<Vec<Reminder>> {
        let mut sql = format!("{REMINDER_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" AND user_id = ?");
            bind_values.push(Value::Text(user_id.to_string()));
        }
        if let Some(contact_id) = query.contact_id {
            sql.push_str(" AND contact_id = ?");
            bind_values.push(Value::Text(contact_id.to_string()));
        }
        if let Some(completed) = query.completed {
            sql.push_str(" AND completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        if let Some(due_before) = query.due_before {
            sql.push_str(" AND due_date < ?");
            bind_values.push(Value::Integer(due_before));
        }

        sql.push_str(" ORDER BY due_date ASC, id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }
        Ok(reminders)
    }

    fn update_reminder(&self, reminder: &Reminder) -> RepoResult<()> {
        reminder.validate()?;

        let changed = self.conn.execute(
            "UPDATE reminders
             SET
                title = ?1,
                due_date = ?2,
                completed = ?3,
                completed_at = ?4
             WHERE id = ?5;",
            params![
                reminder.title.trim(),
                reminder.due_date,
                bool_to_int(reminder.completed),
                reminder.completed_at,
                reminder.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("reminder", reminder.id));
        }
        Ok(())
    }

    fn delete_reminder(&self, id: ReminderId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("reminder", id));
        }
        Ok(())
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let reminder = Reminder {
        id: uuid_column(row, "id", "reminders.id")?,
        user_id: uuid_column(row, "user_id", "reminders.user_id")?,
        contact_id: uuid_column(row, "contact_id", "reminders.contact_id")?,
        title: row.get("title")?,
        due_date: row.get("due_date")?,
        completed: bool_column(row, "completed", "reminders.completed")?,
        completed_at: row.get("completed_at")?,
        created_at: row.get("created_at")?,
    };
    reminder.validate()?;
    Ok(reminder)
}

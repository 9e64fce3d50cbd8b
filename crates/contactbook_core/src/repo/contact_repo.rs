//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and filtered listing over `contacts`.
//! - Keep `last_contacted_at` monotonic.
//!
//! # Invariants
//! - `user_id` is immutable after insert; updates never move a contact to
//!   another owner.
//! - Listing order is deterministic: `name COLLATE NOCASE ASC, id ASC`.

use crate::model::contact::{Contact, ContactId, Gender, Priority};
use crate::model::user::UserId;
use crate::model::EpochMillis;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::push_pagination;
use crate::repo::sqlite_support::{
    enum_column, ensure_connection_ready, json_column, json_to_db, like_contains_pattern,
    optional_enum_column, uuid_column,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const CONTACT_SELECT_SQL: &str = "SELECT
    contacts.id AS id,
    contacts.user_id AS user_id,
    contacts.name AS name,
    contacts.email AS email,
    contacts.phone AS phone,
    contacts.linked_in_url AS linked_in_url,
    contacts.company AS company,
    contacts.industry AS industry,
    contacts.role AS role,
    contacts.priority AS priority,
    contacts.gender AS gender,
    contacts.birthday AS birthday,
    contacts.profile_picture AS profile_picture,
    contacts.notes AS notes,
    contacts.metadata AS metadata,
    contacts.last_contacted_at AS last_contacted_at,
    contacts.created_at AS created_at,
    contacts.updated_at AS updated_at
FROM contacts";

const CONTACT_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "name",
    "email",
    "phone",
    "linked_in_url",
    "company",
    "industry",
    "role",
    "priority",
    "gender",
    "birthday",
    "profile_picture",
    "notes",
    "metadata",
    "last_contacted_at",
    "created_at",
    "updated_at",
];

/// Query options for listing contacts.
#[derive(Debug, Clone, Default)]
pub struct ContactListQuery {
    /// Restrict to one owner.
    pub user_id: Option<UserId>,
    pub priority: Option<Priority>,
    /// Exact tag name match (case-insensitive).
    pub tag: Option<String>,
    /// Case-insensitive substring match over name, email and company.
    pub search: Option<String>,
    /// Maximum rows to return. Defaults and clamps per `normalize_list_limit`.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Number of contacts at one priority level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: u64,
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>>;
    /// Overwrites every mutable column and bumps `updated_at`.
    fn update_contact(&self, contact: &Contact) -> RepoResult<()>;
    /// Moves `last_contacted_at` forward to `at`; earlier stamps are ignored.
    fn mark_contacted(&self, id: ContactId, at: EpochMillis) -> RepoResult<()>;
    fn delete_contact(&self, id: ContactId) -> RepoResult<()>;
    /// Returns one entry per priority level, zero-filled, in HIGH/MEDIUM/LOW order.
    fn count_by_priority(&self, user_id: UserId) -> RepoResult<Vec<PriorityCount>>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("contacts", CONTACT_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, contact: &Contact) -> RepoResult<ContactId> {
        contact.validate()?;

        self.conn.execute(
            "INSERT INTO contacts (
                id,
                user_id,
                name,
                email,
                phone,
                linked_in_url,
                company,
                industry,
                role,
                priority,
                gender,
                birthday,
                profile_picture,
                notes,
                metadata,
                last_contacted_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18);",
            params![
                contact.id.to_string(),
                contact.user_id.to_string(),
                contact.name.trim(),
                contact.email.as_deref().map(str::trim),
                contact.phone.as_deref(),
                contact.linked_in_url.as_deref(),
                contact.company.as_deref(),
                contact.industry.as_deref(),
                contact.role.as_deref(),
                contact.priority.as_str(),
                contact.gender.map(Gender::as_str),
                contact.birthday,
                contact.profile_picture.as_deref(),
                contact.notes.as_deref(),
                json_to_db(contact.metadata.as_ref()),
                contact.last_contacted_at,
                contact.created_at,
                contact.updated_at,
            ],
        )?;

        Ok(contact.id)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE contacts.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn list_contacts(&self, query: &ContactListQuery) -> RepoResult<Vec<Contact>> {
        let mut sql = format!("{CONTACT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(user_id) = query.user_id {
            sql.push_str(" AND contacts.user_id = ?");
            bind_values.push(Value::Text(user_id.to_string()));
        }

        if let Some(priority) = query.priority {
            sql.push_str(" AND contacts.priority = ?");
            bind_values.push(Value::Text(priority.as_str().to_string()));
        }

        if let Some(tag) = query.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM contact_tags ct
                    INNER JOIN tags t ON t.id = ct.tag_id
                    WHERE ct.contact_id = contacts.id
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(tag.to_string()));
        }

        if let Some(term) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            sql.push_str(
                " AND (
                    contacts.name LIKE ? ESCAPE '\\'
                    OR contacts.email LIKE ? ESCAPE '\\'
                    OR contacts.company LIKE ? ESCAPE '\\'
                )",
            );
            let pattern = like_contains_pattern(term);
            for _ in 0..3 {
                bind_values.push(Value::Text(pattern.clone()));
            }
        }

        sql.push_str(" ORDER BY contacts.name COLLATE NOCASE ASC, contacts.id ASC");
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn update_contact(&self, contact: &Contact) -> RepoResult<()> {
        contact.validate()?;

        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                linked_in_url = ?4,
                company = ?5,
                industry = ?6,
                role = ?7,
                priority = ?8,
                gender = ?9,
                birthday = ?10,
                profile_picture = ?11,
                notes = ?12,
                metadata = ?13,
                last_contacted_at = ?14,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?15
               AND user_id = ?16;",
            params![
                contact.name.trim(),
                contact.email.as_deref().map(str::trim),
                contact.phone.as_deref(),
                contact.linked_in_url.as_deref(),
                contact.company.as_deref(),
                contact.industry.as_deref(),
                contact.role.as_deref(),
                contact.priority.as_str(),
                contact.gender.map(Gender::as_str),
                contact.birthday,
                contact.profile_picture.as_deref(),
                contact.notes.as_deref(),
                json_to_db(contact.metadata.as_ref()),
                contact.last_contacted_at,
                contact.id.to_string(),
                contact.user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("contact", contact.id));
        }
        Ok(())
    }

    fn mark_contacted(&self, id: ContactId, at: EpochMillis) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                last_contacted_at = CASE
                    WHEN last_contacted_at IS NULL OR last_contacted_at < ?1 THEN ?1
                    ELSE last_contacted_at
                END,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![at, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("contact", id));
        }
        Ok(())
    }

    fn delete_contact(&self, id: ContactId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM contacts WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("contact", id));
        }
        Ok(())
    }

    fn count_by_priority(&self, user_id: UserId) -> RepoResult<Vec<PriorityCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT priority, COUNT(*) AS total
             FROM contacts
             WHERE user_id = ?1
             GROUP BY priority;",
        )?;
        let mut rows = stmt.query([user_id.to_string()])?;

        let mut counts: Vec<PriorityCount> = Priority::ALL
            .iter()
            .map(|&priority| PriorityCount { priority, count: 0 })
            .collect();
        while let Some(row) = rows.next()? {
            let priority = enum_column(row, "priority", "contacts.priority", Priority::parse)?;
            let total: i64 = row.get("total")?;
            if let Some(entry) = counts.iter_mut().find(|entry| entry.priority == priority) {
                entry.count = total.max(0) as u64;
            }
        }
        Ok(counts)
    }
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let contact = Contact {
        id: uuid_column(row, "id", "contacts.id")?,
        user_id: uuid_column(row, "user_id", "contacts.user_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        linked_in_url: row.get("linked_in_url")?,
        company: row.get("company")?,
        industry: row.get("industry")?,
        role: row.get("role")?,
        priority: enum_column(row, "priority", "contacts.priority", Priority::parse)?,
        gender: optional_enum_column(row, "gender", "contacts.gender", Gender::parse)?,
        birthday: row.get("birthday")?,
        profile_picture: row.get("profile_picture")?,
        notes: row.get("notes")?,
        metadata: json_column(row, "metadata", "contacts.metadata")?,
        last_contacted_at: row.get("last_contacted_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    contact.validate()?;
    Ok(contact)
}

//! Tag and contact/tag link repository.
//!
//! # Responsibility
//! - Provide CRUD over per-user `tags`.
//! - Own the `contact_tags` join table, including full-set replacement.
//!
//! # Invariants
//! - Tag names are unique per user (case-insensitive, enforced by SQLite).
//! - A contact may only be linked to tags of its own user.
//! - `set_contact_tags_by_name` replaces the whole set in one transaction.

use crate::model::contact::ContactId;
use crate::model::tag::{ContactTag, Tag, TagId, DEFAULT_TAG_COLOR};
use crate::model::user::UserId;
use crate::model::now_epoch_ms;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite_support::{ensure_connection_ready, parse_uuid, uuid_column};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::HashSet;
use uuid::Uuid;

const TAG_SELECT_SQL: &str = "SELECT
    tags.id AS id,
    tags.user_id AS user_id,
    tags.name AS name,
    tags.color AS color,
    tags.created_at AS created_at
FROM tags";

const TAG_COLUMNS: &[&str] = &["id", "user_id", "name", "color", "created_at"];
const CONTACT_TAG_COLUMNS: &[&str] = &["contact_id", "tag_id", "created_at"];

/// Repository interface for tags and contact/tag links.
pub trait TagRepository {
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId>;
    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Case-insensitive lookup within one user's tags.
    fn find_tag_by_name(&self, user_id: UserId, name: &str) -> RepoResult<Option<Tag>>;
    /// Lists one user's tags sorted by name.
    fn list_tags(&self, user_id: UserId) -> RepoResult<Vec<Tag>>;
    /// Renames/recolors a tag.
    fn update_tag(&self, tag: &Tag) -> RepoResult<()>;
    fn delete_tag(&self, id: TagId) -> RepoResult<()>;
    /// Links one tag to one contact of the same user.
    fn attach_tag(&self, contact_id: ContactId, tag_id: TagId) -> RepoResult<ContactTag>;
    /// Removes a link. Returns whether a link existed.
    fn detach_tag(&self, contact_id: ContactId, tag_id: TagId) -> RepoResult<bool>;
    /// Tags linked to a contact, sorted by name.
    fn list_contact_tags(&self, contact_id: ContactId) -> RepoResult<Vec<Tag>>;
    /// Contacts linked to a tag, in link order.
    fn list_tagged_contact_ids(&self, tag_id: TagId) -> RepoResult<Vec<ContactId>>;
    /// Replaces all tags of a contact, creating missing tags for its owner.
    fn set_contact_tags_by_name(&self, contact_id: ContactId, names: &[String])
        -> RepoResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &[("tags", TAG_COLUMNS), ("contact_tags", CONTACT_TAG_COLUMNS)],
        )?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn create_tag(&self, tag: &Tag) -> RepoResult<TagId> {
        tag.validate()?;

        self.conn.execute(
            "INSERT INTO tags (id, user_id, name, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                tag.id.to_string(),
                tag.user_id.to_string(),
                tag.name.trim(),
                tag.color.as_str(),
                tag.created_at,
            ],
        )?;

        Ok(tag.id)
    }

    fn get_tag(&self, id: TagId) -> RepoResult<Option<Tag>> {
        self.conn
            .query_row(
                &format!("{TAG_SELECT_SQL} WHERE tags.id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_tag_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn find_tag_by_name(&self, user_id: UserId, name: &str) -> RepoResult<Option<Tag>> {
        self.conn
            .query_row(
                &format!("{TAG_SELECT_SQL} WHERE tags.user_id = ?1 AND tags.name = ?2;"),
                params![user_id.to_string(), name.trim()],
                |row| Ok(parse_tag_row(row)),
            )
            .optional()?
            .transpose()
    }

    fn list_tags(&self, user_id: UserId) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TAG_SELECT_SQL}
             WHERE tags.user_id = ?1
             ORDER BY tags.name COLLATE NOCASE ASC, tags.id ASC;"
        ))?;
        let mut rows = stmt.query([user_id.to_string()])?;
        let mut tags = Vec::new();
        while let Some(row) = rows.next()? {
            tags.push(parse_tag_row(row)?);
        }
        Ok(tags)
    }

    fn update_tag(&self, tag: &Tag) -> RepoResult<()> {
        tag.validate()?;

        let changed = self.conn.execute(
            "UPDATE tags
             SET name = ?1, color = ?2
             WHERE id = ?3
               AND user_id = ?4;",
            params![
                tag.name.trim(),
                tag.color.as_str(),
                tag.id.to_string(),
                tag.user_id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("tag", tag.id));
        }
        Ok(())
    }

    fn delete_tag(&self, id: TagId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("tag", id));
        }
        Ok(())
    }

    fn attach_tag(&self, contact_id: ContactId, tag_id: TagId) -> RepoResult<ContactTag> {
        let contact_owner = owner_of(self.conn, "contacts", contact_id)?
            .ok_or_else(|| RepoError::not_found("contact", contact_id))?;
        let tag_owner = owner_of(self.conn, "tags", tag_id)?
            .ok_or_else(|| RepoError::not_found("tag", tag_id))?;
        if contact_owner != tag_owner {
            return Err(RepoError::OwnershipMismatch { contact_id, tag_id });
        }

        let link = ContactTag {
            contact_id,
            tag_id,
            created_at: now_epoch_ms(),
        };
        self.conn.execute(
            "INSERT INTO contact_tags (contact_id, tag_id, created_at)
             VALUES (?1, ?2, ?3);",
            params![
                link.contact_id.to_string(),
                link.tag_id.to_string(),
                link.created_at,
            ],
        )?;
        Ok(link)
    }

    fn detach_tag(&self, contact_id: ContactId, tag_id: TagId) -> RepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM contact_tags WHERE contact_id = ?1 AND tag_id = ?2;",
            params![contact_id.to_string(), tag_id.to_string()],
        )?;
        Ok(removed > 0)
    }

    fn list_contact_tags(&self, contact_id: ContactId) -> RepoResult<Vec<Tag>> {
        load_tags_for_contact(self.conn, contact_id)
    }

    fn list_tagged_contact_ids(&self, tag_id: TagId) -> RepoResult<Vec<ContactId>> {
        let mut stmt = self.conn.prepare(
            "SELECT contact_id
             FROM contact_tags
             WHERE tag_id = ?1
             ORDER BY created_at ASC, contact_id ASC;",
        )?;
        let mut rows = stmt.query([tag_id.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.push(parse_uuid(&text, "contact_tags.contact_id")?);
        }
        Ok(ids)
    }

    fn set_contact_tags_by_name(
        &self,
        contact_id: ContactId,
        names: &[String],
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        replace_contact_tags_by_name(&tx, contact_id, names)?;
        tx.commit()?;
        Ok(())
    }
}

/// Replaces the tag set of `contact_id` on `conn` without opening a
/// transaction; callers own atomicity.
///
/// Names are trimmed and deduplicated case-insensitively, first spelling
/// wins. A blank name fails validation before anything is written.
pub(crate) fn replace_contact_tags_by_name(
    conn: &Connection,
    contact_id: ContactId,
    names: &[String],
) -> RepoResult<()> {
    let contact_id_text = contact_id.to_string();
    let user_id = owner_of(conn, "contacts", contact_id)?
        .ok_or_else(|| RepoError::not_found("contact", contact_id))?;
    let user_id_text = user_id.to_string();

    let mut seen = HashSet::new();
    let mut wanted = Vec::with_capacity(names.len());
    for name in names {
        let candidate = Tag::new(user_id, name);
        candidate.validate()?;
        if seen.insert(candidate.name.to_lowercase()) {
            wanted.push(candidate);
        }
    }

    conn.execute(
        "DELETE FROM contact_tags WHERE contact_id = ?1;",
        [contact_id_text.as_str()],
    )?;

    for tag in &wanted {
        conn.execute(
            "INSERT OR IGNORE INTO tags (id, user_id, name, color, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                tag.id.to_string(),
                user_id_text.as_str(),
                tag.name.as_str(),
                tag.color.as_str(),
                tag.created_at,
            ],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO contact_tags (contact_id, tag_id, created_at)
             SELECT ?1, id, ?2
             FROM tags
             WHERE user_id = ?3
               AND name = ?4;",
            params![
                contact_id_text.as_str(),
                tag.created_at,
                user_id_text.as_str(),
                tag.name.as_str()
            ],
        )?;
    }

    Ok(())
}

pub(crate) fn load_tags_for_contact(conn: &Connection, contact_id: ContactId) -> RepoResult<Vec<Tag>> {
    let mut stmt = conn.prepare(&format!(
        "{TAG_SELECT_SQL}
         INNER JOIN contact_tags ct ON ct.tag_id = tags.id
         WHERE ct.contact_id = ?1
         ORDER BY tags.name COLLATE NOCASE ASC, tags.id ASC;"
    ))?;
    let mut rows = stmt.query([contact_id.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(parse_tag_row(row)?);
    }
    Ok(tags)
}

fn owner_of(conn: &Connection, table: &'static str, id: Uuid) -> RepoResult<Option<UserId>> {
    let owner: Option<String> = conn
        .query_row(
            &format!("SELECT user_id FROM {table} WHERE id = ?1;"),
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    owner
        .map(|text| parse_uuid(&text, &format!("{table}.user_id")))
        .transpose()
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let tag = Tag {
        id: uuid_column(row, "id", "tags.id")?,
        user_id: uuid_column(row, "user_id", "tags.user_id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    };
    tag.validate()?;
    Ok(tag)
}

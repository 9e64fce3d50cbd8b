//! Email repository contracts and SQLite implementation.
//!
//! # Invariants
//! - An email's contact belongs to the email's user (composite foreign key).
//! - Open/click stamps are set once and never precede `sent_at`.

use crate::model::contact::ContactId;
use crate::model::email::{Email, EmailId, EmailProvider};
use crate::model::EpochMillis;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::sqlite_support::{
    enum_column, ensure_connection_ready, json_column, json_to_db, uuid_column,
};
use rusqlite::{params, Connection, Row};

const EMAIL_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    contact_id,
    subject,
    body,
    sent_at,
    opened_at,
    clicked_at,
    provider,
    metadata
FROM emails";

const EMAIL_COLUMNS: &[&str] = &[
    "id",
    "user_id",
    "contact_id",
    "subject",
    "body",
    "sent_at",
    "opened_at",
    "clicked_at",
    "provider",
    "metadata",
];

/// Repository interface for email records.
pub trait EmailRepository {
    fn create_email(&self, email: &Email) -> RepoResult<EmailId>;
    fn get_email(&self, id: EmailId) -> RepoResult<Option<Email>>;
    /// Emails sent to one contact, newest first.
    fn list_emails_for_contact(&self, contact_id: ContactId) -> RepoResult<Vec<Email>>;
    /// Records the first open. Later calls keep the original stamp.
    fn mark_opened(&self, id: EmailId, at: EpochMillis) -> RepoResult<Email>;
    /// Records the first click; a click implies an open.
    fn mark_clicked(&self, id: EmailId, at: EpochMillis) -> RepoResult<Email>;
    fn delete_email(&self, id: EmailId) -> RepoResult<()>;
}

/// SQLite-backed email repository.
pub struct SqliteEmailRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmailRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("emails", EMAIL_COLUMNS)])?;
        Ok(Self { conn })
    }

    fn load_required(&self, id: EmailId) -> RepoResult<Email> {
        self.get_email(id)?
            .ok_or_else(|| RepoError::not_found("email", id))
    }

    fn write_tracking(&self, email: &Email) -> RepoResult<()> {
        email.validate()?;
        self.conn.execute(
            "UPDATE emails
             SET opened_at = ?1, clicked_at = ?2
             WHERE id = ?3;",
            params![email.opened_at, email.clicked_at, email.id.to_string()],
        )?;
        Ok(())
    }
}

impl EmailRepository for SqliteEmailRepository<'_> {
    fn create_email(&self, email: &Email) -> RepoResult<EmailId> {
        email.validate()?;

        self.conn.execute(
            "INSERT INTO emails (
                id,
                user_id,
                contact_id,
                subject,
                body,
                sent_at,
                opened_at,
                clicked_at,
                provider,
                metadata
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                email.id.to_string(),
                email.user_id.to_string(),
                email.contact_id.to_string(),
                email.subject.as_str(),
                email.body.as_str(),
                email.sent_at,
                email.opened_at,
                email.clicked_at,
                email.provider.as_str(),
                json_to_db(email.metadata.as_ref()),
            ],
        )?;

        Ok(email.id)
    }

    fn get_email(&self, id: EmailId) -> RepoResult<Option<Email>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMAIL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_email_row(row)?));
        }
        Ok(None)
    }

    fn list_emails_for_contact(&self, contact_id: ContactId) -> RepoResult<Vec<Email>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMAIL_SELECT_SQL}
             WHERE contact_id = ?1
             ORDER BY sent_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query([contact_id.to_string()])?;
        let mut emails = Vec::new();
        while let Some(row) = rows.next()? {
            emails.push(parse_email_row(row)?);
        }
        Ok(emails)
    }

    fn mark_opened(&self, id: EmailId, at: EpochMillis) -> RepoResult<Email> {
        let mut email = self.load_required(id)?;
        if email.opened_at.is_none() {
            email.opened_at = Some(at);
            self.write_tracking(&email)?;
        }
        Ok(email)
    }

    fn mark_clicked(&self, id: EmailId, at: EpochMillis) -> RepoResult<Email> {
        let mut email = self.load_required(id)?;
        if email.clicked_at.is_none() {
            email.clicked_at = Some(at);
            if email.opened_at.is_none() {
                email.opened_at = Some(at);
            }
            self.write_tracking(&email)?;
        }
        Ok(email)
    }

    fn delete_email(&self, id: EmailId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM emails WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("email", id));
        }
        Ok(())
    }
}

fn parse_email_row(row: &Row<'_>) -> RepoResult<Email> {
    let email = Email {
        id: uuid_column(row, "id", "emails.id")?,
        user_id: uuid_column(row, "user_id", "emails.user_id")?,
        contact_id: uuid_column(row, "contact_id", "emails.contact_id")?,
        subject: row.get("subject")?,
        body: row.get("body")?,
        sent_at: row.get("sent_at")?,
        opened_at: row.get("opened_at")?,
        clicked_at: row.get("clicked_at")?,
        provider: enum_column(row, "provider", "emails.provider", EmailProvider::parse)?,
        metadata: json_column(row, "metadata", "emails.metadata")?,
    };
    email.validate()?;
    Ok(email)
}

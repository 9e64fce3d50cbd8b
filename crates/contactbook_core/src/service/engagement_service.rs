//! Engagement use-case service: emails and the activity timeline.
//!
//! # Responsibility
//! - Record outgoing emails together with their timeline entry.
//! - Keep `contacts.last_contacted_at` in step with real interactions.
//!
//! # Invariants
//! - `log_email` writes the email, an `EMAIL_SENT` activity and the contact
//!   stamp in one transaction.
//! - `NOTE` activities never move `last_contacted_at`.

use crate::model::activity::{Activity, ActivityType};
use crate::model::contact::ContactId;
use crate::model::email::{Email, EmailId};
use crate::model::EpochMillis;
use crate::repo::activity_repo::{
    ActivityListQuery, ActivityRepository, SqliteActivityRepository,
};
use crate::repo::contact_repo::{ContactRepository, SqliteContactRepository};
use crate::repo::email_repo::{EmailRepository, SqliteEmailRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::json;

/// Engagement service bound to one connection.
pub struct EngagementService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> EngagementService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Stores a sent email and its `EMAIL_SENT` timeline entry.
    pub fn log_email(&self, email: &Email) -> ServiceResult<Email> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        SqliteEmailRepository::try_new(&tx)?.create_email(email)?;

        let mut activity = Activity::new(email.user_id, email.contact_id, ActivityType::EmailSent)
            .with_description(email.subject.clone());
        activity.occurred_at = email.sent_at;
        activity.metadata = Some(json!({
            "emailId": email.id.to_string(),
            "provider": email.provider.as_str(),
        }));
        SqliteActivityRepository::try_new(&tx)?.create_activity(&activity)?;
        SqliteContactRepository::try_new(&tx)?.mark_contacted(email.contact_id, email.sent_at)?;
        tx.commit()?;

        info!(
            "event=email_log module=service status=ok email_id={} contact_id={}",
            email.id, email.contact_id
        );
        SqliteEmailRepository::try_new(self.conn)?
            .get_email(email.id)?
            .ok_or(ServiceError::InconsistentState(
                "logged email not found in read-back",
            ))
    }

    /// Appends a timeline entry; interactions also stamp the contact.
    pub fn log_activity(&self, activity: &Activity) -> ServiceResult<Activity> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        SqliteActivityRepository::try_new(&tx)?.create_activity(activity)?;
        if activity.kind.is_interaction() {
            SqliteContactRepository::try_new(&tx)?
                .mark_contacted(activity.contact_id, activity.occurred_at)?;
        }
        tx.commit()?;

        info!(
            "event=activity_log module=service status=ok activity_id={} type={}",
            activity.id,
            activity.kind.as_str()
        );
        SqliteActivityRepository::try_new(self.conn)?
            .get_activity(activity.id)?
            .ok_or(ServiceError::InconsistentState(
                "logged activity not found in read-back",
            ))
    }

    /// Returns a contact's timeline, newest first.
    pub fn timeline(&self, contact_id: ContactId, limit: Option<u32>) -> ServiceResult<Vec<Activity>> {
        let query = ActivityListQuery {
            contact_id: Some(contact_id),
            limit,
            ..ActivityListQuery::default()
        };
        Ok(SqliteActivityRepository::try_new(self.conn)?.list_activities(&query)?)
    }

    pub fn emails_for_contact(&self, contact_id: ContactId) -> ServiceResult<Vec<Email>> {
        Ok(SqliteEmailRepository::try_new(self.conn)?.list_emails_for_contact(contact_id)?)
    }

    pub fn record_email_open(&self, id: EmailId, at: EpochMillis) -> ServiceResult<Email> {
        Ok(SqliteEmailRepository::try_new(self.conn)?.mark_opened(id, at)?)
    }

    pub fn record_email_click(&self, id: EmailId, at: EpochMillis) -> ServiceResult<Email> {
        Ok(SqliteEmailRepository::try_new(self.conn)?.mark_clicked(id, at)?)
    }
}

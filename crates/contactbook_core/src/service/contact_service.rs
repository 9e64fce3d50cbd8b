//! Contact use-case service.
//!
//! # Responsibility
//! - Create and update contacts together with their tag sets.
//! - Normalize tag input before it reaches storage.
//!
//! # Invariants
//! - Creating a contact with tags commits both or neither.
//! - Tag names are trimmed and deduplicated case-insensitively; the first
//!   spelling wins.

use crate::model::contact::{Contact, ContactId};
use crate::model::tag::Tag;
use crate::repo::contact_repo::{ContactListQuery, ContactRepository, SqliteContactRepository};
use crate::repo::normalize_list_limit;
use crate::repo::tag_repo::{load_tags_for_contact, replace_contact_tags_by_name};
use crate::service::{ServiceError, ServiceResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Contact read model with its tags attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactDetails {
    pub contact: Contact,
    /// Sorted by name.
    pub tags: Vec<Tag>,
}

/// List result envelope used by service callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactListResult {
    pub items: Vec<Contact>,
    /// Effective normalized limit used by the query.
    pub applied_limit: u32,
}

/// Contact service bound to one connection.
pub struct ContactService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ContactService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a contact and links `tags` (creating missing ones) atomically.
    pub fn create_contact(
        &self,
        contact: &Contact,
        tags: &[String],
    ) -> ServiceResult<ContactDetails> {
        let normalized = validate_and_normalize_tags(tags)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        SqliteContactRepository::try_new(&tx)?.create_contact(contact)?;
        if !normalized.is_empty() {
            replace_contact_tags_by_name(&tx, contact.id, &normalized)?;
        }
        tx.commit()?;

        info!(
            "event=contact_create module=service status=ok contact_id={} tag_count={}",
            contact.id,
            normalized.len()
        );
        self.read_back(contact.id, "created contact not found in read-back")
    }

    pub fn get_contact(&self, id: ContactId) -> ServiceResult<Option<ContactDetails>> {
        let repo = SqliteContactRepository::try_new(self.conn)?;
        match repo.get_contact(id)? {
            Some(contact) => {
                let tags = load_tags_for_contact(self.conn, id)?;
                Ok(Some(ContactDetails { contact, tags }))
            }
            None => Ok(None),
        }
    }

    /// Replaces the contact's stored fields; tags are left untouched.
    pub fn update_contact(&self, contact: &Contact) -> ServiceResult<ContactDetails> {
        SqliteContactRepository::try_new(self.conn)?.update_contact(contact)?;
        self.read_back(contact.id, "updated contact not found in read-back")
    }

    /// Atomically replaces the full tag set of one contact.
    pub fn set_contact_tags(
        &self,
        id: ContactId,
        tags: &[String],
    ) -> ServiceResult<ContactDetails> {
        let normalized = validate_and_normalize_tags(tags)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        replace_contact_tags_by_name(&tx, id, &normalized)?;
        tx.commit()?;

        self.read_back(id, "contact missing after tag replacement")
    }

    pub fn list_contacts(&self, query: &ContactListQuery) -> ServiceResult<ContactListResult> {
        let applied_limit = normalize_list_limit(query.limit);
        let query = ContactListQuery {
            limit: Some(applied_limit),
            ..query.clone()
        };
        let items = SqliteContactRepository::try_new(self.conn)?.list_contacts(&query)?;
        Ok(ContactListResult {
            items,
            applied_limit,
        })
    }

    pub fn delete_contact(&self, id: ContactId) -> ServiceResult<()> {
        SqliteContactRepository::try_new(self.conn)?.delete_contact(id)?;
        info!("event=contact_delete module=service status=ok contact_id={id}");
        Ok(())
    }

    fn read_back(&self, id: ContactId, details: &'static str) -> ServiceResult<ContactDetails> {
        self.get_contact(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}

/// Trims and deduplicates tag names case-insensitively, sorted by their
/// lowercase form. Blank names are rejected.
pub fn validate_and_normalize_tags(tags: &[String]) -> ServiceResult<Vec<String>> {
    let mut unique: BTreeMap<String, String> = BTreeMap::new();
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidTag(tag.clone()));
        }
        unique
            .entry(trimmed.to_lowercase())
            .or_insert_with(|| trimmed.to_string());
    }
    Ok(unique.into_values().collect())
}

//! Activity timeline model.

use crate::model::contact::ContactId;
use crate::model::user::UserId;
use crate::model::{ensure_id, now_epoch_ms, EpochMillis, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub type ActivityId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    EmailSent,
    EmailReceived,
    Call,
    Meeting,
    Note,
}

impl ActivityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailSent => "EMAIL_SENT",
            Self::EmailReceived => "EMAIL_RECEIVED",
            Self::Call => "CALL",
            Self::Meeting => "MEETING",
            Self::Note => "NOTE",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EMAIL_SENT" => Some(Self::EmailSent),
            "EMAIL_RECEIVED" => Some(Self::EmailReceived),
            "CALL" => Some(Self::Call),
            "MEETING" => Some(Self::Meeting),
            "NOTE" => Some(Self::Note),
            _ => None,
        }
    }

    /// Whether this activity is an actual interaction with the contact.
    ///
    /// Notes are private to the user and do not move `last_contacted_at`.
    pub fn is_interaction(self) -> bool {
        !matches!(self, Self::Note)
    }
}

/// One entry on a contact's interaction timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub user_id: UserId,
    pub contact_id: ContactId,
    /// Serialized as `type` to match external schema naming.
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub description: Option<String>,
    pub occurred_at: EpochMillis,
    pub metadata: Option<JsonValue>,
}

impl Activity {
    pub fn new(user_id: UserId, contact_id: ContactId, kind: ActivityType) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            contact_id,
            kind,
            description: None,
            occurred_at: now_epoch_ms(),
            metadata: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_id("userId", self.user_id)?;
        ensure_id("contactId", self.contact_id)
    }
}

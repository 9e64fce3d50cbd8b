//! Email record model.

use crate::model::contact::ContactId;
use crate::model::user::UserId;
use crate::model::{
    ensure_id, ensure_not_blank, now_epoch_ms, EpochMillis, ModelValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub type EmailId = Uuid;

/// Mail transport the message went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailProvider {
    Gmail,
    Outlook,
    Smtp,
}

impl EmailProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gmail => "GMAIL",
            Self::Outlook => "OUTLOOK",
            Self::Smtp => "SMTP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "GMAIL" => Some(Self::Gmail),
            "OUTLOOK" => Some(Self::Outlook),
            "SMTP" => Some(Self::Smtp),
            _ => None,
        }
    }
}

/// Email sent by a user to one of their contacts.
///
/// `opened_at` and `clicked_at` are tracking stamps and never precede
/// `sent_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    pub id: EmailId,
    pub user_id: UserId,
    pub contact_id: ContactId,
    pub subject: String,
    pub body: String,
    pub sent_at: EpochMillis,
    pub opened_at: Option<EpochMillis>,
    pub clicked_at: Option<EpochMillis>,
    pub provider: EmailProvider,
    pub metadata: Option<JsonValue>,
}

impl Email {
    pub fn new(
        user_id: UserId,
        contact_id: ContactId,
        provider: EmailProvider,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            contact_id,
            subject: subject.into(),
            body: body.into(),
            sent_at: now_epoch_ms(),
            opened_at: None,
            clicked_at: None,
            provider,
            metadata: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_id("userId", self.user_id)?;
        ensure_id("contactId", self.contact_id)?;
        ensure_not_blank("subject", &self.subject)?;
        for (field, stamp) in [("openedAt", self.opened_at), ("clickedAt", self.clicked_at)] {
            if let Some(value) = stamp {
                if value < self.sent_at {
                    return Err(ModelValidationError::TimestampBeforeSent {
                        field,
                        sent_at: self.sent_at,
                        value,
                    });
                }
            }
        }
        Ok(())
    }
}

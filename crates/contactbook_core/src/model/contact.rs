//! Contact model and its enum-typed columns.
//!
//! # Invariants
//! - A contact belongs to exactly one user for its whole lifetime.
//! - `priority` always has a value; `gender` is optional.

use crate::model::user::UserId;
use crate::model::{
    ensure_email, ensure_http_url, ensure_id, ensure_not_blank, now_epoch_ms, EpochMillis,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub type ContactId = Uuid;

/// Follow-up priority of a contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
            Self::PreferNotToSay => "PREFER_NOT_TO_SAY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            "PREFER_NOT_TO_SAY" => Some(Self::PreferNotToSay),
            _ => None,
        }
    }
}

/// Person tracked by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub user_id: UserId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linked_in_url: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub role: Option<String>,
    pub priority: Priority,
    pub gender: Option<Gender>,
    /// Date of birth at midnight UTC, epoch milliseconds.
    pub birthday: Option<EpochMillis>,
    pub profile_picture: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<JsonValue>,
    pub last_contacted_at: Option<EpochMillis>,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

impl Contact {
    /// Creates a contact with default priority and no optional details.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            email: None,
            phone: None,
            linked_in_url: None,
            company: None,
            industry: None,
            role: None,
            priority: Priority::default(),
            gender: None,
            birthday: None,
            profile_picture: None,
            notes: None,
            metadata: None,
            last_contacted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_id("userId", self.user_id)?;
        ensure_not_blank("name", &self.name)?;
        if let Some(email) = self.email.as_deref() {
            ensure_email(email)?;
        }
        if let Some(url) = self.linked_in_url.as_deref() {
            ensure_http_url("linkedInUrl", url)?;
        }
        Ok(())
    }
}

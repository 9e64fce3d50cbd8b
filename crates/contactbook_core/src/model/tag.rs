//! Tag model and the contact/tag link record.
//!
//! # Invariants
//! - Tag names are unique per user, compared case-insensitively.
//! - A (contact, tag) pair is linked at most once.

use crate::model::contact::ContactId;
use crate::model::user::UserId;
use crate::model::{
    ensure_hex_color, ensure_id, ensure_not_blank, now_epoch_ms, EpochMillis, ValidationResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TagId = Uuid;

/// Color assigned to tags created without an explicit one.
pub const DEFAULT_TAG_COLOR: &str = "#6B7280";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub user_id: UserId,
    pub name: String,
    /// `#RRGGBB` display color.
    pub color: String,
    pub created_at: EpochMillis,
}

impl Tag {
    /// Creates a tag with the default color. The name is trimmed.
    pub fn new(user_id: UserId, name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.trim().to_string(),
            color: DEFAULT_TAG_COLOR.to_string(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_id("userId", self.user_id)?;
        ensure_not_blank("name", &self.name)?;
        ensure_hex_color(&self.color)
    }
}

/// Link row realizing the contact <-> tag many-to-many relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactTag {
    pub contact_id: ContactId,
    pub tag_id: TagId,
    pub created_at: EpochMillis,
}

//! User (account owner) model.
//!
//! # Invariants
//! - `supabase_id` and `email` are unique across all users.
//! - All other records are owned by exactly one user.

use crate::model::{
    ensure_email, ensure_id, ensure_not_blank, now_epoch_ms, EpochMillis, ValidationResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub type UserId = Uuid;

/// Account owner, linked to an external auth identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Subject id issued by the external auth provider.
    pub supabase_id: String,
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    /// Sign-in provider name, e.g. `google` or `email`.
    pub provider: Option<String>,
    /// Free-form per-user preferences.
    pub settings: Option<JsonValue>,
    pub last_login_at: Option<EpochMillis>,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

impl User {
    /// Creates a user with a generated id and `now` timestamps.
    pub fn new(supabase_id: impl Into<String>, email: impl Into<String>) -> Self {
        let now = now_epoch_ms();
        Self {
            id: Uuid::new_v4(),
            supabase_id: supabase_id.into(),
            email: email.into(),
            name: None,
            profile_picture: None,
            provider: None,
            settings: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_not_blank("supabaseId", &self.supabase_id)?;
        ensure_email(&self.email)
    }
}

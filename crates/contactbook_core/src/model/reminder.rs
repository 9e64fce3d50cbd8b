//! Follow-up reminder model.
//!
//! # Invariants
//! - `completed_at` is set if and only if `completed` is true.

use crate::model::contact::ContactId;
use crate::model::user::UserId;
use crate::model::{
    ensure_id, ensure_not_blank, now_epoch_ms, EpochMillis, ModelValidationError,
    ValidationResult,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ReminderId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserId,
    pub contact_id: ContactId,
    pub title: String,
    pub due_date: EpochMillis,
    pub completed: bool,
    pub completed_at: Option<EpochMillis>,
    pub created_at: EpochMillis,
}

impl Reminder {
    /// Creates an open reminder.
    pub fn new(
        user_id: UserId,
        contact_id: ContactId,
        title: impl Into<String>,
        due_date: EpochMillis,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            contact_id,
            title: title.into(),
            due_date,
            completed: false,
            completed_at: None,
            created_at: now_epoch_ms(),
        }
    }

    /// Marks the reminder done at `at`. Already-completed reminders keep
    /// their original completion time.
    pub fn complete(&mut self, at: EpochMillis) {
        if !self.completed {
            self.completed = true;
            self.completed_at = Some(at);
        }
    }

    pub fn reopen(&mut self) {
        self.completed = false;
        self.completed_at = None;
    }

    /// Open and past its due date.
    pub fn is_overdue(&self, now: EpochMillis) -> bool {
        !self.completed && self.due_date < now
    }

    pub fn validate(&self) -> ValidationResult {
        ensure_id("id", self.id)?;
        ensure_id("userId", self.user_id)?;
        ensure_id("contactId", self.contact_id)?;
        ensure_not_blank("title", &self.title)?;
        if self.completed != self.completed_at.is_some() {
            return Err(ModelValidationError::CompletionMismatch {
                completed: self.completed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Reminder;
    use uuid::Uuid;

    #[test]
    fn complete_keeps_first_completion_time() {
        let mut reminder = Reminder::new(Uuid::new_v4(), Uuid::new_v4(), "call back", 1_000);
        reminder.complete(2_000);
        reminder.complete(3_000);
        assert!(reminder.completed);
        assert_eq!(reminder.completed_at, Some(2_000));
        assert!(reminder.validate().is_ok());
    }

    #[test]
    fn overdue_only_applies_to_open_reminders() {
        let mut reminder = Reminder::new(Uuid::new_v4(), Uuid::new_v4(), "send deck", 1_000);
        assert!(reminder.is_overdue(5_000));
        assert!(!reminder.is_overdue(500));
        reminder.complete(5_000);
        assert!(!reminder.is_overdue(9_000));
    }
}

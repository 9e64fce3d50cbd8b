//! Reminder use-case service.

use crate::model::now_epoch_ms;
use crate::model::reminder::{Reminder, ReminderId};
use crate::model::user::UserId;
use crate::model::EpochMillis;
use crate::repo::reminder_repo::{ReminderListQuery, ReminderRepository};
use crate::service::{ServiceError, ServiceResult};
use log::info;

/// Reminder service facade over repository implementations.
pub struct ReminderService<R: ReminderRepository> {
    repo: R,
}

impl<R: ReminderRepository> ReminderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn schedule(&self, reminder: &Reminder) -> ServiceResult<Reminder> {
        let id = self.repo.create_reminder(reminder)?;
        self.read_back(id)
    }

    /// Marks a reminder done now. Completing twice keeps the first stamp.
    pub fn complete(&self, id: ReminderId) -> ServiceResult<Reminder> {
        let mut reminder = self.load(id)?;
        if !reminder.completed {
            reminder.complete(now_epoch_ms());
            self.repo.update_reminder(&reminder)?;
            info!("event=reminder_complete module=service status=ok reminder_id={id}");
        }
        self.read_back(id)
    }

    pub fn reopen(&self, id: ReminderId) -> ServiceResult<Reminder> {
        let mut reminder = self.load(id)?;
        reminder.reopen();
        self.repo.update_reminder(&reminder)?;
        self.read_back(id)
    }

    pub fn reschedule(&self, id: ReminderId, due_date: EpochMillis) -> ServiceResult<Reminder> {
        let mut reminder = self.load(id)?;
        reminder.due_date = due_date;
        self.repo.update_reminder(&reminder)?;
        self.read_back(id)
    }

    /// Open reminders of a user, soonest first.
    pub fn list_open(&self, user_id: UserId) -> ServiceResult<Vec<Reminder>> {
        Ok(self.repo.list_reminders(&ReminderListQuery {
            user_id: Some(user_id),
            completed: Some(false),
            ..ReminderListQuery::default()
        })?)
    }

    /// Open reminders of a user whose due date is before `now`.
    pub fn list_overdue(&self, user_id: UserId, now: EpochMillis) -> ServiceResult<Vec<Reminder>> {
        Ok(self.repo.list_reminders(&ReminderListQuery {
            user_id: Some(user_id),
            completed: Some(false),
            due_before: Some(now),
            ..ReminderListQuery::default()
        })?)
    }

    pub fn delete(&self, id: ReminderId) -> ServiceResult<()> {
        Ok(self.repo.delete_reminder(id)?)
    }

    fn load(&self, id: ReminderId) -> ServiceResult<Reminder> {
        self.repo.get_reminder(id)?.ok_or(ServiceError::NotFound {
            entity: "reminder",
            id,
        })
    }

    fn read_back(&self, id: ReminderId) -> ServiceResult<Reminder> {
        self.repo
            .get_reminder(id)?
            .ok_or(ServiceError::InconsistentState(
                "reminder not found in read-back",
            ))
    }
}

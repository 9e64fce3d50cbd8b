//! Core domain logic for the ContactBook personal CRM.
//! This crate is the single source of truth for storage rules and
//! ownership invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::activity::{Activity, ActivityId, ActivityType};
pub use model::contact::{Contact, ContactId, Gender, Priority};
pub use model::email::{Email, EmailId, EmailProvider};
pub use model::reminder::{Reminder, ReminderId};
pub use model::tag::{ContactTag, Tag, TagId, DEFAULT_TAG_COLOR};
pub use model::user::{User, UserId};
pub use model::{EpochMillis, ModelValidationError};
pub use repo::activity_repo::{ActivityListQuery, ActivityRepository, SqliteActivityRepository};
pub use repo::contact_repo::{
    ContactListQuery, ContactRepository, PriorityCount, SqliteContactRepository,
};
pub use repo::email_repo::{EmailRepository, SqliteEmailRepository};
pub use repo::error::{RepoError, RepoResult};
pub use repo::reminder_repo::{ReminderListQuery, ReminderRepository, SqliteReminderRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::user_repo::{SqliteUserRepository, UserListQuery, UserRepository};
pub use seed::{seed_sample_data, SeedError, SeedSummary};
pub use service::contact_service::{ContactDetails, ContactListResult, ContactService};
pub use service::engagement_service::EngagementService;
pub use service::reminder_service::ReminderService;
pub use service::user_service::{SignInRequest, UserService};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

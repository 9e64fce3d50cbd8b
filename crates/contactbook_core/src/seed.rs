//! Sample data loader for development databases.
//!
//! # Responsibility
//! - Populate an empty database with a small, realistic data set through the
//!   regular repositories.
//!
//! # Invariants
//! - Runs in a single transaction: either everything is inserted or nothing.
//! - Refuses to run when any user already exists.

use crate::model::activity::{Activity, ActivityType};
use crate::model::contact::{Contact, Gender, Priority};
use crate::model::email::{Email, EmailProvider};
use crate::model::reminder::Reminder;
use crate::model::tag::Tag;
use crate::model::user::User;
use crate::model::{now_epoch_ms, EpochMillis};
use crate::repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
use crate::repo::contact_repo::{ContactRepository, SqliteContactRepository};
use crate::repo::email_repo::{EmailRepository, SqliteEmailRepository};
use crate::repo::error::RepoError;
use crate::repo::reminder_repo::{ReminderRepository, SqliteReminderRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::user_repo::{SqliteUserRepository, UserRepository};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

const HOUR_MS: EpochMillis = 60 * 60 * 1000;
const DAY_MS: EpochMillis = 24 * HOUR_MS;

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    /// Target database already holds users.
    AlreadySeeded { existing_users: u64 },
    Repo(RepoError),
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadySeeded { existing_users } => write!(
                f,
                "database already contains {existing_users} user(s); refusing to seed"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::AlreadySeeded { .. } => None,
        }
    }
}

impl From<RepoError> for SeedError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for SeedError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Row counts inserted by [`seed_sample_data`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub contacts: usize,
    pub tags: usize,
    pub contact_tags: usize,
    pub emails: usize,
    pub activities: usize,
    pub reminders: usize,
}

/// Inserts the sample data set into an empty database.
pub fn seed_sample_data(conn: &Connection) -> SeedResult<SeedSummary> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let users = SqliteUserRepository::try_new(&tx)?;
    let existing_users = users.count_users()?;
    if existing_users > 0 {
        return Err(SeedError::AlreadySeeded { existing_users });
    }

    let contacts = SqliteContactRepository::try_new(&tx)?;
    let tags = SqliteTagRepository::try_new(&tx)?;
    let emails = SqliteEmailRepository::try_new(&tx)?;
    let activities = SqliteActivityRepository::try_new(&tx)?;
    let reminders = SqliteReminderRepository::try_new(&tx)?;

    let now = now_epoch_ms();
    let mut summary = SeedSummary::default();

    let mut alex = User::new("seed-supabase-alex", "alex.rivera@example.com");
    alex.name = Some("Alex Rivera".to_string());
    alex.provider = Some("google".to_string());
    alex.last_login_at = Some(now - HOUR_MS);
    alex.settings = Some(json!({ "theme": "light", "weeklyDigest": true }));

    let mut sam = User::new("seed-supabase-sam", "sam.chen@example.com");
    sam.name = Some("Sam Chen".to_string());
    sam.provider = Some("email".to_string());
    sam.settings = Some(json!({ "theme": "dark", "timezone": "Europe/Berlin" }));

    for user in [&alex, &sam] {
        users.create_user(user)?;
        summary.users += 1;
    }

    let mut jordan =
        sample_contact(&alex, "Jordan Lee", "Acme Ventures", "Investor", Priority::High);
    jordan.email = Some("jordan.lee@acme.example".to_string());
    jordan.linked_in_url = Some("https://www.linkedin.com/in/jordan-lee".to_string());
    let mut priya = sample_contact(&alex, "Priya Patel", "Northwind", "CTO", Priority::Medium);
    priya.email = Some("priya@northwind.example".to_string());
    priya.gender = Some(Gender::Female);
    priya.industry = Some("Logistics".to_string());
    let marcus = sample_contact(&alex, "Marcus Johnson", "Globex", "Head of Sales", Priority::Low);
    let mut elena =
        sample_contact(&sam, "Elena Garcia", "Initech", "Design Lead", Priority::High);
    elena.email = Some("elena.garcia@initech.example".to_string());
    elena.birthday = Some(midnight_utc(now - 30 * 365 * DAY_MS));
    elena.metadata = Some(json!({ "metAt": "Config 2024" }));
    let tom = sample_contact(&sam, "Tom Becker", "Umbrella Corp", "Staff Engineer", Priority::Medium);

    for contact in [&jordan, &priya, &marcus, &elena, &tom] {
        contacts.create_contact(contact)?;
        summary.contacts += 1;
    }

    let investor = Tag::new(alex.id, "Investor").with_color("#10B981");
    let client = Tag::new(alex.id, "Client").with_color("#3B82F6");
    let follow_up = Tag::new(alex.id, "Follow-up").with_color("#F59E0B");
    let mentor = Tag::new(sam.id, "Mentor").with_color("#8B5CF6");
    let friend = Tag::new(sam.id, "Friend").with_color("#EC4899");

    for tag in [&investor, &client, &follow_up, &mentor, &friend] {
        tags.create_tag(tag)?;
        summary.tags += 1;
    }

    for (contact, tag) in [
        (&jordan, &investor),
        (&jordan, &follow_up),
        (&priya, &client),
        (&marcus, &client),
        (&elena, &mentor),
        (&tom, &friend),
    ] {
        tags.attach_tag(contact.id, tag.id)?;
        summary.contact_tags += 1;
    }

    let mut intro = Email::new(
        alex.id,
        jordan.id,
        EmailProvider::Gmail,
        "Great meeting you at the summit",
        "Hi Jordan,\n\nThanks for the chat. Sharing our deck as promised.\n\nAlex",
    );
    intro.sent_at = now - 2 * DAY_MS;
    intro.opened_at = Some(now - 2 * DAY_MS + 3 * HOUR_MS);

    let mut review = Email::new(
        sam.id,
        elena.id,
        EmailProvider::Outlook,
        "Portfolio review",
        "Hi Elena,\n\nCould you take a look at my portfolio this week?\n\nSam",
    );
    review.sent_at = now - DAY_MS;

    for email in [&intro, &review] {
        emails.create_email(email)?;
        summary.emails += 1;

        let mut sent = Activity::new(email.user_id, email.contact_id, ActivityType::EmailSent)
            .with_description(email.subject.clone());
        sent.occurred_at = email.sent_at;
        sent.metadata = Some(json!({ "emailId": email.id.to_string() }));
        activities.create_activity(&sent)?;
        contacts.mark_contacted(email.contact_id, email.sent_at)?;
        summary.activities += 1;
    }

    let mut call = Activity::new(alex.id, priya.id, ActivityType::Call)
        .with_description("Discussed Q3 integration timeline");
    call.occurred_at = now - 5 * DAY_MS;
    let mut meeting = Activity::new(sam.id, tom.id, ActivityType::Meeting)
        .with_description("Lunch, talked about the platform rewrite");
    meeting.occurred_at = now - 3 * DAY_MS;

    for activity in [&call, &meeting] {
        activities.create_activity(activity)?;
        contacts.mark_contacted(activity.contact_id, activity.occurred_at)?;
        summary.activities += 1;
    }

    let deck = Reminder::new(alex.id, jordan.id, "Send updated deck", now + 3 * DAY_MS);
    let check_in = Reminder::new(alex.id, marcus.id, "Check in about renewal", now - DAY_MS);
    let mut coffee = Reminder::new(sam.id, tom.id, "Book coffee with Tom", now - 4 * DAY_MS);
    coffee.complete(now - 3 * DAY_MS);

    for reminder in [&deck, &check_in, &coffee] {
        reminders.create_reminder(reminder)?;
        summary.reminders += 1;
    }

    tx.commit()?;
    info!(
        "event=seed module=seed status=ok users={} contacts={} tags={} emails={} activities={} reminders={}",
        summary.users,
        summary.contacts,
        summary.tags,
        summary.emails,
        summary.activities,
        summary.reminders
    );
    Ok(summary)
}

fn sample_contact(
    owner: &User,
    name: &str,
    company: &str,
    role: &str,
    priority: Priority,
) -> Contact {
    let mut contact = Contact::new(owner.id, name);
    contact.company = Some(company.to_string());
    contact.role = Some(role.to_string());
    contact.priority = priority;
    contact
}

/// Rounds an instant down to midnight UTC of its day.
fn midnight_utc(at: EpochMillis) -> EpochMillis {
    at.div_euclid(DAY_MS) * DAY_MS
}

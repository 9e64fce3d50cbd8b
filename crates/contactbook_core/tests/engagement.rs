use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    Activity, ActivityListQuery, ActivityRepository, ActivityType, Contact, ContactId,
    ContactRepository, Email, EmailProvider, EmailRepository, EngagementService, RepoError,
    ServiceError, SqliteActivityRepository, SqliteContactRepository, SqliteEmailRepository,
    SqliteUserRepository, User, UserId, UserRepository,
};
use rusqlite::Connection;
use serde_json::json;

const SENT_AT: i64 = 1_700_000_000_000;

#[test]
fn log_email_records_activity_and_stamps_contact() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service = EngagementService::new(&conn);

    let mut email = Email::new(user, contact, EmailProvider::Gmail, "Intro", "Hello!");
    email.sent_at = SENT_AT;
    let stored = service.log_email(&email).unwrap();
    assert_eq!(stored, email);

    let timeline = service.timeline(contact, None).unwrap();
    assert_eq!(timeline.len(), 1);
    assert_eq!(timeline[0].kind, ActivityType::EmailSent);
    assert_eq!(timeline[0].occurred_at, SENT_AT);
    assert_eq!(timeline[0].description.as_deref(), Some("Intro"));
    assert_eq!(
        timeline[0].metadata,
        Some(json!({ "emailId": email.id.to_string(), "provider": "GMAIL" }))
    );

    assert_eq!(last_contacted_at(&conn, contact), Some(SENT_AT));
    assert_eq!(service.emails_for_contact(contact).unwrap(), vec![email]);
}

#[test]
fn log_email_for_other_users_contact_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let (_, contact) = user_with_contact(&conn, "alex@example.com");
    let (sam, _) = user_with_contact(&conn, "sam@example.com");
    let service = EngagementService::new(&conn);

    let email = Email::new(sam, contact, EmailProvider::Smtp, "Hi", "Body");
    let err = service.log_email(&email).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::ForeignKeyViolation(_))
    ));

    assert!(service.emails_for_contact(contact).unwrap().is_empty());
    assert!(service.timeline(contact, None).unwrap().is_empty());
    assert_eq!(last_contacted_at(&conn, contact), None);
}

#[test]
fn notes_do_not_count_as_contact_but_calls_do() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service = EngagementService::new(&conn);

    let mut note = Activity::new(user, contact, ActivityType::Note).with_description("Likes tea");
    note.occurred_at = 5_000;
    service.log_activity(&note).unwrap();
    assert_eq!(last_contacted_at(&conn, contact), None);

    let mut call = Activity::new(user, contact, ActivityType::Call);
    call.occurred_at = 4_000;
    call.metadata = Some(json!({ "durationMinutes": 15 }));
    let stored = service.log_activity(&call).unwrap();
    assert_eq!(stored, call);
    assert_eq!(last_contacted_at(&conn, contact), Some(4_000));

    let timeline = service.timeline(contact, None).unwrap();
    assert_eq!(
        timeline.iter().map(|entry| entry.id).collect::<Vec<_>>(),
        vec![note.id, call.id]
    );
}

#[test]
fn activity_list_filters_by_type_and_time_window() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let repo = SqliteActivityRepository::try_new(&conn).unwrap();

    for (kind, at) in [
        (ActivityType::Call, 1_000),
        (ActivityType::Meeting, 2_000),
        (ActivityType::Call, 3_000),
        (ActivityType::EmailReceived, 4_000),
    ] {
        let mut activity = Activity::new(user, contact, kind);
        activity.occurred_at = at;
        repo.create_activity(&activity).unwrap();
    }

    let calls = repo
        .list_activities(&ActivityListQuery {
            user_id: Some(user),
            kind: Some(ActivityType::Call),
            ..ActivityListQuery::default()
        })
        .unwrap();
    assert_eq!(
        calls.iter().map(|a| a.occurred_at).collect::<Vec<_>>(),
        vec![3_000, 1_000]
    );

    let window = repo
        .list_activities(&ActivityListQuery {
            contact_id: Some(contact),
            occurred_from: Some(2_000),
            occurred_until: Some(4_000),
            ..ActivityListQuery::default()
        })
        .unwrap();
    assert_eq!(
        window.iter().map(|a| a.occurred_at).collect::<Vec<_>>(),
        vec![3_000, 2_000]
    );
}

#[test]
fn open_and_click_tracking_keeps_first_stamps() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service = EngagementService::new(&conn);

    let mut email = Email::new(user, contact, EmailProvider::Outlook, "Deck", "Attached");
    email.sent_at = 1_000;
    service.log_email(&email).unwrap();

    let clicked = service.record_email_click(email.id, 2_000).unwrap();
    assert_eq!(clicked.opened_at, Some(2_000));
    assert_eq!(clicked.clicked_at, Some(2_000));

    let reopened = service.record_email_open(email.id, 9_000).unwrap();
    assert_eq!(reopened.opened_at, Some(2_000));

    let repo = SqliteEmailRepository::try_new(&conn).unwrap();
    let stored = repo.get_email(email.id).unwrap().unwrap();
    assert_eq!(stored.opened_at, Some(2_000));
    assert_eq!(stored.clicked_at, Some(2_000));
}

#[test]
fn tracking_before_send_time_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let repo = SqliteEmailRepository::try_new(&conn).unwrap();

    let mut email = Email::new(user, contact, EmailProvider::Gmail, "Later", "Body");
    email.sent_at = 10_000;
    repo.create_email(&email).unwrap();

    let err = repo.mark_opened(email.id, 5_000).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.get_email(email.id).unwrap().unwrap().opened_at, None);

    let err = repo.mark_opened(uuid::Uuid::new_v4(), 5_000).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "email", .. }));
}

#[test]
fn delete_email_keeps_timeline_and_reports_missing_row() {
    let conn = open_db_in_memory().expect("open db");
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service = EngagementService::new(&conn);
    let email = Email::new(user, contact, EmailProvider::Gmail, "Intro", "Hello!");
    service.log_email(&email).expect("log email");

    let repo = SqliteEmailRepository::try_new(&conn).expect("email repo");
    repo.delete_email(email.id).expect("delete email");

    assert!(repo.get_email(email.id).expect("get email").is_none());
    assert!(repo.list_emails_for_contact(contact).expect("list emails").is_empty());
    assert_eq!(service.timeline(contact, None).expect("timeline").len(), 1);
    assert!(matches!(
        repo.delete_email(email.id).expect_err("second delete"),
        RepoError::NotFound { entity: "email", .. }
    ));
}

#[test]
fn delete_activity_removes_single_entry() {
    let conn = open_db_in_memory().expect("open db");
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let repo = SqliteActivityRepository::try_new(&conn).expect("activity repo");
    let call = Activity::new(user, contact, ActivityType::Call);
    let meeting = Activity::new(user, contact, ActivityType::Meeting);
    repo.create_activity(&call).expect("create call");
    repo.create_activity(&meeting).expect("create meeting");

    assert_eq!(repo.get_activity(call.id).expect("get call"), Some(call.clone()));

    repo.delete_activity(call.id).expect("delete call");

    assert!(repo.get_activity(call.id).expect("get deleted").is_none());
    assert_eq!(repo.get_activity(meeting.id).expect("get meeting"), Some(meeting));
    assert!(matches!(
        repo.delete_activity(call.id).expect_err("second delete"),
        RepoError::NotFound {
            entity: "activity",
            ..
        }
    ));
}

fn user_with_contact(conn: &Connection, email: &str) -> (UserId, ContactId) {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    let user = users
        .create_user(&User::new(format!("auth-{email}"), email))
        .unwrap();
    let contacts = SqliteContactRepository::try_new(conn).unwrap();
    let contact = contacts
        .create_contact(&Contact::new(user, "Jordan"))
        .unwrap();
    (user, contact)
}

fn last_contacted_at(conn: &Connection, contact: ContactId) -> Option<i64> {
    SqliteContactRepository::try_new(conn)
        .unwrap()
        .get_contact(contact)
        .unwrap()
        .unwrap()
        .last_contacted_at
}

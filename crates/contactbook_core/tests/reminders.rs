use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    Contact, ContactId, ContactRepository, Reminder, ReminderListQuery, ReminderRepository,
    ReminderService, RepoError, ServiceError, SqliteContactRepository, SqliteReminderRepository,
    SqliteUserRepository, User, UserId, UserRepository,
};
use rusqlite::Connection;

#[test]
fn schedule_complete_and_reopen_reminder() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service = ReminderService::new(SqliteReminderRepository::try_new(&conn).unwrap());

    let reminder = Reminder::new(user, contact, "Send deck", 10_000);
    let scheduled = service.schedule(&reminder).unwrap();
    assert_eq!(scheduled, reminder);

    let done = service.complete(reminder.id).unwrap();
    assert!(done.completed);
    let first_stamp = done.completed_at;
    assert!(first_stamp.is_some());

    let again = service.complete(reminder.id).unwrap();
    assert_eq!(again.completed_at, first_stamp);

    let reopened = service.reopen(reminder.id).unwrap();
    assert!(!reopened.completed);
    assert_eq!(reopened.completed_at, None);

    let moved = service.reschedule(reminder.id, 20_000).unwrap();
    assert_eq!(moved.due_date, 20_000);
}

#[test]
fn open_and_overdue_lists_exclude_completed_reminders() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let (other_user, other_contact) = user_with_contact(&conn, "sam@example.com");
    let service = ReminderService::new(SqliteReminderRepository::try_new(&conn).unwrap());

    let late = Reminder::new(user, contact, "Late", 1_000);
    let soon = Reminder::new(user, contact, "Soon", 9_000);
    let mut done = Reminder::new(user, contact, "Done", 500);
    done.complete(600);
    let foreign = Reminder::new(other_user, other_contact, "Not mine", 100);
    for reminder in [&late, &soon, &done, &foreign] {
        service.schedule(reminder).unwrap();
    }

    let open = service.list_open(user).unwrap();
    assert_eq!(
        open.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![late.id, soon.id]
    );

    let overdue = service.list_overdue(user, 5_000).unwrap();
    assert_eq!(
        overdue.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![late.id]
    );
}

#[test]
fn repository_rejects_inconsistent_completion_state() {
    let conn = open_db_in_memory().unwrap();
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let repo = SqliteReminderRepository::try_new(&conn).unwrap();

    let mut reminder = Reminder::new(user, contact, "Broken", 1_000);
    reminder.completed = true;
    let err = repo.create_reminder(&reminder).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let listed = repo
        .list_reminders(&ReminderListQuery {
            contact_id: Some(contact),
            ..ReminderListQuery::default()
        })
        .unwrap();
    assert!(listed.is_empty());
}

#[test]
fn service_reports_missing_reminder() {
    let conn = open_db_in_memory().unwrap();
    let service = ReminderService::new(SqliteReminderRepository::try_new(&conn).unwrap());

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        service.complete(missing).unwrap_err(),
        ServiceError::NotFound {
            entity: "reminder",
            ..
        }
    ));
    assert!(matches!(
        service.delete(missing).unwrap_err(),
        ServiceError::NotFound {
            entity: "reminder",
            ..
        }
    ));
}

#[test]
fn delete_removes_reminder_once() {
    let conn = open_db_in_memory().expect("open db");
    let (user, contact) = user_with_contact(&conn, "alex@example.com");
    let service =
        ReminderService::new(SqliteReminderRepository::try_new(&conn).expect("reminder repo"));
    let keep = Reminder::new(user, contact, "Keep", 2_000);
    let dropped = Reminder::new(user, contact, "Drop", 1_000);
    service.schedule(&keep).expect("schedule keep");
    service.schedule(&dropped).expect("schedule dropped");

    service.delete(dropped.id).expect("delete reminder");

    let repo = SqliteReminderRepository::try_new(&conn).expect("reminder repo");
    assert!(repo.get_reminder(dropped.id).expect("get deleted").is_none());
    assert_eq!(
        service
            .list_open(user)
            .expect("list open")
            .iter()
            .map(|r| r.id)
            .collect::<Vec<_>>(),
        vec![keep.id]
    );
    assert!(matches!(
        repo.delete_reminder(dropped.id).expect_err("second delete"),
        RepoError::NotFound {
            entity: "reminder",
            ..
        }
    ));
    assert!(matches!(
        service.delete(dropped.id).expect_err("second service delete"),
        ServiceError::NotFound {
            entity: "reminder",
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

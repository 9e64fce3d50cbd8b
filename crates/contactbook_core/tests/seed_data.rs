use contactbook_core::db::open_db_in_memory;
use contactbook_core::model::now_epoch_ms;
use contactbook_core::{
    seed_sample_data, ContactListQuery, ContactRepository, Priority, ReminderService, SeedError,
    SeedSummary, SqliteContactRepository, SqliteReminderRepository, SqliteUserRepository,
    UserRepository,
};
use rusqlite::Connection;

#[test]
fn seed_inserts_sample_data_set() {
    let conn = open_db_in_memory().unwrap();

    let summary = seed_sample_data(&conn).unwrap();
    assert_eq!(
        summary,
        SeedSummary {
            users: 2,
            contacts: 5,
            tags: 5,
            contact_tags: 6,
            emails: 2,
            activities: 4,
            reminders: 3,
        }
    );

    for (table, expected) in [
        ("users", 2),
        ("contacts", 5),
        ("tags", 5),
        ("contact_tags", 6),
        ("emails", 2),
        ("activities", 4),
        ("reminders", 3),
    ] {
        assert_eq!(count(&conn, table), expected, "{table}");
    }
}

#[test]
fn seeded_data_is_consistent_per_owner() {
    let conn = open_db_in_memory().unwrap();
    seed_sample_data(&conn).unwrap();

    let users = SqliteUserRepository::try_new(&conn).unwrap();
    let alex = users
        .find_by_email("alex.rivera@example.com")
        .unwrap()
        .unwrap();
    let contacts = SqliteContactRepository::try_new(&conn).unwrap();

    let alex_contacts = contacts
        .list_contacts(&ContactListQuery {
            user_id: Some(alex.id),
            ..ContactListQuery::default()
        })
        .unwrap();
    assert_eq!(alex_contacts.len(), 3);
    let counts = contacts.count_by_priority(alex.id).unwrap();
    assert!(counts.iter().all(|entry| entry.count == 1));

    let jordan = alex_contacts
        .iter()
        .find(|contact| contact.name == "Jordan Lee")
        .unwrap();
    assert_eq!(jordan.priority, Priority::High);
    assert!(jordan.last_contacted_at.is_some());

    let reminders = ReminderService::new(SqliteReminderRepository::try_new(&conn).unwrap());
    let overdue = reminders.list_overdue(alex.id, now_epoch_ms()).unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].title, "Check in about renewal");
}

#[test]
fn seeded_birthday_falls_on_midnight_utc() {
    let conn = open_db_in_memory().expect("open db");
    seed_sample_data(&conn).expect("seed");

    let birthdays: Vec<i64> = conn
        .prepare("SELECT birthday FROM contacts WHERE birthday IS NOT NULL;")
        .expect("prepare")
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("read birthdays");
    assert_eq!(birthdays.len(), 1);
    assert_eq!(birthdays[0].rem_euclid(24 * 60 * 60 * 1000), 0);
}

#[test]
fn seeding_twice_is_rejected_without_changes() {
    let conn = open_db_in_memory().unwrap();
    seed_sample_data(&conn).unwrap();

    let err = seed_sample_data(&conn).unwrap_err();
    assert!(matches!(err, SeedError::AlreadySeeded { existing_users: 2 }));
    assert_eq!(count(&conn, "contacts"), 5);
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

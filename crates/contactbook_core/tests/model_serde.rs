use contactbook_core::{
    Activity, ActivityType, Contact, Email, EmailProvider, Gender, ModelValidationError,
    Priority, Reminder, Tag,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn contact_serializes_with_camel_case_keys_and_screaming_enums() {
    let mut contact = Contact::new(Uuid::new_v4(), "Priya Patel");
    contact.linked_in_url = Some("https://www.linkedin.com/in/priya".to_string());
    contact.priority = Priority::High;
    contact.gender = Some(Gender::PreferNotToSay);
    contact.last_contacted_at = Some(1_000);

    let value = serde_json::to_value(&contact).unwrap();
    assert_eq!(value["userId"], json!(contact.user_id.to_string()));
    assert_eq!(value["linkedInUrl"], json!("https://www.linkedin.com/in/priya"));
    assert_eq!(value["priority"], json!("HIGH"));
    assert_eq!(value["gender"], json!("PREFER_NOT_TO_SAY"));
    assert_eq!(value["lastContactedAt"], json!(1_000));

    let decoded: Contact = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, contact);
}

#[test]
fn activity_kind_is_exposed_as_type() {
    let activity = Activity::new(Uuid::new_v4(), Uuid::new_v4(), ActivityType::EmailReceived);
    let value = serde_json::to_value(&activity).unwrap();

    assert_eq!(value["type"], json!("EMAIL_RECEIVED"));
    assert!(value.get("kind").is_none());
    assert!(value.get("occurredAt").is_some());
}

#[test]
fn contact_defaults_to_medium_priority() {
    let contact = Contact::new(Uuid::new_v4(), "Ada");
    assert_eq!(contact.priority, Priority::Medium);
    assert_eq!(contact.gender, None);
    assert!(contact.validate().is_ok());
}

#[test]
fn enum_storage_strings_parse_back() {
    for priority in Priority::ALL {
        assert_eq!(Priority::parse(priority.as_str()), Some(priority));
    }
    assert_eq!(EmailProvider::parse("SMTP"), Some(EmailProvider::Smtp));
    assert_eq!(EmailProvider::parse("smtp"), None);
    assert_eq!(ActivityType::parse("NOTE"), Some(ActivityType::Note));
    assert!(!ActivityType::Note.is_interaction());
    assert!(ActivityType::Meeting.is_interaction());
}

#[test]
fn email_tracking_cannot_precede_send_time() {
    let mut email = Email::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        EmailProvider::Gmail,
        "Subject",
        "Body",
    );
    email.sent_at = 5_000;
    email.clicked_at = Some(4_999);

    assert_eq!(
        email.validate().unwrap_err(),
        ModelValidationError::TimestampBeforeSent {
            field: "clickedAt",
            sent_at: 5_000,
            value: 4_999,
        }
    );
}

#[test]
fn contact_email_and_nil_ids_are_validated() {
    let mut contact = Contact::new(Uuid::new_v4(), "Ada");
    contact.email = Some("ada at example".to_string());
    assert!(matches!(
        contact.validate().unwrap_err(),
        ModelValidationError::InvalidEmail(_)
    ));

    let orphan = Contact::new(Uuid::nil(), "Ada");
    assert_eq!(
        orphan.validate().unwrap_err(),
        ModelValidationError::NilId("userId")
    );
}

#[test]
fn reminder_completion_flag_and_stamp_must_agree() {
    let mut reminder = Reminder::new(Uuid::new_v4(), Uuid::new_v4(), "Call", 1_000);
    reminder.completed_at = Some(2_000);
    assert_eq!(
        reminder.validate().unwrap_err(),
        ModelValidationError::CompletionMismatch { completed: false }
    );
}

#[test]
fn tag_name_is_trimmed_on_construction() {
    let tag = Tag::new(Uuid::new_v4(), "  Investor  ");
    assert_eq!(tag.name, "Investor");
    assert!(tag.validate().is_ok());
}

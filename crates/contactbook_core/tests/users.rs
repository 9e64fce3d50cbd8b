use contactbook_core::db::open_db_in_memory;
use contactbook_core::{
    RepoError, ServiceError, SignInRequest, SqliteUserRepository, User, UserListQuery,
    UserRepository, UserService,
};
use serde_json::json;

#[test]
fn create_get_and_find_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut user = User::new("auth-ada", "ada@example.com");
    user.name = Some("Ada Lovelace".to_string());
    user.settings = Some(json!({ "theme": "dark" }));
    repo.create_user(&user).unwrap();

    let loaded = repo.get_user(user.id).unwrap().unwrap();
    assert_eq!(loaded, user);

    let by_email = repo.find_by_email("ADA@example.com").unwrap().unwrap();
    assert_eq!(by_email.id, user.id);
    let by_auth = repo.find_by_supabase_id("auth-ada").unwrap().unwrap();
    assert_eq!(by_auth.id, user.id);
    assert!(repo.find_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn user_email_is_unique_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&User::new("auth-1", "alex@example.com"))
        .unwrap();
    let err = repo
        .create_user(&User::new("auth-2", "Alex@Example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation(_)));

    let err = repo
        .create_user(&User::new("auth-1", "other@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation(_)));
}

#[test]
fn invalid_user_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let err = repo
        .create_user(&User::new("auth-1", "not-an-email"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_users().unwrap(), 0);
}

#[test]
fn list_users_paginates_in_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let mut ids = Vec::new();
    for (index, email) in ["a@example.com", "b@example.com", "c@example.com"]
        .iter()
        .enumerate()
    {
        let mut user = User::new(format!("auth-{index}"), *email);
        user.created_at = 1_000 + index as i64;
        repo.create_user(&user).unwrap();
        ids.push(user.id);
    }

    let first_page = repo
        .list_users(&UserListQuery {
            limit: Some(2),
            offset: 0,
        })
        .unwrap();
    assert_eq!(
        first_page.iter().map(|user| user.id).collect::<Vec<_>>(),
        ids[..2].to_vec()
    );

    let second_page = repo
        .list_users(&UserListQuery {
            limit: Some(2),
            offset: 2,
        })
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].id, ids[2]);
}

#[test]
fn touch_last_login_and_delete_missing_user() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    let user = User::new("auth-1", "a@example.com");
    repo.create_user(&user).unwrap();

    repo.touch_last_login(user.id, 42_000).unwrap();
    assert_eq!(
        repo.get_user(user.id).unwrap().unwrap().last_login_at,
        Some(42_000)
    );

    repo.delete_user(user.id).unwrap();
    let err = repo.delete_user(user.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "user", .. }));
}

#[test]
fn sign_in_creates_then_updates_same_user() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());

    let mut request = SignInRequest::new("auth-sam", "sam@example.com");
    request.name = Some("Sam".to_string());
    request.provider = Some("google".to_string());
    let first = service.sign_in(&request).unwrap();
    assert!(first.last_login_at.is_some());
    assert_eq!(first.provider.as_deref(), Some("google"));

    let second_request = SignInRequest::new("auth-sam", "sam.chen@example.com");
    let second = service.sign_in(&second_request).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.email, "sam.chen@example.com");
    assert_eq!(second.name.as_deref(), Some("Sam"));

    let repo = SqliteUserRepository::try_new(&conn).unwrap();
    assert_eq!(repo.count_users().unwrap(), 1);
}

#[test]
fn update_settings_replaces_document_and_reports_missing_user() {
    let conn = open_db_in_memory().unwrap();
    let service = UserService::new(SqliteUserRepository::try_new(&conn).unwrap());
    let user = service
        .sign_in(&SignInRequest::new("auth-1", "a@example.com"))
        .unwrap();

    let updated = service
        .update_settings(user.id, json!({ "weeklyDigest": false }))
        .unwrap();
    assert_eq!(updated.settings, Some(json!({ "weeklyDigest": false })));

    let err = service
        .update_settings(uuid::Uuid::new_v4(), json!({}))
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound { entity: "user", .. }));
}

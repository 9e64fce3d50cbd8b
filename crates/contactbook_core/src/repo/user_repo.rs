//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and unique-key lookups over `users`.
//!
//! # Invariants
//! - `supabase_id` and `email` lookups hit unique columns; at most one row
//!   matches. Email comparison is case-insensitive.
//! - Deleting a user cascades to every record the user owns.

use crate::model::user::{User, UserId};
use crate::model::EpochMillis;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::push_pagination;
use crate::repo::sqlite_support::{
    ensure_connection_ready, json_column, json_to_db, uuid_column,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    supabase_id,
    email,
    name,
    profile_picture,
    provider,
    settings,
    last_login_at,
    created_at,
    updated_at
FROM users";

const USER_COLUMNS: &[&str] = &[
    "id",
    "supabase_id",
    "email",
    "name",
    "profile_picture",
    "provider",
    "settings",
    "last_login_at",
    "created_at",
    "updated_at",
];

/// Pagination options for listing users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    fn find_by_supabase_id(&self, supabase_id: &str) -> RepoResult<Option<User>>;
    /// Lists users ordered by creation time.
    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>>;
    /// Overwrites every mutable column and bumps `updated_at`.
    fn update_user(&self, user: &User) -> RepoResult<()>;
    fn touch_last_login(&self, id: UserId, at: EpochMillis) -> RepoResult<()>;
    fn delete_user(&self, id: UserId) -> RepoResult<()>;
    fn count_users(&self) -> RepoResult<u64>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[("users", USER_COLUMNS)])?;
        Ok(Self { conn })
    }

    fn find_one(&self, column: &str, value: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE {column} = ?1;"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        user.validate()?;

        self.conn.execute(
            "INSERT INTO users (
                id,
                supabase_id,
                email,
                name,
                profile_picture,
                provider,
                settings,
                last_login_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                user.id.to_string(),
                user.supabase_id.trim(),
                user.email.trim(),
                user.name.as_deref(),
                user.profile_picture.as_deref(),
                user.provider.as_deref(),
                json_to_db(user.settings.as_ref()),
                user.last_login_at,
                user.created_at,
                user.updated_at,
            ],
        )?;

        Ok(user.id)
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        self.find_one("id", &id.to_string())
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        self.find_one("email", email.trim())
    }

    fn find_by_supabase_id(&self, supabase_id: &str) -> RepoResult<Option<User>> {
        self.find_one("supabase_id", supabase_id.trim())
    }

    fn list_users(&self, query: &UserListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} ORDER BY created_at ASC, id ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        push_pagination(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn update_user(&self, user: &User) -> RepoResult<()> {
        user.validate()?;

        let changed = self.conn.execute(
            "UPDATE users
             SET
                supabase_id = ?1,
                email = ?2,
                name = ?3,
                profile_picture = ?4,
                provider = ?5,
                settings = ?6,
                last_login_at = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                user.supabase_id.trim(),
                user.email.trim(),
                user.name.as_deref(),
                user.profile_picture.as_deref(),
                user.provider.as_deref(),
                json_to_db(user.settings.as_ref()),
                user.last_login_at,
                user.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("user", user.id));
        }
        Ok(())
    }

    fn touch_last_login(&self, id: UserId, at: EpochMillis) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE users
             SET
                last_login_at = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2;",
            params![at, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }

    fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", id));
        }
        Ok(())
    }

    fn count_users(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let user = User {
        id: uuid_column(row, "id", "users.id")?,
        supabase_id: row.get("supabase_id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        profile_picture: row.get("profile_picture")?,
        provider: row.get("provider")?,
        settings: json_column(row, "settings", "users.settings")?,
        last_login_at: row.get("last_login_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    user.validate()?;
    Ok(user)
}

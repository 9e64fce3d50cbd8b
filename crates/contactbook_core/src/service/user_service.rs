//! User account use-case service.
//!
//! # Responsibility
//! - Map external auth sign-ins onto local user rows.
//! - Keep per-user settings updates behind one entry point.
//!
//! # Invariants
//! - One local user per `supabase_id`; repeated sign-ins update in place.
//! - `last_login_at` is refreshed on every sign-in.

use crate::model::now_epoch_ms;
use crate::model::user::{User, UserId};
use crate::repo::user_repo::UserRepository;
use crate::service::{ServiceError, ServiceResult};
use log::info;
use serde_json::Value as JsonValue;

/// Identity claims received from the auth provider on sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub supabase_id: String,
    pub email: String,
    pub name: Option<String>,
    pub profile_picture: Option<String>,
    pub provider: Option<String>,
}

impl SignInRequest {
    pub fn new(supabase_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            supabase_id: supabase_id.into(),
            email: email.into(),
            name: None,
            profile_picture: None,
            provider: None,
        }
    }
}

/// User service facade over repository implementations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates the user on first sign-in, otherwise refreshes profile fields.
    ///
    /// Profile fields absent from the request keep their stored values.
    pub fn sign_in(&self, request: &SignInRequest) -> ServiceResult<User> {
        let now = now_epoch_ms();
        let user_id = match self.repo.find_by_supabase_id(&request.supabase_id)? {
            Some(mut user) => {
                user.email = request.email.trim().to_string();
                if request.name.is_some() {
                    user.name = request.name.clone();
                }
                if request.profile_picture.is_some() {
                    user.profile_picture = request.profile_picture.clone();
                }
                if request.provider.is_some() {
                    user.provider = request.provider.clone();
                }
                user.last_login_at = Some(now);
                self.repo.update_user(&user)?;
                info!(
                    "event=user_sign_in module=service status=ok user_id={} first_login=false",
                    user.id
                );
                user.id
            }
            None => {
                let mut user = User::new(request.supabase_id.trim(), request.email.trim());
                user.name = request.name.clone();
                user.profile_picture = request.profile_picture.clone();
                user.provider = request.provider.clone();
                user.last_login_at = Some(now);
                let id = self.repo.create_user(&user)?;
                info!(
                    "event=user_sign_in module=service status=ok user_id={} first_login=true",
                    id
                );
                id
            }
        };

        self.read_back(user_id, "signed-in user not found in read-back")
    }

    pub fn get_user(&self, id: UserId) -> ServiceResult<Option<User>> {
        Ok(self.repo.get_user(id)?)
    }

    /// Replaces the free-form settings document of a user.
    pub fn update_settings(&self, id: UserId, settings: JsonValue) -> ServiceResult<User> {
        let mut user = self
            .repo
            .get_user(id)?
            .ok_or(ServiceError::NotFound { entity: "user", id })?;
        user.settings = Some(settings);
        self.repo.update_user(&user)?;
        self.read_back(id, "user missing after settings update")
    }

    /// Deletes a user and, through cascading keys, everything they own.
    pub fn delete_user(&self, id: UserId) -> ServiceResult<()> {
        self.repo.delete_user(id)?;
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(())
    }

    fn read_back(&self, id: UserId, details: &'static str) -> ServiceResult<User> {
        self.repo
            .get_user(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}

use axum::http::HeaderMap;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::session::{session_token, session_ttl, SessionUser};
use super::AuthError;
use crate::store::{Store, StoreError, UserRecord};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordChangeForm {
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Account and session operations over the store.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Store,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(store: Store, secure_cookies: bool) -> Self {
        Self {
            store,
            secure_cookies,
        }
    }

    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }

    pub async fn register(&self, form: &RegistrationForm) -> Result<UserRecord, AuthError> {
        let username = form.username.trim();
        if username.is_empty() {
            return Err(AuthError::BlankUsername);
        }
        if form.password.is_empty() {
            return Err(AuthError::BlankPassword);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let hash = hash_password(&form.password)?;
        let user = match self
            .store
            .create_user(username, form.email.trim(), &hash)
            .await
        {
            Ok(user) => user,
            Err(StoreError::Conflict) => return Err(AuthError::UsernameTaken),
            Err(other) => return Err(other.into()),
        };

        info!(user_id = user.id, username = %user.username, "registered user");
        Ok(user)
    }

    /// Verifies credentials and opens a session, returning its token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .user_by_username(username.trim())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = Uuid::new_v4().to_string();
        self.store.create_session(user.id, &token).await?;
        info!(user_id = user.id, "user logged in");
        Ok(token)
    }

    pub async fn logout(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        if let Some(token) = session_token(headers) {
            self.store.delete_session(&token).await?;
        }
        Ok(())
    }

    /// The user behind the request's session cookie, if it is live.
    pub async fn current_user(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, AuthError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let not_before = Utc::now() - session_ttl();
        let session = self.store.session(&token, not_before).await?;
        Ok(session.map(|record| SessionUser {
            user_id: record.user_id,
            username: record.username,
            token: record.token,
            draft: record.draft,
        }))
    }

    /// Updates the hash and ends every session the user holds.
    pub async fn change_password(
        &self,
        user: &SessionUser,
        form: &PasswordChangeForm,
    ) -> Result<(), AuthError> {
        if form.password.is_empty() {
            return Err(AuthError::BlankPassword);
        }
        if form.password != form.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        let hash = hash_password(&form.password)?;
        self.store.update_password_hash(user.user_id, &hash).await?;
        let ended = self.store.delete_sessions_for(user.user_id).await?;
        info!(user_id = user.user_id, sessions_ended = ended, "password changed");
        Ok(())
    }
}

//! Registration, login, and cookie-backed sessions.

pub mod pages;
pub mod password;
pub mod router;
pub mod service;
pub mod session;

pub use router::auth_router;
pub use service::{AuthService, LoginForm, PasswordChangeForm, RegistrationForm};
pub use session::SessionUser;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username is required")]
    BlankUsername,
    #[error("Password is required")]
    BlankPassword,
    #[error("The two passwords do not match")]
    PasswordMismatch,
    #[error("That username is already taken")]
    UsernameTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("{0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    /// Errors caused by user input, shown back on the form.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, AuthError::Hash(_) | AuthError::Store(_))
    }
}

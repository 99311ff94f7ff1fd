use axum::http::HeaderMap;
use chrono::Duration;

use crate::survey::drafts::DraftAnswers;
use crate::web::cookies;

pub const SESSION_COOKIE: &str = "sid";

/// Sessions older than this are ignored and must log in again.
pub const SESSION_TTL_DAYS: i64 = 14;

pub fn session_ttl() -> Duration {
    Duration::days(SESSION_TTL_DAYS)
}

/// The authenticated user behind a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub draft: DraftAnswers,
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookies::read(headers, SESSION_COOKIE).filter(|token| !token.is_empty())
}

pub fn session_cookie(token: &str, secure: bool) -> String {
    cookies::set(
        SESSION_COOKIE,
        token,
        Some(session_ttl().num_seconds()),
        secure,
    )
}

pub fn clear_session_cookie() -> String {
    cookies::clear(SESSION_COOKIE)
}

/// Login URL that returns the user to `path` afterwards.
pub fn login_redirect_target(path: &str) -> String {
    format!("/users/login?next={}", urlencoding::encode(path))
}

/// Only same-site absolute paths are honoured as post-login targets.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/",
    }
}

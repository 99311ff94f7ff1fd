use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::warn;

use super::pages;
use super::service::{AuthService, LoginForm, PasswordChangeForm, RegistrationForm};
use super::session::{clear_session_cookie, login_redirect_target, safe_next, session_cookie, SessionUser};
use super::AuthError;
use crate::web::respond::{self, page, page_with_status, redirect, redirect_with_flash, server_error};
use crate::web::{Flash, PageContext};

/// Router for the `/users/*` account pages.
pub fn auth_router(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/users/register", get(register_page).post(register_submit))
        .route("/users/login", get(login_page).post(login_submit))
        .route("/users/logout", get(logout))
        .route("/users/password", get(password_page).post(password_submit))
        .with_state(service)
}

/// Resolves the session user or produces the redirect to the login page.
pub async fn require_user(
    auth: &AuthService,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<SessionUser, Response> {
    match auth.current_user(headers).await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => {
            let target = uri
                .path_and_query()
                .map(|value| value.as_str())
                .unwrap_or_else(|| uri.path());
            Err(redirect(&login_redirect_target(target)))
        }
        Err(err) => Err(server_error("session lookup failed", &err)),
    }
}

/// Page context for an optional session; lookup failures render as anonymous.
pub async fn page_context(auth: &AuthService, headers: &HeaderMap) -> PageContext {
    let username = match auth.current_user(headers).await {
        Ok(user) => user.map(|user| user.username),
        Err(err) => {
            warn!(error = %err, "session lookup failed");
            None
        }
    };
    PageContext::new(username, Flash::from_headers(headers))
}

pub(crate) async fn register_page(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    let context = page_context(&auth, &headers).await;
    page("Register", &context, &pages::register_form(None, "", ""))
}

pub(crate) async fn register_submit(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    Form(form): Form<RegistrationForm>,
) -> Response {
    match auth.register(&form).await {
        Ok(_) => redirect_with_flash(
            "/users/login",
            &Flash::success("Registration complete, please log in"),
            auth.secure_cookies(),
        ),
        Err(err) if err.is_user_facing() => {
            let context = page_context(&auth, &headers).await;
            let body = pages::register_form(Some(&err.to_string()), &form.username, &form.email);
            page_with_status(StatusCode::UNPROCESSABLE_ENTITY, "Register", &context, &body)
        }
        Err(err) => server_error("registration failed", &err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoginQuery {
    next: Option<String>,
}

pub(crate) async fn login_page(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let context = page_context(&auth, &headers).await;
    page(
        "Log in",
        &context,
        &pages::login_form(None, "", query.next.as_deref()),
    )
}

pub(crate) async fn login_submit(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth.login(&form.username, &form.password).await {
        Ok(token) => {
            let target = safe_next(form.next.as_deref());
            let response = redirect_with_flash(
                target,
                &Flash::success("Logged in"),
                auth.secure_cookies(),
            );
            respond::with_cookie(response, &session_cookie(&token, auth.secure_cookies()))
        }
        Err(err) if err.is_user_facing() => {
            let context = page_context(&auth, &headers).await;
            let body = pages::login_form(
                Some(&err.to_string()),
                &form.username,
                form.next.as_deref(),
            );
            page_with_status(StatusCode::UNAUTHORIZED, "Log in", &context, &body)
        }
        Err(err) => server_error("login failed", &err),
    }
}

pub(crate) async fn logout(State(auth): State<Arc<AuthService>>, headers: HeaderMap) -> Response {
    if let Err(err) = auth.logout(&headers).await {
        return server_error("logout failed", &err);
    }
    let response = redirect_with_flash(
        "/users/login",
        &Flash::info("You have been logged out"),
        auth.secure_cookies(),
    );
    respond::with_cookie(response, &clear_session_cookie())
}

pub(crate) async fn password_page(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let user = match require_user(&auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };
    let context = PageContext::new(Some(user.username), Flash::from_headers(&headers));
    page("Change password", &context, &pages::password_form(None))
}

pub(crate) async fn password_submit(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
    uri: Uri,
    Form(form): Form<PasswordChangeForm>,
) -> Response {
    let user = match require_user(&auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match auth.change_password(&user, &form).await {
        Ok(()) => {
            let response = redirect_with_flash(
                "/users/login",
                &Flash::success("Password changed, please log in again"),
                auth.secure_cookies(),
            );
            respond::with_cookie(response, &clear_session_cookie())
        }
        Err(err @ (AuthError::BlankPassword | AuthError::PasswordMismatch)) => {
            let context = PageContext::new(Some(user.username), None);
            let body = pages::password_form(Some(&err.to_string()));
            page_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Change password",
                &context,
                &body,
            )
        }
        Err(err) => server_error("password change failed", &err),
    }
}

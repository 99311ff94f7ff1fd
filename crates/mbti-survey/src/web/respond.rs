use std::fmt::Display;

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{error, warn};

use super::flash::{Flash, FLASH_COOKIE};
use super::layout::{render_page, PageContext};
use super::cookies;

/// Appends a `Set-Cookie` header; values that are not valid header text are
/// dropped with a warning.
pub fn with_cookie(mut response: Response, cookie: &str) -> Response {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        Err(err) => warn!(%err, "dropping unencodable cookie"),
    }
    response
}

pub fn redirect(location: &str) -> Response {
    Redirect::to(location).into_response()
}

pub fn redirect_with_flash(location: &str, flash: &Flash, secure: bool) -> Response {
    with_cookie(redirect(location), &flash.set_cookie(secure))
}

/// Renders a full page. A flash shown on this page is cleared from the browser.
pub fn page(title: &str, context: &PageContext, body: &str) -> Response {
    page_with_status(StatusCode::OK, title, context, body)
}

pub fn page_with_status(
    status: StatusCode,
    title: &str,
    context: &PageContext,
    body: &str,
) -> Response {
    let response = (status, Html(render_page(title, context, body))).into_response();
    if context.flash.is_some() {
        with_cookie(response, &cookies::clear(FLASH_COOKIE))
    } else {
        response
    }
}

/// Logs the failure and renders a plain 500 page.
pub fn server_error(context: &str, err: &dyn Display) -> Response {
    error!(error = %err, "{context}");
    let body = "<h1>Something went wrong</h1><p>The request could not be completed. Please try again later.</p>";
    page_with_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Error",
        &PageContext::default(),
        body,
    )
}

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::pages;
use super::service::{SurveyError, SurveyService};
use crate::auth::router::{page_context, require_user};
use crate::auth::AuthService;
use crate::web::respond::{page, redirect, redirect_with_flash, server_error};
use crate::web::{Flash, PageContext};

#[derive(Clone)]
pub struct SurveyState {
    pub survey: Arc<SurveyService>,
    pub auth: Arc<AuthService>,
}

impl SurveyState {
    pub fn new(survey: Arc<SurveyService>, auth: Arc<AuthService>) -> Self {
        Self { survey, auth }
    }

    fn secure(&self) -> bool {
        self.auth.secure_cookies()
    }
}

/// Router for the home page, the test flow, and result pages.
pub fn survey_router(state: SurveyState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/test", get(test_page))
        .route("/save-progress", post(save_progress))
        .route("/submit", get(submit_redirect).post(submit))
        .route("/result", get(result_page))
        .route("/result/pdf", get(result_pdf))
        .with_state(state)
}

pub(crate) async fn home(State(state): State<SurveyState>, headers: HeaderMap) -> Response {
    let context = page_context(&state.auth, &headers).await;
    let body = pages::home(context.username.as_deref());
    page("Home", &context, &body)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TestQuery {
    page: Option<String>,
}

pub(crate) async fn test_page(
    State(state): State<SurveyState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<TestQuery>,
) -> Response {
    let user = match require_user(&state.auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.survey.test_page(&user, query.page.as_deref()).await {
        Ok(test) => {
            let context = PageContext::new(Some(user.username), Flash::from_headers(&headers));
            page("Test", &context, &pages::test_page(&test))
        }
        Err(err @ SurveyError::NoQuestions) => {
            redirect_with_flash("/", &Flash::error(err.to_string()), state.secure())
        }
        Err(err) => server_error("failed to load test page", &err),
    }
}

pub(crate) async fn save_progress(
    State(state): State<SurveyState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    let user = match require_user(&state.auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let answers = match progress_answers(&body) {
        Ok(answers) => answers,
        Err(message) => return progress_error(StatusCode::BAD_REQUEST, &message),
    };

    match state.survey.save_progress(&user, &answers).await {
        Ok(saved) => Json(json!({ "status": "success", "saved": saved })).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to save progress");
            progress_error(StatusCode::INTERNAL_SERVER_ERROR, "could not save progress")
        }
    }
}

/// Extracts the `answers` object; a payload without one saves nothing.
fn progress_answers(body: &[u8]) -> Result<Map<String, Value>, String> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|err| format!("invalid JSON payload: {err}"))?;
    match payload.get("answers") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(answers)) => Ok(answers.clone()),
        Some(_) => Err("answers must be an object".to_string()),
    }
}

fn progress_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}

pub(crate) async fn submit_redirect() -> Response {
    redirect("/test")
}

pub(crate) async fn submit(
    State(state): State<SurveyState>,
    headers: HeaderMap,
    uri: Uri,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let user = match require_user(&state.auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.survey.submit(&user, &form).await {
        Ok(_) => redirect_with_flash(
            "/result",
            &Flash::success("Submitted! Here is your result"),
            state.secure(),
        ),
        Err(err @ SurveyError::Incomplete { .. }) => {
            redirect_with_flash("/test", &Flash::error(err.to_string()), state.secure())
        }
        Err(err @ SurveyError::NoQuestions) => {
            redirect_with_flash("/", &Flash::error(err.to_string()), state.secure())
        }
        Err(err) => server_error("failed to submit answers", &err),
    }
}

pub(crate) async fn result_page(
    State(state): State<SurveyState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let user = match require_user(&state.auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.survey.result_page(&user).await {
        Ok(result) => {
            let context = PageContext::new(Some(user.username), Flash::from_headers(&headers));
            let body = match result {
                Some(result) => pages::result_page(&result),
                None => pages::no_result(),
            };
            page("Result", &context, &body)
        }
        Err(err) => server_error("failed to load result", &err),
    }
}

pub(crate) async fn result_pdf(
    State(state): State<SurveyState>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    let user = match require_user(&state.auth, &headers, &uri).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.survey.pdf(&user).await {
        Ok(report) => {
            let disposition = format!("attachment; filename=\"{}\"", report.filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                report.bytes,
            )
                .into_response()
        }
        Err(SurveyError::NoResult) => redirect("/test"),
        Err(SurveyError::Export(err)) => redirect_with_flash(
            "/result",
            &Flash::error(format!("Could not generate the PDF report. {err}")),
            state.secure(),
        ),
        Err(err) => server_error("failed to export result", &err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_payload_variants() {
        let answers = progress_answers(br#"{"answers":{"q_1":"3","q_2":4}}"#).expect("valid");
        assert_eq!(answers.len(), 2);

        assert!(progress_answers(br#"{}"#).expect("valid").is_empty());
        assert!(progress_answers(br#"{"answers":[1,2]}"#).is_err());
        assert!(progress_answers(b"not json").is_err());
    }
}

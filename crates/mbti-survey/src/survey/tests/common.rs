use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::auth::{auth_router, AuthService, SessionUser};
use crate::config::ExportConfig;
use crate::report::ReportExporter;
use crate::store::Store;
use crate::survey::domain::{Dimension, Pole, Question, QuestionDraft, Questionnaire};
use crate::survey::{survey_router, SurveyService, SurveyState};

pub(super) async fn empty_store() -> Store {
    Store::in_memory().await.expect("in-memory store")
}

/// Active questionnaire whose questions cycle through the four dimensions,
/// each keyed toward the second letter.
pub(super) async fn seeded_store(count: usize) -> (Store, Questionnaire, Vec<Question>) {
    let store = empty_store().await;
    let questionnaire = seed_questionnaire(&store, "core", count).await;
    store
        .activate_questionnaire(questionnaire.id)
        .await
        .expect("activate");
    let questions = store
        .active_questions(Some(questionnaire.id))
        .await
        .expect("questions");
    (store, questionnaire, questions)
}

pub(super) async fn seed_questionnaire(store: &Store, key: &str, count: usize) -> Questionnaire {
    let questionnaire = store
        .upsert_questionnaire(key, &format!("Questionnaire {key}"), "")
        .await
        .expect("questionnaire");
    for index in 0..count {
        let dimension = Dimension::ALL[index % Dimension::ALL.len()];
        let letter = dimension.letter(Pole::Second).to_string();
        let draft = QuestionDraft::new(
            &format!("{key} statement {}", index + 1),
            dimension.code(),
            &letter,
            1,
            index as i32 + 1,
        )
        .expect("valid draft");
        store
            .upsert_question(questionnaire.id, &draft)
            .await
            .expect("question");
    }
    questionnaire
}

/// Creates a user with an open session, bypassing password hashing.
pub(super) async fn session_user(store: &Store, username: &str) -> SessionUser {
    let user = store
        .create_user(username, "", "unused-hash")
        .await
        .expect("user");
    let token = format!("token-{username}");
    store
        .create_session(user.id, &token)
        .await
        .expect("session");
    reload(store, &token).await
}

/// Re-reads a session so its draft reflects what is stored.
pub(super) async fn reload(store: &Store, token: &str) -> SessionUser {
    let epoch = Utc.timestamp_opt(0, 0).single().expect("epoch");
    let record = store
        .session(token, epoch)
        .await
        .expect("session lookup")
        .expect("session exists");
    SessionUser {
        user_id: record.user_id,
        username: record.username,
        token: record.token,
        draft: record.draft,
    }
}

pub(super) fn exporter() -> ReportExporter {
    ReportExporter::new(&ExportConfig {
        pandoc_path: PathBuf::from("/nonexistent/pandoc-for-tests"),
        timeout: Duration::from_secs(5),
    })
}

pub(super) fn survey_service(store: &Store) -> SurveyService {
    SurveyService::new(store.clone(), exporter())
}

pub(super) fn router(store: &Store) -> axum::Router {
    let auth = Arc::new(AuthService::new(store.clone(), false));
    let survey = Arc::new(survey_service(store));
    survey_router(SurveyState::new(survey, auth.clone())).merge(auth_router(auth))
}

pub(super) fn answers_for(questions: &[Question], choice: &str) -> HashMap<String, String> {
    questions
        .iter()
        .map(|question| (question.form_key(), choice.to_string()))
        .collect()
}

pub(super) fn form_body(fields: &[(String, String)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub(super) fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub(super) fn post_form(uri: &str, cookie: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::post(uri).header(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
    );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).expect("request")
}

pub(super) fn post_json(uri: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub(super) fn session_cookie(user: &SessionUser) -> String {
    format!("sid={}", user.token)
}

pub(super) fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .expect("location header")
}

/// Value of the named cookie among the response's `Set-Cookie` headers.
pub(super) fn set_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

pub(super) async fn read_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) async fn read_json_body(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

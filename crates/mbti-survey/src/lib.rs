pub mod auth;
pub mod config;
pub mod error;
pub mod report;
pub mod store;
pub mod survey;
pub mod telemetry;
pub mod web;

use std::sync::Arc;

use axum::Router;

use auth::AuthService;
use config::AppConfig;
use report::ReportExporter;
use store::Store;
use survey::{SurveyService, SurveyState};

/// Page routers for the survey and account flows over one store.
pub fn application_router(store: Store, config: &AppConfig) -> Router {
    let auth = Arc::new(AuthService::new(
        store.clone(),
        config.session.secure_cookies,
    ));
    let survey = Arc::new(SurveyService::new(
        store,
        ReportExporter::new(&config.export),
    ));

    survey::survey_router(SurveyState::new(survey, auth.clone())).merge(auth::auth_router(auth))
}

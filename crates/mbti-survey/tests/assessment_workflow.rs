//! End-to-end assessment scenarios: seed a question bank from CSV, register and
//! log in through the HTTP router, answer across pages, and read the result.

mod common {
    use std::path::PathBuf;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, Response};

    use mbti_survey::config::{
        AppConfig, AppEnvironment, DatabaseConfig, ExportConfig, ServerConfig, SessionConfig,
        TelemetryConfig,
    };

    pub(super) const QUESTIONS_CSV: &str = "text,dimension,keyed_pole,weight,order\n\
        I recharge by spending time with friends,EI,E,1,1\n\
        I prefer a quiet evening with a book,IE,I,1,2\n\
        I notice small details others miss,SN,S,1,3\n\
        I enjoy imagining future possibilities,SN,N,1,4\n\
        I decide with my head rather than my heart,TF,T,1,5\n\
        I weigh how decisions affect people,TF,F,2,6\n\
        I like to plan my week in advance,JP,J,1,7\n\
        I keep my options open as long as possible,JP,P,1,8\n\
        I make friends easily at parties,IE,E,1,9\n\
        I trust proven methods over new ideas,SN,S,1,10\n\
        I value honesty over tact,TF,T,1,11\n\
        I finish tasks well before deadlines,JP,J,1,12\n\
        ,IE,E,1,13\n\
        This row has a broken pole,TF,X,1,14\n";

    pub(super) fn config(database_url: String) -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "warn".to_string(),
            },
            database: DatabaseConfig { url: database_url },
            export: ExportConfig {
                pandoc_path: PathBuf::from("/nonexistent/pandoc"),
                timeout: Duration::from_secs(5),
            },
            session: SessionConfig {
                secure_cookies: false,
            },
        }
    }

    pub(super) fn form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
        let body = fields
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        let mut builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body)).expect("request")
    }

    pub(super) fn json(uri: &str, cookie: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, cookie)
            .body(Body::from(body))
            .expect("request")
    }

    pub(super) fn get(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .expect("request")
    }

    pub(super) fn location(response: &Response<Body>) -> String {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    pub(super) fn session_cookie(response: &Response<Body>) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .find(|pair| pair.starts_with("sid="))
            .map(str::to_string)
    }

    pub(super) async fn text(response: Response<Body>) -> String {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("read body");
        String::from_utf8(body.to_vec()).expect("utf-8")
    }
}

use axum::http::StatusCode;
use common::*;
use mbti_survey::store::Store;
use mbti_survey::survey::seed::{
    import_questions, parse_questions, seed_default_profiles, DEFAULT_QUESTIONNAIRE_KEY,
    DEFAULT_QUESTIONNAIRE_NAME,
};
use tower::ServiceExt;

#[tokio::test]
async fn seeded_bank_is_answered_across_pages_and_scored() {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("survey.db").display());
    let store = Store::connect(&url).await.expect("file-backed store");

    let (drafts, skipped) = parse_questions(QUESTIONS_CSV.as_bytes()).expect("csv parses");
    assert_eq!(drafts.len(), 12);
    assert_eq!(skipped.len(), 2);
    let (questionnaire, summary) = import_questions(
        &store,
        DEFAULT_QUESTIONNAIRE_KEY,
        DEFAULT_QUESTIONNAIRE_NAME,
        "",
        &drafts,
        skipped.len(),
    )
    .await
    .expect("import");
    assert_eq!(summary.created, 12);
    assert_eq!(summary.skipped, 2);
    assert!(questionnaire.name.contains("balanced"));

    let seeded = seed_default_profiles(&store).await.expect("profiles");
    assert_eq!(seeded.created, 16);

    let router = mbti_survey::application_router(store.clone(), &config(url));

    let response = router
        .clone()
        .oneshot(form(
            "/users/register",
            None,
            &[
                ("username", "grace"),
                ("email", "grace@example.com"),
                ("password", "hopper-1906"),
                ("confirm_password", "hopper-1906"),
            ],
        ))
        .await
        .expect("register");
    assert_eq!(location(&response), "/users/login");

    let response = router
        .clone()
        .oneshot(form(
            "/users/login",
            None,
            &[("username", "grace"), ("password", "hopper-1906")],
        ))
        .await
        .expect("login");
    assert_eq!(location(&response), "/");
    let cookie = session_cookie(&response).expect("session cookie");

    let first_page = text(
        router
            .clone()
            .oneshot(get("/test", &cookie))
            .await
            .expect("page one"),
    )
    .await;
    assert!(first_page.contains("Page 1 of 2"));
    assert!(first_page.contains("I recharge by spending time with friends"));

    let questions = store
        .active_questions(Some(questionnaire.id))
        .await
        .expect("questions");

    // Page one autosaved: strongly agree with every statement.
    let answers: serde_json::Map<String, serde_json::Value> = questions[..10]
        .iter()
        .map(|question| (question.form_key(), serde_json::Value::from("5")))
        .collect();
    let response = router
        .clone()
        .oneshot(json(
            "/save-progress",
            &cookie,
            serde_json::json!({ "answers": answers }).to_string(),
        ))
        .await
        .expect("autosave");
    assert_eq!(response.status(), StatusCode::OK);

    // Page two posted with the submit form.
    let last_two: Vec<(String, String)> = questions[10..]
        .iter()
        .map(|question| (question.form_key(), "5".to_string()))
        .collect();
    let fields: Vec<(&str, &str)> = last_two
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    let response = router
        .clone()
        .oneshot(form("/submit", Some(&cookie), &fields))
        .await
        .expect("submit");
    assert_eq!(location(&response), "/result");

    // IE: E+2, I-2, E+2 -> +2 (E). SN: S-2, N+2, S-2 -> -2 (S).
    // TF: T-2, F+4, T-2 -> 0 (T). JP: J-2, P+2, J-2 -> -2 (J).
    let result = store
        .result_for(1)
        .await
        .expect("lookup")
        .expect("result stored");
    assert_eq!(result.type_code.as_str(), "ESTJ");

    let page = text(
        router
            .clone()
            .oneshot(get("/result", &cookie))
            .await
            .expect("result page"),
    )
    .await;
    assert!(page.contains("Your type: ESTJ"));
    assert!(page.contains("Executive"));
    assert!(page.contains("MBTI Personality Report"));

    let response = router
        .oneshot(get("/result/pdf", &cookie))
        .await
        .expect("pdf");
    assert_eq!(location(&response), "/result");
}

#[tokio::test]
async fn reimporting_the_bank_updates_instead_of_duplicating() {
    let store = Store::in_memory().await.expect("store");
    let (drafts, _) = parse_questions(QUESTIONS_CSV.as_bytes()).expect("csv parses");

    import_questions(&store, "bank", "Bank", "", &drafts, 0)
        .await
        .expect("first import");
    let (questionnaire, summary) = import_questions(&store, "bank", "Bank", "", &drafts, 0)
        .await
        .expect("second import");

    assert_eq!(summary.created, 0);
    assert_eq!(summary.updated, 12);
    assert!(questionnaire.is_active);
    assert_eq!(
        store
            .active_questions(Some(questionnaire.id))
            .await
            .expect("questions")
            .len(),
        12
    );
}

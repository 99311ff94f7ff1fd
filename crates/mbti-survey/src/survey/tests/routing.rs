use super::common::*;
use axum::http::StatusCode;
use tower::ServiceExt;

use crate::auth::AuthError;
use crate::web::Flash;

#[tokio::test]
async fn anonymous_requests_redirect_to_login() {
    let store = empty_store().await;
    let router = router(&store);

    for uri in ["/test?page=2", "/result", "/result/pdf", "/users/password"] {
        let response = router.clone().oneshot(get(uri, None)).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        let expected = format!("/users/login?next={}", urlencoding::encode(uri));
        assert_eq!(location(&response), expected);
    }

    let response = router
        .clone()
        .oneshot(post_json("/save-progress", None, r#"{"answers":{}}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn unknown_session_token_is_anonymous() {
    let store = empty_store().await;
    let response = router(&store)
        .oneshot(get("/test", Some("sid=forged")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn home_page_renders_for_everyone() {
    let store = empty_store().await;
    let response = router(&store).oneshot(get("/", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = read_text(response).await;
    assert!(html.contains("MBTI Personality Test"));
}

#[tokio::test]
async fn test_page_lists_questions_for_session_user() {
    let (store, _, questions) = seeded_store(12).await;
    let user = session_user(&store, "alice").await;

    let response = router(&store)
        .oneshot(get("/test?page=2", Some(&session_cookie(&user))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = read_text(response).await;
    assert!(html.contains(&questions[10].text));
    assert!(!html.contains(&format!("{}<", questions[0].text)));
    assert!(html.contains("Page 2 of 2"));
}

#[tokio::test]
async fn test_page_without_questions_flashes_and_redirects_home() {
    let store = empty_store().await;
    let user = session_user(&store, "alice").await;

    let response = router(&store)
        .oneshot(get("/test", Some(&session_cookie(&user))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let flash = set_cookie(&response, "flash").expect("flash cookie");
    assert!(Flash::decode(&flash).expect("decodes").message.contains("No test questions"));
}

#[tokio::test]
async fn save_progress_returns_status_json() {
    let (store, _, questions) = seeded_store(4).await;
    let user = session_user(&store, "alice").await;
    let router = router(&store);
    let cookie = session_cookie(&user);

    let body = format!(r#"{{"answers":{{"{}":"3"}}}}"#, questions[0].form_key());
    let response = router
        .clone()
        .oneshot(post_json("/save-progress", Some(&cookie), &body))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "success");

    let response = router
        .oneshot(post_json("/save-progress", Some(&cookie), "{not json"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert_eq!(payload["status"], "error");

    let user = reload(&store, &user.token).await;
    assert_eq!(user.draft.len(), 1);
}

#[tokio::test]
async fn get_submit_redirects_to_test() {
    let store = empty_store().await;
    let response = router(&store).oneshot(get("/submit", None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/test");
}

#[tokio::test]
async fn incomplete_submit_redirects_back_with_count() {
    let (store, _, questions) = seeded_store(4).await;
    let user = session_user(&store, "alice").await;

    let fields = vec![(questions[0].form_key(), "4".to_string())];
    let response = router(&store)
        .oneshot(post_form("/submit", Some(&session_cookie(&user)), form_body(&fields)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/test");
    let flash = Flash::decode(&set_cookie(&response, "flash").expect("flash")).expect("decodes");
    assert!(flash.message.starts_with("3 question(s) still unanswered"));
}

#[tokio::test]
async fn complete_submit_then_result_page() {
    let (store, _, questions) = seeded_store(4).await;
    let user = session_user(&store, "alice").await;
    let router = router(&store);
    let cookie = session_cookie(&user);

    let fields: Vec<(String, String)> = questions
        .iter()
        .map(|question| (question.form_key(), "5".to_string()))
        .collect();
    let response = router
        .clone()
        .oneshot(post_form("/submit", Some(&cookie), form_body(&fields)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/result");

    let response = router
        .oneshot(get("/result", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let html = read_text(response).await;
    assert!(html.contains("Your type: ENFP"));
    assert!(html.contains("Unknown type"));
}

#[tokio::test]
async fn result_page_without_result_prompts_for_test() {
    let store = empty_store().await;
    let user = session_user(&store, "alice").await;
    let response = router(&store)
        .oneshot(get("/result", Some(&session_cookie(&user))))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_text(response).await.contains("No result yet"));
}

#[tokio::test]
async fn pdf_route_redirects_when_unavailable() {
    let (store, _, questions) = seeded_store(4).await;
    let user = session_user(&store, "alice").await;
    let router = router(&store);
    let cookie = session_cookie(&user);

    let response = router
        .clone()
        .oneshot(get("/result/pdf", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(location(&response), "/test");

    survey_service(&store)
        .submit(&user, &answers_for(&questions, "2"))
        .await
        .expect("submitted");

    let response = router
        .oneshot(get("/result/pdf", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/result");
    let flash = Flash::decode(&set_cookie(&response, "flash").expect("flash")).expect("decodes");
    assert!(flash.message.contains("PDF"));
}

#[tokio::test]
async fn register_login_and_logout_flow() {
    let store = empty_store().await;
    let router = router(&store);

    let fields = vec![
        ("username".to_string(), "dana".to_string()),
        ("email".to_string(), "dana@example.com".to_string()),
        ("password".to_string(), "s3cret-pass".to_string()),
        ("confirm_password".to_string(), "s3cret-pass".to_string()),
    ];
    let response = router
        .clone()
        .oneshot(post_form("/users/register", None, form_body(&fields)))
        .await
        .expect("response");
    assert_eq!(location(&response), "/users/login");

    let duplicate = router
        .clone()
        .oneshot(post_form("/users/register", None, form_body(&fields)))
        .await
        .expect("response");
    assert_eq!(duplicate.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(read_text(duplicate).await.contains("already taken"));

    let bad_login = vec![
        ("username".to_string(), "dana".to_string()),
        ("password".to_string(), "wrong".to_string()),
    ];
    let response = router
        .clone()
        .oneshot(post_form("/users/login", None, form_body(&bad_login)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let login = vec![
        ("username".to_string(), "dana".to_string()),
        ("password".to_string(), "s3cret-pass".to_string()),
        ("next".to_string(), "/test".to_string()),
    ];
    let response = router
        .clone()
        .oneshot(post_form("/users/login", None, form_body(&login)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/test");
    let token = set_cookie(&response, "sid").expect("session cookie");
    let cookie = format!("sid={token}");

    let response = router
        .clone()
        .oneshot(get("/", Some(&cookie)))
        .await
        .expect("response");
    assert!(read_text(response).await.contains("Log out (dana)"));

    let response = router
        .clone()
        .oneshot(get("/users/logout", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(location(&response), "/users/login");
    assert_eq!(set_cookie(&response, "sid").as_deref(), Some(""));

    let response = router
        .oneshot(get("/result", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn mismatched_registration_passwords_rerender_form() {
    let store = empty_store().await;
    let fields = vec![
        ("username".to_string(), "erin".to_string()),
        ("password".to_string(), "one".to_string()),
        ("confirm_password".to_string(), "two".to_string()),
    ];
    let response = router(&store)
        .oneshot(post_form("/users/register", None, form_body(&fields)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.user_by_username("erin").await.expect("lookup").is_none());
}

#[tokio::test]
async fn password_change_ends_sessions() {
    let store = empty_store().await;
    let user = session_user(&store, "frank").await;
    let router = router(&store);
    let cookie = session_cookie(&user);

    let mismatch = vec![
        ("password".to_string(), "new-pass".to_string()),
        ("confirm_password".to_string(), "other".to_string()),
    ];
    let response = router
        .clone()
        .oneshot(post_form("/users/password", Some(&cookie), form_body(&mismatch)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let fields = vec![
        ("password".to_string(), "new-pass".to_string()),
        ("confirm_password".to_string(), "new-pass".to_string()),
    ];
    let response = router
        .clone()
        .oneshot(post_form("/users/password", Some(&cookie), form_body(&fields)))
        .await
        .expect("response");
    assert_eq!(location(&response), "/users/login");

    let response = router
        .oneshot(get("/test", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = store
        .user_by_username("frank")
        .await
        .expect("lookup")
        .expect("user");
    assert!(crate::auth::password::verify_password("new-pass", &stored.password_hash)
        .expect("valid hash"));
}

#[tokio::test]
async fn rendered_flash_is_cleared() {
    let store = empty_store().await;
    let cookie = format!("flash={}", Flash::info("hello there").encode());
    let response = router(&store)
        .oneshot(get("/", Some(&cookie)))
        .await
        .expect("response");
    assert_eq!(set_cookie(&response, "flash").as_deref(), Some(""));
    assert!(read_text(response).await.contains("hello there"));
}

#[tokio::test]
async fn concurrent_autosaves_keep_both_answers() {
    let (store, _, questions) = seeded_store(4).await;
    let user = session_user(&store, "gina").await;
    let router = router(&store);
    let cookie = session_cookie(&user);

    let first = format!(r#"{{"answers":{{"{}":"1"}}}}"#, questions[0].form_key());
    let second = format!(r#"{{"answers":{{"{}":"2"}}}}"#, questions[1].form_key());
    let (first, second) = tokio::join!(
        router
            .clone()
            .oneshot(post_json("/save-progress", Some(&cookie), &first)),
        router
            .clone()
            .oneshot(post_json("/save-progress", Some(&cookie), &second)),
    );
    assert_eq!(first.expect("response").status(), StatusCode::OK);
    assert_eq!(second.expect("response").status(), StatusCode::OK);

    let user = reload(&store, &user.token).await;
    let values = user.draft.saved_values();
    assert_eq!(values.get(&questions[0].id).map(String::as_str), Some("1"));
    assert_eq!(values.get(&questions[1].id).map(String::as_str), Some("2"));
}

#[tokio::test]
async fn blank_new_password_is_reported_as_blank() {
    let store = empty_store().await;
    let user = session_user(&store, "hana").await;
    let fields = vec![
        ("password".to_string(), String::new()),
        ("confirm_password".to_string(), String::new()),
    ];

    let response = router(&store)
        .oneshot(post_form(
            "/users/password",
            Some(&session_cookie(&user)),
            form_body(&fields),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_text(response).await;
    assert!(body.contains(&AuthError::BlankPassword.to_string()));
    assert!(!body.contains(&AuthError::PasswordMismatch.to_string()));
}

mod common;

use client::auth;
use client::error::Error;
use client::router::{self, Navigation, Route};
use client::session::SessionState;
use client::storage::{DurableStorage, TOKEN_KEY, USER_ID_KEY};
use common::{password, TestApp};
use serde_json::json;
use shared::Workout;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_sign_in_authenticates_and_persists() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "alice", "password": "pw123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "access_token": "tok1",
            "user_id": 42,
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    let response = auth::sign_in(&app.context.api, "alice", password("pw123")).await?;

    assert_eq!(response.access_token, "tok1");
    assert_eq!(app.context.session.current_token().as_deref(), Some("tok1"));
    assert_eq!(app.context.session.state().user_id(), Some(42));
    assert_eq!(app.storage.read(TOKEN_KEY)?.as_deref(), Some("tok1"));
    assert_eq!(app.storage.read(USER_ID_KEY)?.as_deref(), Some("42"));
    assert_eq!(
        router::resolve(&app.context.session.state(), "/login"),
        Navigation::Redirect(Route::Dashboard)
    );
    Ok(())
}

#[tokio::test]
async fn test_login_request_carries_no_bearer() -> anyhow::Result<()> {
    let app = TestApp::signed_in().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(400))
        .expect(0)
        .mount(&app.server)
        .await;
    app.mount_login("tok2", 43).await;

    auth::sign_in(&app.context.api, "bob", password("hunter2")).await?;

    assert_eq!(app.context.session.current_token().as_deref(), Some("tok2"));
    assert_eq!(app.storage.read(USER_ID_KEY)?.as_deref(), Some("43"));
    Ok(())
}

#[tokio::test]
async fn test_requests_after_login_carry_bearer() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    app.mount_login("tok1", 42).await;
    Mock::given(method("GET"))
        .and(path("/api/workouts"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.server)
        .await;

    auth::sign_in(&app.context.api, "alice", password("pw123")).await?;
    let workouts: Vec<Workout> = app
        .context
        .api
        .fetch_list::<Workout>(&client::resource::Lookback::Days(30))
        .await?;

    assert!(workouts.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_wrong_credentials_leave_session_alone() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })),
        )
        .mount(&app.server)
        .await;

    let result = auth::sign_in(&app.context.api, "alice", password("nope")).await;

    assert!(matches!(result, Err(Error::WrongCredentials)));
    assert_eq!(app.context.session.state(), SessionState::Unauthenticated);
    assert_eq!(app.storage.read(TOKEN_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn test_empty_credentials_never_reach_backend() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.server)
        .await;

    let result = auth::sign_in(&app.context.api, "  ", password("pw123")).await;

    assert!(matches!(result, Err(Error::Validation { .. })));
    Ok(())
}

#[tokio::test]
async fn test_sign_up_logs_in() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "pw123",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "User created successfully",
            "access_token": "tok7",
            "user_id": 7,
        })))
        .expect(1)
        .mount(&app.server)
        .await;

    auth::sign_up(&app.context.api, "carol", "carol@example.com", password("pw123")).await?;

    assert_eq!(app.context.session.state().user_id(), Some(7));
    assert_eq!(app.storage.read(TOKEN_KEY)?.as_deref(), Some("tok7"));
    Ok(())
}

#[tokio::test]
async fn test_sign_up_conflict_is_reported() -> anyhow::Result<()> {
    let app = TestApp::start().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Username already exists" })),
        )
        .mount(&app.server)
        .await;

    let result = auth::sign_up(&app.context.api, "carol", "carol@example.com", password("pw123")).await;

    match result {
        Err(Error::Rejected { message, .. }) => assert_eq!(message, "Username already exists"),
        other => panic!("unexpected result {other:?}"),
    }
    assert_eq!(app.context.session.state(), SessionState::Unauthenticated);
    Ok(())
}

#[tokio::test]
async fn test_sign_out_clears_session_even_if_backend_fails() -> anyhow::Result<()> {
    let app = TestApp::signed_in().await?;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .and(header("authorization", "Bearer tok1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.server)
        .await;

    auth::sign_out(&app.context.api).await;

    assert_eq!(app.context.session.state(), SessionState::Unauthenticated);
    assert_eq!(app.storage.read(TOKEN_KEY)?, None);
    assert_eq!(app.storage.read(USER_ID_KEY)?, None);
    assert_eq!(
        router::resolve(&app.context.session.state(), "/weight"),
        Navigation::Redirect(Route::Login)
    );
    Ok(())
}

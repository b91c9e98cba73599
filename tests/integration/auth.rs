use crate::common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use jobboard::domain::auth::TokenService;
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
#[serial]
async fn test_register_returns_bearer_pair() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (status, body) = common::send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "new@example.com",
            "password": "password123",
            "name": "New User",
            "phone": "010-1111-2222",
            "birth_date": "1995-07-14"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["expires_in"], 900);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_duplicate_email_conflicts() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    common::register_user(&app, "twice@example.com").await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "twice@example.com",
            "password": "password123",
            "name": "Again"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["status"], 409);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_concurrent_duplicate_registrations_conflict() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let body = json!({
        "email": "racer@example.com",
        "password": "password123",
        "name": "Racer"
    });
    let attempts = (0..3).map(|_| {
        common::send(&app, "POST", "/auth/register", None, Some(body.clone()))
    });
    let mut statuses: Vec<StatusCode> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|(status, _)| status)
        .collect();
    statuses.sort();

    assert_eq!(
        statuses,
        vec![StatusCode::CREATED, StatusCode::CONFLICT, StatusCode::CONFLICT]
    );

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_register_validation() {
    let pool = setup_test_db_or_skip!();
    let app = common::create_test_app(pool);

    let (status, _) = common::send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "not-an-email",
            "password": "short",
            "name": ""
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
#[serial]
async fn test_login_success_stamps_last_login() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (user_id, _) = common::register_user(&app, "login@example.com").await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({
            "email": "login@example.com",
            "password": "password123"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["token_type"], "bearer");

    let mut conn = pool.acquire().await.unwrap();
    let stamped: bool =
        sqlx::query_scalar("SELECT last_login IS NOT NULL FROM users WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert!(stamped);
    drop(conn);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_accepts_form_with_username() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    common::register_user(&app, "form@example.com").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/login")
                .method("POST")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=form%40example.com&password=password123"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_login_failures_are_indistinguishable() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    common::register_user(&app, "same@example.com").await;
    let (blocked_id, _) = common::register_user(&app, "blocked@example.com").await;
    common::set_user_status(&pool, blocked_id, "blocked").await;

    let attempts = [
        json!({"email": "nobody@example.com", "password": "password123"}),
        json!({"email": "same@example.com", "password": "wrong-password"}),
        json!({"email": "blocked@example.com", "password": "password123"}),
    ];

    let mut details = Vec::new();
    for attempt in attempts {
        let (status, body) = common::send(&app, "POST", "/auth/login", None, Some(attempt)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        details.push(body["errors"][0]["detail"].clone());
    }
    assert!(details.windows(2).all(|pair| pair[0] == pair[1]));

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_issues_new_pair() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (status, body) = common::send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({
            "email": "refresh@example.com",
            "password": "password123",
            "name": "Refresher"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let refresh_token = body["data"]["refresh_token"].as_str().unwrap().to_string();
    let access_token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = common::send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"]["access_token"].is_string());

    // An access token is not accepted as a refresh token
    let (status, _) = common::send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": access_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_refresh_rejects_blocked_user() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (user_id, _) = common::register_user(&app, "gone@example.com").await;
    common::set_user_status(&pool, user_id, "blocked").await;

    let refresh_token = common::test_token_service()
        .issue_refresh_token(&user_id.to_string())
        .unwrap();
    let (status, _) = common::send(
        &app,
        "POST",
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_gate_rejects_missing_garbage_and_inactive() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (user_id, token) = common::register_user(&app, "gate@example.com").await;

    let (status, body) = common::send(&app, "GET", "/users/applications", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Authentication required");

    let (status, _) =
        common::send(&app, "GET", "/users/applications", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = common::send(&app, "GET", "/users/applications", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    common::set_user_status(&pool, user_id, "inactive").await;
    let (status, body) =
        common::send(&app, "GET", "/users/applications", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errors"][0]["detail"], "Authentication required");

    // Unknown subject
    let (status, _) = common::send(
        &app,
        "GET",
        "/users/applications",
        Some(&common::access_token(9_999)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup_test_db(&pool).await;
}

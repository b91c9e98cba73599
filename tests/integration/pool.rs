use crate::common;

use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
#[serial]
async fn test_exhausted_pool_is_service_unavailable() {
    let pool = setup_test_db_or_skip!(1);
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    // Hold the only connection
    let held = pool.acquire().await.unwrap();

    let (status, body) = common::send(&app, "GET", "/jobs", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errors"][0]["status"], 503);

    let (status, body) = common::send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["pool"]["in_use"], 1);

    drop(held);

    let (status, _) = common::send(&app, "GET", "/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn test_protected_request_uses_a_single_connection() {
    // The gate and the handler share one session, so a pool of one suffices
    let pool = setup_test_db_or_skip!(1);
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "single@example.com").await;

    let (status, body) =
        common::send(&app, "GET", "/users/bookmarks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(pool.status().in_use, 0);
}

#[tokio::test]
#[serial]
async fn test_bad_token_is_rejected_without_touching_the_pool() {
    let pool = setup_test_db_or_skip!(1);
    let app = common::create_test_app(pool.clone());

    let held = pool.acquire().await.unwrap();

    // 401 rather than 503: the token is checked before any checkout
    let (status, _) =
        common::send(&app, "GET", "/users/bookmarks", Some("not.a.jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    drop(held);
}

#[tokio::test]
#[serial]
async fn test_connections_are_reset_between_requests() {
    let pool = setup_test_db_or_skip!(1);

    {
        let mut conn = pool.acquire().await.unwrap();
        sqlx::raw_sql("CREATE TEMP TABLE leftover (id INT); BEGIN; INSERT INTO leftover VALUES (1)")
            .execute(&mut *conn)
            .await
            .unwrap();
        // Released mid-transaction
    }

    let mut conn = pool.acquire().await.unwrap();
    let leftover: Option<String> =
        sqlx::query_scalar("SELECT to_regclass('pg_temp.leftover')::text")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(leftover, None);

    // A fresh implicit transaction starts with this statement
    let fresh_transaction: bool =
        sqlx::query_scalar("SELECT now() = statement_timestamp()")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert!(fresh_transaction);
}

/// A request whose JSON body arrives in two pieces; returns the sender for
/// the remainder and the in-flight response.
fn split_upload(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    head: &'static [u8],
) -> (
    futures::channel::mpsc::UnboundedSender<Result<Bytes, std::io::Error>>,
    tokio::task::JoinHandle<Response>,
) {
    let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Bytes, std::io::Error>>();
    tx.unbounded_send(Ok(Bytes::from_static(head))).unwrap();

    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from_stream(rx)).unwrap();

    let app = app.clone();
    let pending = tokio::spawn(async move { app.oneshot(request).await.unwrap() });
    (tx, pending)
}

#[tokio::test]
#[serial]
async fn test_slow_upload_does_not_hold_a_connection() {
    let pool = setup_test_db_or_skip!(1);
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "slow@example.com").await;

    // Public route: login body still uploading
    let (tx, pending) = split_upload(
        &app,
        "POST",
        "/auth/login",
        None,
        b"{\"email\":\"slow@example.com\",",
    );
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let (status, _) = common::send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    tx.unbounded_send(Ok(Bytes::from_static(b"\"password\":\"password123\"}")))
        .unwrap();
    drop(tx);
    assert_eq!(pending.await.unwrap().status(), StatusCode::OK);

    // Protected route: profile update body still uploading
    let (tx, pending) = split_upload(
        &app,
        "PUT",
        "/users/profile",
        Some(&token),
        b"{\"name\":",
    );
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let (status, _) = common::send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    tx.unbounded_send(Ok(Bytes::from_static(b"\"Patient\"}"))).unwrap();
    drop(tx);
    assert_eq!(pending.await.unwrap().status(), StatusCode::OK);

    common::cleanup_test_db(&pool).await;
}

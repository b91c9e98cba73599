use crate::common;

use axum::http::StatusCode;
use serde_json::json;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn test_toggle_and_list_bookmarks() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "saver@example.com").await;
    let company_id = common::seed_company(&pool, "Bookmarked Inc").await;
    let posting_id = common::create_job(
        &app,
        &token,
        json!({
            "company_id": company_id,
            "title": "Frontend Engineer",
            "job_description": "Pixels",
            "location": { "city": "Seoul", "district": "Mapo-gu" },
            "tech_stacks": ["TypeScript"],
            "job_categories": ["Frontend"]
        }),
    )
    .await;

    let toggle = json!({ "posting_id": posting_id });

    let (status, body) =
        common::send(&app, "POST", "/users/bookmarks", Some(&token), Some(toggle.clone())).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["bookmarked"], true);
    assert_eq!(body["data"]["message"], "Bookmark added");

    let (status, body) = common::send(&app, "GET", "/users/bookmarks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let bookmarks = body["data"].as_array().unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0]["posting_id"], posting_id);
    assert_eq!(bookmarks[0]["company_name"], "Bookmarked Inc");
    assert_eq!(bookmarks[0]["location"], "Seoul Mapo-gu");
    assert_eq!(bookmarks[0]["tech_stacks"], json!(["TypeScript"]));
    assert_eq!(bookmarks[0]["job_categories"], json!(["Frontend"]));

    let (status, body) =
        common::send(&app, "POST", "/users/bookmarks", Some(&token), Some(toggle)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bookmarked"], false);
    assert_eq!(body["data"]["message"], "Bookmark removed");

    let (_, body) = common::send(&app, "GET", "/users/bookmarks?sort=asc", Some(&token), None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_cannot_bookmark_deleted_posting() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "late@example.com").await;
    let company_id = common::seed_company(&pool, "Gone Inc").await;
    let posting_id = common::create_job(
        &app,
        &token,
        json!({
            "company_id": company_id,
            "title": "Closed role",
            "job_description": "No longer"
        }),
    )
    .await;
    common::send(&app, "DELETE", &format!("/jobs/{}", posting_id), Some(&token), None).await;

    let (status, _) = common::send(
        &app,
        "POST",
        "/users/bookmarks",
        Some(&token),
        Some(json!({ "posting_id": posting_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup_test_db(&pool).await;
}

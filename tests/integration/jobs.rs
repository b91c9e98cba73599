use crate::common;

use axum::http::StatusCode;
use serde_json::{Value, json};
use serial_test::serial;

fn posting(company_id: i64, title: &str, stacks: &[&str]) -> Value {
    json!({
        "company_id": company_id,
        "title": title,
        "job_description": format!("{} wanted", title),
        "employment_type": "full-time",
        "experience_level": "junior",
        "salary_info": "negotiable",
        "deadline_date": "2030-12-31",
        "location": { "city": "Seoul", "district": "Gangnam-gu" },
        "tech_stacks": stacks,
        "job_categories": ["Backend"]
    })
}

#[tokio::test]
#[serial]
async fn test_create_and_get_job() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "recruiter@example.com").await;
    let company_id = common::seed_company(&pool, "Acme").await;

    let id = common::create_job(&app, &token, posting(company_id, "Rust Engineer", &["Rust", "PostgreSQL"])).await;

    let (status, body) = common::send(&app, "GET", &format!("/jobs/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let job = &body["data"]["job"];
    assert_eq!(job["title"], "Rust Engineer");
    assert_eq!(job["company_name"], "Acme");
    assert_eq!(job["city"], "Seoul");
    assert_eq!(job["district"], "Gangnam-gu");
    assert_eq!(job["status"], "active");
    assert_eq!(job["view_count"], 1);
    assert_eq!(job["deadline_date"], "2030-12-31");
    let mut stacks: Vec<String> = serde_json::from_value(job["tech_stacks"].clone()).unwrap();
    stacks.sort();
    assert_eq!(stacks, vec!["PostgreSQL", "Rust"]);

    // Every read counts
    let (_, body) = common::send(&app, "GET", &format!("/jobs/{}", id), None, None).await;
    assert_eq!(body["data"]["job"]["view_count"], 2);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_create_requires_auth_and_known_company() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (status, _) =
        common::send(&app, "POST", "/jobs", None, Some(posting(1, "Anon", &[]))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, token) = common::register_user(&app, "nocompany@example.com").await;
    let (status, body) =
        common::send(&app, "POST", "/jobs", Some(&token), Some(posting(777, "Ghost", &[]))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"][0]["detail"], "Company not found");

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_related_postings_share_company_or_stack() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "related@example.com").await;
    let acme = common::seed_company(&pool, "Acme").await;
    let other = common::seed_company(&pool, "Other").await;

    let main = common::create_job(&app, &token, posting(acme, "Main", &["Rust"])).await;
    let same_company = common::create_job(&app, &token, posting(acme, "Sibling", &["Go"])).await;
    let same_stack = common::create_job(&app, &token, posting(other, "Cousin", &["Rust"])).await;
    let unrelated = common::create_job(&app, &token, posting(other, "Stranger", &["Java"])).await;

    let (_, body) = common::send(&app, "GET", &format!("/jobs/{}", main), None, None).await;
    let related: Vec<i64> = body["data"]["related"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["posting_id"].as_i64().unwrap())
        .collect();

    assert!(related.contains(&same_company));
    assert!(related.contains(&same_stack));
    assert!(!related.contains(&unrelated));
    assert!(!related.contains(&main));

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_list_filters_sorts_and_pages() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "lister@example.com").await;
    let acme = common::seed_company(&pool, "Acme").await;
    let globex = common::seed_company(&pool, "Globex").await;

    common::create_job(&app, &token, posting(acme, "Alpha Rust", &["Rust"])).await;
    common::create_job(&app, &token, posting(globex, "Beta Go", &["Go"])).await;
    common::create_job(&app, &token, posting(globex, "Gamma Rust", &["Rust", "Go"])).await;

    let (status, body) = common::send(&app, "GET", "/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["page_size"], 20);
    assert_eq!(body["meta"]["sort_field"], "created_at");
    assert_eq!(body["meta"]["sort_order"], "desc");

    let (_, body) = common::send(&app, "GET", "/jobs?tech_stacks[0]=Rust", None, None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.iter().all(|t| t.contains("Rust")));

    let (_, body) = common::send(&app, "GET", "/jobs?company=glob&sort_field=title&sort_order=asc", None, None).await;
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|job| job["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Beta Go", "Gamma Rust"]);
    assert_eq!(body["meta"]["sort_field"], "title");
    assert_eq!(body["meta"]["sort_order"], "asc");

    // Unknown sort field falls back, page 0 clamps to 1
    let (_, body) = common::send(&app, "GET", "/jobs?sort_field=password&page=0", None, None).await;
    assert_eq!(body["meta"]["sort_field"], "created_at");
    assert_eq!(body["meta"]["page"], 1);

    let (_, body) = common::send(&app, "GET", "/jobs?page=2", None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = common::send(&app, "GET", "/jobs?keyword=wanted&position=Alpha", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_update_job() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "editor@example.com").await;
    let acme = common::seed_company(&pool, "Acme").await;
    let id = common::create_job(&app, &token, posting(acme, "Before", &["Rust"])).await;

    let (status, body) = common::send(
        &app,
        "PUT",
        &format!("/jobs/{}", id),
        Some(&token),
        Some(json!({
            "title": "After",
            "tech_stacks": ["Go"],
            "location": { "city": "Busan" }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let (_, body) = common::send(&app, "GET", &format!("/jobs/{}", id), None, None).await;
    let job = &body["data"]["job"];
    assert_eq!(job["title"], "After");
    assert_eq!(job["tech_stacks"], json!(["Go"]));
    assert_eq!(job["job_categories"], json!(["Backend"]));
    assert_eq!(job["city"], "Busan");
    assert_eq!(job["district"], Value::Null);

    let (status, _) = common::send(&app, "PUT", &format!("/jobs/{}", id), Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(&app, "PUT", "/jobs/9999", Some(&token), Some(json!({"title": "x"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_delete_job_is_soft() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "deleter@example.com").await;
    let acme = common::seed_company(&pool, "Acme").await;
    let id = common::create_job(&app, &token, posting(acme, "Doomed", &[])).await;

    let (status, _) = common::send(&app, "DELETE", &format!("/jobs/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::send(&app, "DELETE", &format!("/jobs/{}", id), Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::send(&app, "GET", &format!("/jobs/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = common::send(&app, "GET", "/jobs", None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let mut conn = pool.acquire().await.unwrap();
    let status: String =
        sqlx::query_scalar("SELECT status FROM job_postings WHERE posting_id = $1")
            .bind(id)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
    assert_eq!(status, "deleted");
    drop(conn);

    let (status, _) = common::send(&app, "DELETE", "/jobs/9999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup_test_db(&pool).await;
}

#[tokio::test]
#[serial]
async fn test_list_with_huge_page_is_empty_not_an_error() {
    let pool = setup_test_db_or_skip!();
    common::cleanup_test_db(&pool).await;
    let app = common::create_test_app(pool.clone());

    let (_, token) = common::register_user(&app, "pager@example.com").await;
    let company_id = common::seed_company(&pool, "Acme").await;
    common::create_job(&app, &token, posting(company_id, "Rust Engineer", &["Rust"])).await;

    let uri = format!("/jobs?page={}", i64::MAX);
    let (status, body) = common::send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, body) =
        common::send(&app, "GET", &format!("/users/bookmarks?page={}", i64::MAX), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    common::cleanup_test_db(&pool).await;
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, parse_records, FakeWeb};
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

fn sample_web() -> FakeWeb {
    FakeWeb::default()
        .static_page("https://a.com", "<p>Reach us at info@a.com</p>")
        .rendered_page(
            "https://b.com",
            r#"<nav><a href="/contact-us">Contact</a></nav><p>Welcome</p>"#,
            &[
                "https://b.com/contact-us",
                "https://other.com/contact",
                "https://b.com/blog",
            ],
        )
        .rendered_page(
            "https://b.com/contact-us",
            r#"<a href="mailto:Sales@b.com?subject=hi">Mail</a> or hello@b.com"#,
            &[],
        )
}

/// 测试批量检查的完整流式结果
///
/// 静态命中、动态升级和无效输入三种站点各产出一条记录，顺序与输入一致
#[tokio::test]
async fn test_check_streams_one_record_per_site() {
    let app = create_test_app(sample_web(), Duration::from_millis(5));

    let response = app
        .server
        .post("/check")
        .json(&json!({
            "domains": ["a.com", "b.com", "http://[::1"],
            "jobId": "job-stream"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "application/x-ndjson"
    );

    let records = parse_records(response.as_bytes()).await;
    assert_eq!(records.len(), 3);

    let a = &records[0];
    assert_eq!(a["site"], "https://a.com");
    assert_eq!(a["emails"], json!(["info@a.com"]));
    assert_eq!(a["links"], json!([]));
    assert_eq!(a["stats"]["method"], "static");
    assert!(a.get("error").is_none());

    let b = &records[1];
    assert_eq!(b["site"], "https://b.com");
    assert_eq!(b["links"], json!(["https://b.com/contact-us"]));
    assert_eq!(b["stats"]["method"], "dynamic");
    assert_eq!(b["stats"]["totalLinks"], 3);
    assert_eq!(b["stats"]["contactLinks"], 1);
    assert_eq!(b["stats"]["mainPageEmails"], 0);
    assert_eq!(b["stats"]["totalEmails"], 2);
    let mut emails: Vec<&str> = b["emails"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    emails.sort();
    assert_eq!(emails, vec!["hello@b.com", "sales@b.com"]);

    let invalid = &records[2];
    assert_eq!(invalid["site"], "http://[::1");
    assert!(invalid["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid site URL"));
    assert_eq!(invalid["emails"], json!([]));
    assert!(invalid["stats"].is_null());

    assert_eq!(app.open_sessions.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(app.use_case.registry().is_empty());
}

#[tokio::test]
async fn test_unreachable_site_reports_navigation_error() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/check")
        .json(&json!({ "domains": ["nowhere.invalid"], "jobId": "job-err" }))
        .await;

    let records = parse_records(response.as_bytes()).await;
    assert_eq!(records.len(), 1);
    assert!(records[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("Navigation failed"));
    assert_eq!(records[0]["links"], json!([]));
}

#[tokio::test]
async fn test_empty_domain_list_returns_empty_stream() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/check")
        .json(&json!({ "domains": [], "jobId": "job-empty" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(parse_records(response.as_bytes()).await.is_empty());
}

#[tokio::test]
async fn test_check_requires_job_id() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/check")
        .json(&json!({ "domains": ["a.com"] }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_check_requires_domains() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/check")
        .json(&json!({ "jobId": "job-1" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_rejects_malformed_body() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/check")
        .bytes(bytes::Bytes::from_static(b"{\"domains\": ["))
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_unknown_job_is_not_found() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .server
        .post("/cancel")
        .json(&json!({ "jobId": "missing" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "error": "Job not found" }));
}

#[tokio::test]
async fn test_cancel_requires_job_id() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app.server.post("/cancel").json(&json!({})).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

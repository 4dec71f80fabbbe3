// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 流式输出与取消场景
//!
//! 直接对 `Router` 发起请求以逐块读取响应正文

use super::helpers::{create_test_app, read_records, wait_until, FakeWeb};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tower::util::ServiceExt;

async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> Response {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

fn static_sites() -> FakeWeb {
    FakeWeb::default()
        .static_page("https://a.com", "info@a.com")
        .static_page("https://b.com", "hello@b.com")
        .static_page("https://c.com", "team@c.com")
}

/// 测试批次中途取消
///
/// 第一条记录到达后取消，流随即关闭且不再有任何记录
#[tokio::test]
async fn test_cancel_after_first_site_stops_the_stream() {
    let app = create_test_app(static_sites(), Duration::from_millis(500));

    let response = post_json(
        &app.router,
        "/check",
        json!({ "domains": ["a.com", "b.com", "c.com"], "jobId": "job-cancel" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let router = app.router.clone();
    let records = tokio::time::timeout(
        Duration::from_secs(5),
        read_records(response.into_body(), move |_| {
            let router = router.clone();
            tokio::spawn(async move {
                let cancel = post_json(&router, "/cancel", json!({ "jobId": "job-cancel" })).await;
                assert_eq!(cancel.status(), StatusCode::OK);
            });
        }),
    )
    .await
    .expect("stream closes after cancel");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["site"], "https://a.com");
    assert!(app.use_case.registry().is_empty());
}

/// 测试取消会中断正在进行的渲染
#[tokio::test]
async fn test_cancel_interrupts_inflight_navigation() {
    let web = FakeWeb::default().hanging("https://slow.com");
    let app = create_test_app(web, Duration::ZERO);

    let response = post_json(
        &app.router,
        "/check",
        json!({ "domains": ["slow.com"], "jobId": "job-slow" }),
    )
    .await;

    let sessions = app.open_sessions.clone();
    wait_until(|| sessions.load(Ordering::SeqCst) == 1).await;

    let cancel = post_json(&app.router, "/cancel", json!({ "jobId": "job-slow" })).await;
    assert_eq!(cancel.status(), StatusCode::OK);

    let records = tokio::time::timeout(
        Duration::from_secs(5),
        read_records(response.into_body(), |_| {}),
    )
    .await
    .expect("stream closes after cancel");

    assert!(records.is_empty());
    assert_eq!(app.open_sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_duplicate_job_id_is_rejected_while_running() {
    let web = FakeWeb::default().hanging("https://slow.com");
    let app = create_test_app(web, Duration::ZERO);

    let first = post_json(
        &app.router,
        "/check",
        json!({ "domains": ["slow.com"], "jobId": "job-dup" }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .server
        .post("/check")
        .json(&json!({ "domains": ["a.com"], "jobId": "job-dup" }))
        .await;
    assert_eq!(second.status_code(), StatusCode::CONFLICT);

    let cancel = app
        .server
        .post("/cancel")
        .json(&json!({ "jobId": "job-dup" }))
        .await;
    assert_eq!(cancel.status_code(), StatusCode::OK);
    let body: serde_json::Value = cancel.json();
    assert_eq!(body, json!({ "message": "Job cancelled" }));

    let records = read_records(first.into_body(), |_| {}).await;
    assert!(records.is_empty());

    let registry = app.use_case.registry().clone();
    wait_until(|| registry.is_empty()).await;

    // The id is free again once the first job is gone
    let reused = app
        .server
        .post("/check")
        .json(&json!({ "domains": [], "jobId": "job-dup" }))
        .await;
    assert_eq!(reused.status_code(), StatusCode::OK);
}

/// 测试客户端断开连接会取消任务并释放会话
#[tokio::test]
async fn test_client_disconnect_cancels_job() {
    let web = FakeWeb::default().hanging("https://slow.com");
    let app = create_test_app(web, Duration::ZERO);

    let response = post_json(
        &app.router,
        "/check",
        json!({ "domains": ["slow.com", "a.com"], "jobId": "job-gone" }),
    )
    .await;

    let sessions = app.open_sessions.clone();
    wait_until(|| sessions.load(Ordering::SeqCst) == 1).await;

    drop(response);

    let sessions = app.open_sessions.clone();
    wait_until(|| sessions.load(Ordering::SeqCst) == 0).await;
    let registry = app.use_case.registry().clone();
    wait_until(|| registry.is_empty()).await;
}

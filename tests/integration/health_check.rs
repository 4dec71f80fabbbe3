// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::helpers::{create_test_app, FakeWeb};
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use std::time::Duration;
use tower::util::ServiceExt;

/// 健康检查测试
///
/// 验证健康检查端点是否正常工作
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn version_reports_package_version() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app.server.get("/version").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn check_only_accepts_post() {
    let app = create_test_app(FakeWeb::default(), Duration::ZERO);

    let response = app.server.get("/check").await;

    assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
}

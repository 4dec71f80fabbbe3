// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::check_use_case::CheckUseCase;
use crate::presentation::handlers::check_handler;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 创建应用路由
///
/// # 返回值
///
/// 返回配置好的路由
pub fn routes(use_case: Arc<CheckUseCase>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/version", get(version));

    let check_routes = Router::new()
        .route("/check", post(check_handler::check))
        .route("/cancel", post(check_handler::cancel));

    Router::new()
        .merge(public_routes)
        .merge(check_routes)
        .layer(Extension(use_case))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

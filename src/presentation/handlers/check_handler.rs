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

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Extension, Json},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

use crate::{
    application::{
        dto::check_request::{CancelRequestDto, CheckRequestDto},
        use_cases::check_use_case::{CheckError, CheckUseCase},
    },
    domain::models::crawl_result::CrawlResult,
    presentation::errors::AppError,
};

pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// 批量检查，结果以NDJSON逐行流式返回
pub async fn check(
    Extension(use_case): Extension<Arc<CheckUseCase>>,
    payload: Result<Json<CheckRequestDto>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(|e| CheckError::Validation(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| CheckError::Validation(e.to_string()))?;

    let (job_id, domains) = payload
        .into_parts()
        .ok_or_else(|| CheckError::Validation("domains and jobId are required".to_string()))?;

    info!(job_id = %job_id, sites = domains.len(), "Check requested");
    let results = use_case.start(&job_id, domains)?;

    let lines = results.filter_map(|result| async move { encode_line(&result) });
    let body = Body::from_stream(lines.map(Ok::<_, std::convert::Infallible>));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, NDJSON_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}

/// 取消正在运行的任务
pub async fn cancel(
    Extension(use_case): Extension<Arc<CheckUseCase>>,
    payload: Result<Json<CancelRequestDto>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| CheckError::Validation(e.body_text()))?;
    payload
        .validate()
        .map_err(|e| CheckError::Validation(e.to_string()))?;
    let job_id = payload
        .job_id
        .ok_or_else(|| CheckError::Validation("jobId is required".to_string()))?;

    use_case.cancel(&job_id).await?;
    info!(job_id = %job_id, "Job cancelled");

    Ok(Json(json!({ "message": "Job cancelled" })))
}

fn encode_line(result: &CrawlResult) -> Option<String> {
    match serde_json::to_string(result) {
        Ok(mut line) => {
            line.push('\n');
            Some(line)
        }
        Err(e) => {
            error!(site = %result.site, error = %e, "Failed to serialize result");
            None
        }
    }
}

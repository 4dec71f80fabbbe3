// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::use_cases::check_use_case::CheckError;
use crate::utils::errors::JobError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    pub fn status(&self) -> StatusCode {
        let job_error = match self.0.downcast_ref::<CheckError>() {
            Some(CheckError::Validation(_)) => return StatusCode::BAD_REQUEST,
            Some(CheckError::Job(e)) => Some(e),
            None => self.0.downcast_ref::<JobError>(),
        };

        match job_error {
            Some(JobError::AlreadyExists(_)) => StatusCode::CONFLICT,
            Some(JobError::NotFound) => StatusCode::NOT_FOUND,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

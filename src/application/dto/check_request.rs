// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 批量检查请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CheckRequestDto {
    #[validate(required(message = "domains is required"))]
    pub domains: Option<Vec<String>>,
    #[serde(rename = "jobId")]
    #[validate(
        required(message = "jobId is required"),
        length(min = 1, message = "jobId cannot be empty")
    )]
    pub job_id: Option<String>,
}

impl CheckRequestDto {
    /// 拆分为任务ID与域名列表，缺少字段时返回 `None`
    pub fn into_parts(self) -> Option<(String, Vec<String>)> {
        Some((self.job_id?, self.domains?))
    }
}

/// 取消请求
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CancelRequestDto {
    #[serde(rename = "jobId")]
    #[validate(
        required(message = "jobId is required"),
        length(min = 1, message = "jobId cannot be empty")
    )]
    pub job_id: Option<String>,
}

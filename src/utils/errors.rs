// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::EngineError;
use thiserror::Error;

/// 站点爬取错误类型
///
/// `Display` 输出即结果记录中的 `error` 字段
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 输入无法解析为URL
    #[error("Invalid site URL: {0}")]
    Resolution(String),

    /// 静态探测失败（只用于触发升级，不会成为站点的最终错误）
    #[error("Static fetch failed: {0}")]
    Fetch(#[source] EngineError),

    /// 页面导航失败或超时
    #[error("Navigation failed: {0}")]
    Navigation(#[source] EngineError),

    /// 渲染引擎本身失败
    #[error("Rendering engine failed: {0}")]
    Engine(#[source] EngineError),
}

/// 任务注册表错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("Job already exists: {0}")]
    AlreadyExists(String),

    #[error("Job not found")]
    NotFound,
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::CrawlError;
use url::Url;

/// 站点任务
///
/// 保存原始输入与规范化后的绝对URL，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTask {
    raw: String,
    url: String,
}

impl SiteTask {
    pub(crate) fn new(raw: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            url: url.into(),
        }
    }

    /// 原始输入
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 规范化后的URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 解析为 `Url`
    ///
    /// 解析失败或缺少主机名时返回 `CrawlError::Resolution`
    pub fn parse(&self) -> Result<Url, CrawlError> {
        let url = Url::parse(&self.url)
            .map_err(|e| CrawlError::Resolution(format!("{}: {}", self.url, e)))?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(CrawlError::Resolution(format!("{}: missing host", self.url)));
        }

        Ok(url)
    }
}

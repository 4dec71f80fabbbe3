// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::site::SiteTask;

/// 站点解析器
///
/// 将裸域名规范化为绝对URL。这里不做解析校验，非法输入在爬取阶段才会暴露
pub struct SiteResolver;

impl SiteResolver {
    /// 规范化输入
    ///
    /// 缺少 `http://` 或 `https://` 前缀时补上 `https://`，否则原样保留
    pub fn resolve(raw: &str) -> SiteTask {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();

        let url = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        SiteTask::new(raw, url)
    }
}

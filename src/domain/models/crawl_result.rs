// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 邮箱提取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    /// 静态HTTP探测即找到邮箱
    Static,
    /// 经过无头浏览器渲染
    Dynamic,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Static => write!(f, "static"),
            ExtractionMethod::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// 单个站点的统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStats {
    /// 主页上发现的链接总数
    pub total_links: usize,
    /// 联系/关于类链接数量
    pub contact_links: usize,
    /// 主页邮箱数量
    pub main_page_emails: usize,
    /// 子页面邮箱数量（未跨页去重）
    pub contact_page_emails: usize,
    /// 去重后的邮箱总数
    pub total_emails: usize,
    /// 提取方式
    pub method: ExtractionMethod,
}

/// 站点爬取结果
///
/// 每个输入域名对应一条不可变的结果记录。失败的结果只携带 `error`，
/// `links` 与 `emails` 为空且 `stats` 为 `null`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// 规范化后的站点URL
    pub site: String,
    /// 错误信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 已分类的联系/关于链接
    pub links: Vec<String>,
    /// 去重后的邮箱列表
    pub emails: Vec<String>,
    /// 统计信息
    pub stats: Option<CrawlStats>,
}

impl CrawlResult {
    /// 静态探测命中时的结果
    pub fn from_static(site: impl Into<String>, emails: Vec<String>) -> Self {
        let stats = CrawlStats {
            total_links: 0,
            contact_links: 0,
            main_page_emails: emails.len(),
            contact_page_emails: 0,
            total_emails: emails.len(),
            method: ExtractionMethod::Static,
        };

        Self {
            site: site.into(),
            error: None,
            links: Vec::new(),
            emails,
            stats: Some(stats),
        }
    }

    /// 动态渲染完成后的结果
    ///
    /// # 参数
    ///
    /// * `site` - 站点URL
    /// * `total_links` - 主页链接总数
    /// * `links` - 联系/关于链接
    /// * `main_emails` - 主页邮箱
    /// * `contact_emails` - 所有子页面邮箱（按访问顺序拼接）
    pub fn from_dynamic(
        site: impl Into<String>,
        total_links: usize,
        links: Vec<String>,
        main_emails: Vec<String>,
        contact_emails: Vec<String>,
    ) -> Self {
        let main_page_emails = main_emails.len();
        let contact_page_emails = contact_emails.len();

        let mut emails = main_emails;
        for email in contact_emails {
            if !emails.contains(&email) {
                emails.push(email);
            }
        }

        let stats = CrawlStats {
            total_links,
            contact_links: links.len(),
            main_page_emails,
            contact_page_emails,
            total_emails: emails.len(),
            method: ExtractionMethod::Dynamic,
        };

        Self {
            site: site.into(),
            error: None,
            links,
            emails,
            stats: Some(stats),
        }
    }

    /// 失败结果
    pub fn failed(site: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            site: site.into(),
            error: Some(error.to_string()),
            links: Vec::new(),
            emails: Vec::new(),
            stats: None,
        }
    }

    /// 是否为失败结果
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// 提取方式，失败结果返回 `None`
    pub fn method(&self) -> Option<ExtractionMethod> {
        self.stats.as_ref().map(|s| s.method)
    }
}

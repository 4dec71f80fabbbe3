// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use url::Url;

/// 不可导航的链接协议
pub const NON_NAVIGABLE_SCHEMES: [&str; 3] = ["javascript:", "mailto:", "tel:"];

/// 默认的联系/关于关键词
pub const DEFAULT_KEYWORDS: [&str; 2] = ["contact", "about"];

/// 判断链接是否可导航
pub fn is_navigable(href: &str) -> bool {
    let href = href.trim().to_lowercase();
    !href.is_empty()
        && !NON_NAVIGABLE_SCHEMES
            .iter()
            .any(|scheme| href.starts_with(scheme))
}

/// 链接分类器
///
/// 只保留与站点同源、且包含任一关键词的链接
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    keywords: Vec<String>,
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORDS)
    }
}

impl LinkClassifier {
    /// 使用自定义关键词创建分类器
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.into().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self { keywords }
    }

    /// 关键词列表
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// 判断单个链接是否为联系/关于类链接
    pub fn is_contact_like(&self, link: &str, site: &Url) -> bool {
        if !is_navigable(link) {
            return false;
        }

        let lower = link.to_lowercase();
        if !self.keywords.iter().any(|k| lower.contains(k.as_str())) {
            return false;
        }

        // Cross-origin links are never followed
        Url::parse(link).is_ok_and(|url| url.origin() == site.origin())
    }

    /// 分类链接
    ///
    /// # 参数
    ///
    /// * `links` - 页面上收集到的绝对链接
    /// * `site` - 正在爬取的站点URL
    ///
    /// # 返回值
    ///
    /// 按首次出现顺序排列、去重后的联系/关于链接
    pub fn classify(&self, links: &[String], site: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        links
            .iter()
            .filter(|link| self.is_contact_like(link, site))
            .filter(|link| seen.insert(link.as_str()))
            .cloned()
            .collect()
    }
}

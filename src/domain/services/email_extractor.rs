// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

// Dot-atom or quoted string; a quoted local part may not contain spaces
const LOCAL_PART: &str = r#"[a-zA-Z0-9!#$%&'*+/=?^_{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*""#;
const HOST_PART: &str =
    r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?";
const IP_LITERAL: &str = r"\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-zA-Z0-9-]*[a-zA-Z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\]";

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?:{LOCAL_PART})@(?:{HOST_PART}|{IP_LITERAL})"))
        .expect("email pattern is valid")
});

static EXACT_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("^(?:{LOCAL_PART})@(?:{HOST_PART}|{IP_LITERAL})$"))
        .expect("email pattern is valid")
});

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("anchor selector is valid"));

/// 默认排除的占位域名
pub const DEFAULT_EXCLUDED_DOMAINS: [&str; 3] = ["example.com", "test.com", "domain.com"];

/// 页面快照
///
/// 两种抓取路径的统一输入：序列化的文档标记加上所有 `mailto:` 链接目标
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    /// 完整文档标记（不只是可见文本）
    pub markup: String,
    /// `mailto:` 链接的原始 href
    pub mailto_targets: Vec<String>,
}

impl PageSnapshot {
    pub fn new(markup: impl Into<String>, mailto_targets: Vec<String>) -> Self {
        Self {
            markup: markup.into(),
            mailto_targets,
        }
    }

    /// 从静态HTML构造快照
    ///
    /// 标记保持原样，`mailto:` 目标通过解析文档中的锚点获得
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mailto_targets = document
            .select(&ANCHOR_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .map(str::trim)
            .filter(|href| has_mailto_scheme(href))
            .map(str::to_string)
            .collect();

        Self {
            markup: html.to_string(),
            mailto_targets,
        }
    }
}

fn has_mailto_scheme(href: &str) -> bool {
    href.get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

/// 邮箱提取器
///
/// 纯函数式组件：同样的输入总是得到同样顺序的结果
#[derive(Debug, Clone)]
pub struct EmailExtractor {
    excluded_domains: Vec<String>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_DOMAINS.iter().map(|d| d.to_string()))
    }
}

impl EmailExtractor {
    /// 使用自定义排除域名创建提取器
    pub fn new<I, S>(excluded_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let excluded_domains = excluded_domains
            .into_iter()
            .map(|d| d.into().trim().to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self { excluded_domains }
    }

    /// 从页面快照中提取邮箱
    ///
    /// # 参数
    ///
    /// * `snapshot` - 页面快照
    ///
    /// # 返回值
    ///
    /// 小写、去重的邮箱列表，标记中的匹配在前，`mailto:` 目标在后
    pub fn extract(&self, snapshot: &PageSnapshot) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();

        let from_markup = EMAIL_REGEX
            .find_iter(&snapshot.markup)
            .map(|m| m.as_str().to_lowercase());
        let from_mailto = snapshot
            .mailto_targets
            .iter()
            .filter_map(|href| mailto_address(href))
            .filter(|address| EXACT_EMAIL_REGEX.is_match(address))
            .map(|address| address.to_lowercase());

        for email in from_markup.chain(from_mailto) {
            if !self.is_excluded(&email) && !emails.contains(&email) {
                emails.push(email);
            }
        }

        emails
    }

    /// 直接从HTML文本提取邮箱
    pub fn extract_from_html(&self, html: &str) -> Vec<String> {
        self.extract(&PageSnapshot::from_html(html))
    }

    /// 邮箱是否包含被排除的占位域名
    pub fn is_excluded(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.excluded_domains.iter().any(|d| email.contains(d.as_str()))
    }

    /// 排除域名列表
    pub fn excluded_domains(&self) -> &[String] {
        &self.excluded_domains
    }
}

/// 去掉 `mailto:` 前缀与查询串
fn mailto_address(href: &str) -> Option<&str> {
    let href = href.trim();
    if !has_mailto_scheme(href) {
        return None;
    }

    let address = href[7..].split('?').next().unwrap_or_default().trim();
    (!address.is_empty()).then_some(address)
}

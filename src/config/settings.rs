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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含服务器、爬取策略、浏览器和指标导出等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 爬取配置
    pub crawler: CrawlerSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

/// 爬取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 联系/关于链接关键词
    pub search_keywords: Vec<String>,
    /// 排除的占位邮箱域名
    pub excluded_email_domains: Vec<String>,
    /// 静态探测超时（毫秒）
    pub static_timeout_ms: u64,
    /// 单次导航超时（毫秒）
    pub navigation_timeout_ms: u64,
    /// 导航完成后的稳定延迟（毫秒）
    pub settle_delay_ms: u64,
    /// 同一批次相邻站点之间的延迟（毫秒）
    pub inter_site_delay_ms: u64,
    /// 是否启用静态探测
    pub static_probe_enabled: bool,
}

impl CrawlerSettings {
    pub fn static_timeout(&self) -> Duration {
        Duration::from_millis(self.static_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn inter_site_delay(&self) -> Duration {
        Duration::from_millis(self.inter_site_delay_ms)
    }
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// Chrome/Chromium 可执行文件路径，未设置时自动探测
    pub chrome_executable: Option<String>,
    /// 是否无头模式
    pub headless: bool,
    /// 是否禁用沙箱
    pub no_sandbox: bool,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus导出
    pub enabled: bool,
    /// 导出器监听地址
    pub listen_addr: String,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());

        // Plain PORT / SEARCH_KEYWORDS are honoured for existing deployments
        let port = std::env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok());
        let keywords = std::env::var("SEARCH_KEYWORDS")
            .ok()
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty());

        let builder = Self::defaults(Config::builder())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("CONTACTRS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("crawler.search_keywords")
                    .with_list_parse_key("crawler.excluded_email_domains")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)?
            .set_override_option("crawler.search_keywords", keywords)?;

        builder.build()?.try_deserialize()
    }

    /// 只使用内置默认值的配置，测试中使用
    pub fn from_defaults() -> Result<Self, ConfigError> {
        Self::defaults(Config::builder())?.build()?.try_deserialize()
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            // Server
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            // Crawler
            .set_default("crawler.search_keywords", vec!["contact", "about"])?
            .set_default(
                "crawler.excluded_email_domains",
                vec!["example.com", "test.com", "domain.com"],
            )?
            .set_default("crawler.static_timeout_ms", 15_000)?
            .set_default("crawler.navigation_timeout_ms", 60_000)?
            .set_default("crawler.settle_delay_ms", 5_000)?
            .set_default("crawler.inter_site_delay_ms", 1_000)?
            .set_default("crawler.static_probe_enabled", true)?
            // Browser
            .set_default("browser.headless", true)?
            .set_default("browser.no_sandbox", true)?
            // Metrics
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

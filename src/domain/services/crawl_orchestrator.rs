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

use crate::domain::models::crawl_result::{CrawlResult, ExtractionMethod};
use crate::domain::models::site::SiteTask;
use crate::domain::repositories::job_registry::Job;
use crate::domain::services::email_extractor::{EmailExtractor, PageSnapshot};
use crate::domain::services::link_classifier::LinkClassifier;
use crate::domain::services::site_resolver::SiteResolver;
use crate::engines::traits::{DynamicRenderer, RenderSession, SessionHandle, StaticFetcher};
use crate::utils::errors::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// 编排器选项
#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    /// 静态探测超时
    pub static_timeout: Duration,
    /// 是否启用静态探测
    pub static_probe_enabled: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            static_timeout: Duration::from_secs(15),
            static_probe_enabled: true,
        }
    }
}

/// 爬取编排器
///
/// 按站点执行 `解析 → 静态探测 → (完成 | 动态主页 → 动态子链接 → 完成) | 错误` 的状态机。
/// 在各阶段边界检查任务的活跃标志，任务被取消后不再产出任何结果
pub struct CrawlOrchestrator {
    fetcher: Arc<dyn StaticFetcher>,
    renderer: Arc<dyn DynamicRenderer>,
    extractor: EmailExtractor,
    classifier: LinkClassifier,
    options: OrchestratorOptions,
}

/// 动态阶段的中间产物
struct DynamicOutcome {
    total_links: usize,
    contact_links: Vec<String>,
    main_emails: Vec<String>,
    contact_emails: Vec<String>,
}

impl CrawlOrchestrator {
    /// 创建新的编排器实例
    pub fn new(
        fetcher: Arc<dyn StaticFetcher>,
        renderer: Arc<dyn DynamicRenderer>,
        extractor: EmailExtractor,
        classifier: LinkClassifier,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            extractor,
            classifier,
            options,
        }
    }

    /// 爬取单个站点
    ///
    /// # 参数
    ///
    /// * `raw` - 原始输入（域名或URL）
    /// * `job` - 所属任务
    ///
    /// # 返回值
    ///
    /// * `Some(CrawlResult)` - 站点的最终结果（成功或带错误）
    /// * `None` - 任务已被取消，不应再输出任何结果
    pub async fn crawl_site(&self, raw: &str, job: &Job) -> Option<CrawlResult> {
        // RESOLVING
        let site = SiteResolver::resolve(raw);
        let url = match site.parse() {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(job_id = job.id(), site = site.url(), "{}", e);
                return Some(CrawlResult::failed(site.url(), e));
            }
        };

        if !job.is_active() {
            return None;
        }

        // STATIC_PROBE
        if self.options.static_probe_enabled {
            if let Some(emails) = self.static_probe(&site).await {
                tracing::info!(
                    job_id = job.id(),
                    site = site.url(),
                    emails = emails.len(),
                    method = %ExtractionMethod::Static,
                    "Site completed"
                );
                return Some(CrawlResult::from_static(site.url(), emails));
            }
        }

        if !job.is_active() {
            return None;
        }

        // DYNAMIC_MAIN / DYNAMIC_LINKS
        let result = match self.crawl_dynamic(&site, &url, job).await {
            Ok(Some(outcome)) => CrawlResult::from_dynamic(
                site.url(),
                outcome.total_links,
                outcome.contact_links,
                outcome.main_emails,
                outcome.contact_emails,
            ),
            Ok(None) => return None,
            // A failure caused by a cancel tearing down the session is not reported
            Err(_) if !job.is_active() => return None,
            Err(e) => {
                tracing::warn!(job_id = job.id(), site = site.url(), error = %e, "Site failed");
                return Some(CrawlResult::failed(site.url(), e));
            }
        };

        tracing::info!(
            job_id = job.id(),
            site = site.url(),
            emails = result.emails.len(),
            links = result.links.len(),
            method = %ExtractionMethod::Dynamic,
            "Site completed"
        );
        Some(result)
    }

    /// 静态探测，失败会被吞掉并升级到动态渲染
    async fn static_probe(&self, site: &SiteTask) -> Option<Vec<String>> {
        match self.fetcher.fetch(site.url(), self.options.static_timeout).await {
            Ok(body) => {
                let emails = self.extractor.extract(&PageSnapshot::from_html(&body));
                if emails.is_empty() {
                    tracing::debug!(site = site.url(), "Static probe found no emails, escalating");
                    None
                } else {
                    Some(emails)
                }
            }
            Err(e) => {
                let e = CrawlError::Fetch(e);
                tracing::debug!(site = site.url(), error = %e, "Static probe failed, escalating");
                None
            }
        }
    }

    /// 动态渲染阶段
    ///
    /// 会话在所有退出路径上都会被关闭
    async fn crawl_dynamic(
        &self,
        site: &SiteTask,
        url: &Url,
        job: &Job,
    ) -> Result<Option<DynamicOutcome>, CrawlError> {
        let session = self.renderer.launch().await.map_err(CrawlError::Engine)?;
        job.attach_resource(Arc::new(SessionHandle(session.clone()))).await;

        let outcome = self.render_site(session.as_ref(), site, url, job).await;

        job.detach_resource();
        session.close().await;
        outcome
    }

    async fn render_site(
        &self,
        session: &dyn RenderSession,
        site: &SiteTask,
        url: &Url,
        job: &Job,
    ) -> Result<Option<DynamicOutcome>, CrawlError> {
        // DYNAMIC_MAIN
        session
            .navigate(site.url())
            .await
            .map_err(CrawlError::Navigation)?;

        if !job.is_active() {
            return Ok(None);
        }

        let main_emails = session
            .extract_emails(&self.extractor)
            .await
            .map_err(CrawlError::Engine)?;
        let all_links = session.extract_links().await.map_err(CrawlError::Engine)?;

        if !job.is_active() {
            return Ok(None);
        }

        // DYNAMIC_LINKS
        let contact_links = self.classifier.classify(&all_links, url);
        tracing::debug!(
            site = site.url(),
            total_links = all_links.len(),
            contact_links = contact_links.len(),
            "Links classified"
        );

        let mut contact_emails = Vec::new();
        for link in &contact_links {
            if !job.is_active() {
                return Ok(None);
            }

            if let Err(e) = session.navigate(link).await {
                tracing::warn!(site = site.url(), link = %link, error = %e, "Sub-link failed to load, skipping");
                continue;
            }

            match session.extract_emails(&self.extractor).await {
                Ok(emails) => contact_emails.extend(emails),
                Err(e) => {
                    tracing::warn!(site = site.url(), link = %link, error = %e, "Sub-link extraction failed, skipping");
                }
            }
        }

        Ok(Some(DynamicOutcome {
            total_links: all_links.len(),
            contact_links,
            main_emails,
            contact_emails,
        }))
    }
}

#[cfg(test)]
#[path = "crawl_orchestrator_test.rs"]
mod tests;

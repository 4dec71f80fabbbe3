// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::domain::services::email_extractor::PageSnapshot;
use crate::domain::services::link_classifier::is_navigable;
use crate::engines::traits::{DynamicRenderer, EngineError, RenderSession};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

const MAILTO_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('a[href]'))
        .map((a) => a.href)
        .filter((href) => href && href.toLowerCase().startsWith('mailto:'))
"#;

const LINKS_SCRIPT: &str = r#"
    Array.from(document.querySelectorAll('a[href]'))
        .map((a) => a.href)
        .filter((href) => !!href)
"#;

/// Chromium渲染引擎
///
/// 基于chromiumoxide实现。每次 `launch` 都会启动一个独立的浏览器进程，
/// 使用独立的临时配置目录，多个任务之间互不影响
pub struct ChromiumEngine {
    settings: BrowserSettings,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl ChromiumEngine {
    pub fn new(settings: BrowserSettings, navigation_timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            settings,
            navigation_timeout,
            settle_delay,
        }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, EngineError> {
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .request_timeout(self.navigation_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if self.settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if let Some(executable) = &self.settings.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(EngineError::Launch)
    }
}

#[async_trait]
impl DynamicRenderer for ChromiumEngine {
    async fn launch(&self) -> Result<Arc<dyn RenderSession>, EngineError> {
        let id = Uuid::new_v4();
        let profile_dir = std::env::temp_dir().join(format!("contactrs-{}", id));
        self.launch_with_profile(id, profile_dir).await
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

impl ChromiumEngine {
    /// 使用指定的配置目录启动会话，任何失败路径都会删除该目录
    async fn launch_with_profile(
        &self,
        id: Uuid,
        profile_dir: PathBuf,
    ) -> Result<Arc<dyn RenderSession>, EngineError> {
        let config = self.browser_config(&profile_dir)?;

        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(launched) => launched,
            Err(e) => {
                shutdown(None, None, &profile_dir).await;
                return Err(EngineError::Launch(e.to_string()));
            }
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(Some(browser), Some(handler_task), &profile_dir).await;
                return Err(EngineError::Launch(format!("Failed to open page: {}", e)));
            }
        };

        tracing::debug!(session_id = %id, "Browser session launched");

        Ok(Arc::new(ChromiumSession {
            id,
            page,
            browser: Mutex::new(Some(browser)),
            handler_task: Mutex::new(Some(handler_task)),
            profile_dir,
            closed: AtomicBool::new(false),
            navigation_timeout: self.navigation_timeout,
            settle_delay: self.settle_delay,
        }))
    }
}

/// Chromium渲染会话
pub struct ChromiumSession {
    id: Uuid,
    page: Page,
    browser: Mutex<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    profile_dir: PathBuf,
    closed: AtomicBool,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl ChromiumSession {
    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::SessionClosed);
        }
        Ok(())
    }

    async fn evaluate_strings(&self, script: &str) -> Result<Vec<String>, EngineError> {
        self.ensure_open()?;
        self.page
            .evaluate(script)
            .await
            .map_err(|e| EngineError::Evaluation(e.to_string()))?
            .into_value::<Vec<String>>()
            .map_err(|e| EngineError::Evaluation(e.to_string()))
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        self.ensure_open()?;

        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| EngineError::Navigation(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| EngineError::Navigation(e.to_string()))?;
            Ok::<(), EngineError>(())
        };

        tokio::time::timeout(self.navigation_timeout, navigation)
            .await
            .map_err(|_| EngineError::Timeout(self.navigation_timeout))??;

        // Give client-side rendering time to populate the DOM
        tokio::time::sleep(self.settle_delay).await;
        self.ensure_open()
    }

    async fn snapshot(&self) -> Result<PageSnapshot, EngineError> {
        self.ensure_open()?;
        let markup = self
            .page
            .content()
            .await
            .map_err(|e| EngineError::Evaluation(e.to_string()))?;
        let mailto_targets = self.evaluate_strings(MAILTO_SCRIPT).await?;

        Ok(PageSnapshot::new(markup, mailto_targets))
    }

    async fn extract_links(&self) -> Result<Vec<String>, EngineError> {
        let hrefs = self.evaluate_strings(LINKS_SCRIPT).await?;
        let mut seen = HashSet::new();

        Ok(hrefs
            .into_iter()
            .filter(|href| is_navigable(href))
            .filter(|href| seen.insert(href.clone()))
            .collect())
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let browser = self.browser.lock().take();
        let handler_task = self.handler_task.lock().take();
        shutdown(browser, handler_task, &self.profile_dir).await;

        tracing::debug!(session_id = %self.id, "Browser session closed");
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if let Some(task) = self.handler_task.lock().take() {
            task.abort();
        }
    }
}

async fn shutdown(browser: Option<Browser>, handler_task: Option<JoinHandle<()>>, profile_dir: &Path) {
    if let Some(mut browser) = browser {
        if let Err(e) = browser.close().await {
            tracing::debug!("Browser close failed, killing process: {}", e);
            let _ = browser.kill().await;
        }
        let _ = browser.wait().await;
    }

    if let Some(task) = handler_task {
        task.abort();
    }

    if let Err(e) = tokio::fs::remove_dir_all(profile_dir).await {
        tracing::trace!("Failed to remove browser profile {}: {}", profile_dir.display(), e);
    }
}

#[cfg(test)]
#[path = "chromium_engine_test.rs"]
mod tests;

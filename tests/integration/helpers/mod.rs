// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use axum_test::TestServer;
use contactrs::application::use_cases::check_use_case::CheckUseCase;
use contactrs::domain::services::crawl_orchestrator::{CrawlOrchestrator, OrchestratorOptions};
use contactrs::domain::services::email_extractor::{EmailExtractor, PageSnapshot};
use contactrs::domain::services::link_classifier::LinkClassifier;
use contactrs::engines::traits::{DynamicRenderer, EngineError, RenderSession, StaticFetcher};
use contactrs::infrastructure::repositories::job_registry_impl::InMemoryJobRegistry;
use contactrs::presentation::routes;
use futures::TryStreamExt;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio_util::io::StreamReader;

/// 内存中的站点集合
///
/// 静态页面由 `StaticWeb` 提供，渲染页面由 `FakeBrowser` 提供，
/// 挂起的URL会一直等待直到会话被关闭
#[derive(Clone, Default)]
pub struct FakeWeb {
    pub static_pages: HashMap<String, String>,
    pub rendered_pages: HashMap<String, (String, Vec<String>)>,
    pub hanging: HashSet<String>,
}

impl FakeWeb {
    pub fn static_page(mut self, url: &str, html: &str) -> Self {
        self.static_pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn rendered_page(mut self, url: &str, html: &str, links: &[&str]) -> Self {
        self.rendered_pages.insert(
            url.to_string(),
            (
                html.to_string(),
                links.iter().map(|l| l.to_string()).collect(),
            ),
        );
        self
    }

    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }
}

pub struct StaticWeb(FakeWeb);

#[async_trait]
impl StaticFetcher for StaticWeb {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, EngineError> {
        self.0
            .static_pages
            .get(url)
            .cloned()
            .ok_or(EngineError::HttpStatus(404))
    }

    fn name(&self) -> &'static str {
        "static-web"
    }
}

pub struct FakeBrowser {
    web: FakeWeb,
    open_sessions: Arc<AtomicUsize>,
}

#[async_trait]
impl DynamicRenderer for FakeBrowser {
    async fn launch(&self) -> Result<Arc<dyn RenderSession>, EngineError> {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeTab {
            web: self.web.clone(),
            current: Mutex::new(None),
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
            open_sessions: self.open_sessions.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "fake-browser"
    }
}

struct FakeTab {
    web: FakeWeb,
    current: Mutex<Option<String>>,
    closed: AtomicBool,
    close_signal: Notify,
    open_sessions: Arc<AtomicUsize>,
}

impl FakeTab {
    fn current_page(&self) -> Result<(String, Vec<String>), EngineError> {
        let current = self.current.lock().clone();
        current
            .and_then(|url| self.web.rendered_pages.get(&url).cloned())
            .ok_or(EngineError::SessionClosed)
    }
}

#[async_trait]
impl RenderSession for FakeTab {
    async fn navigate(&self, url: &str) -> Result<(), EngineError> {
        if self.web.hanging.contains(url) && !self.closed.load(Ordering::SeqCst) {
            self.close_signal.notified().await;
        }
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::SessionClosed);
        }
        if !self.web.rendered_pages.contains_key(url) {
            return Err(EngineError::Navigation(format!(
                "net::ERR_NAME_NOT_RESOLVED at {}",
                url
            )));
        }

        *self.current.lock() = Some(url.to_string());
        Ok(())
    }

    async fn snapshot(&self) -> Result<PageSnapshot, EngineError> {
        let (html, _) = self.current_page()?;
        Ok(PageSnapshot::from_html(&html))
    }

    async fn extract_links(&self) -> Result<Vec<String>, EngineError> {
        let (_, links) = self.current_page()?;
        Ok(links)
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.open_sessions.fetch_sub(1, Ordering::SeqCst);
            self.close_signal.notify_one();
        }
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub router: Router,
    pub use_case: Arc<CheckUseCase>,
    pub open_sessions: Arc<AtomicUsize>,
}

/// 创建测试应用
///
/// 同时暴露 `TestServer`（整体读取响应）与原始 `Router`（逐块读取流式响应）
pub fn create_test_app(web: FakeWeb, inter_site_delay: Duration) -> TestApp {
    let open_sessions = Arc::new(AtomicUsize::new(0));
    let orchestrator = CrawlOrchestrator::new(
        Arc::new(StaticWeb(web.clone())),
        Arc::new(FakeBrowser {
            web,
            open_sessions: open_sessions.clone(),
        }),
        EmailExtractor::default(),
        LinkClassifier::default(),
        OrchestratorOptions::default(),
    );
    let use_case = Arc::new(CheckUseCase::new(
        Arc::new(orchestrator),
        Arc::new(InMemoryJobRegistry::new()),
        inter_site_delay,
    ));

    let router = routes::routes(use_case.clone());
    let server = TestServer::new(router.clone()).expect("Failed to create test server");

    TestApp {
        server,
        router,
        use_case,
        open_sessions,
    }
}

/// 按换行读取NDJSON记录，每解码出一条就回调一次
///
/// 记录可能被拆在两个分块之间，多字节字符也可能被拆开，
/// 因此按字节读到换行符后才做UTF-8解码
pub async fn decode_records<R, F>(reader: R, mut on_record: F) -> Vec<serde_json::Value>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&serde_json::Value),
{
    let mut reader = reader;
    let mut line_buffer = Vec::new();
    let mut records = Vec::new();

    loop {
        line_buffer.clear();
        let bytes_read = reader
            .read_until(b'\n', &mut line_buffer)
            .await
            .expect("readable body");
        if bytes_read == 0 {
            break;
        }

        let line = std::str::from_utf8(&line_buffer).expect("UTF-8 record");
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: serde_json::Value = serde_json::from_str(line).expect("JSON record");
        on_record(&record);
        records.push(record);
    }

    records
}

/// 把完整的NDJSON响应正文解析为JSON记录
pub async fn parse_records(body: &[u8]) -> Vec<serde_json::Value> {
    decode_records(body, |_| {}).await
}

/// 逐块读取流式响应
pub async fn read_records<F>(body: Body, on_record: F) -> Vec<serde_json::Value>
where
    F: FnMut(&serde_json::Value),
{
    let body_stream = body.into_data_stream().map_err(std::io::Error::other);
    let reader = BufReader::new(StreamReader::new(body_stream));

    decode_records(Box::pin(reader), on_record).await
}

/// 等待条件成立，超时后 panic
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

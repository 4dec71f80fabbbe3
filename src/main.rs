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

use contactrs::application::use_cases::check_use_case::CheckUseCase;
use contactrs::config::settings::Settings;
use contactrs::domain::services::crawl_orchestrator::{CrawlOrchestrator, OrchestratorOptions};
use contactrs::domain::services::email_extractor::EmailExtractor;
use contactrs::domain::services::link_classifier::LinkClassifier;
use contactrs::engines::chromium_engine::ChromiumEngine;
use contactrs::engines::reqwest_engine::ReqwestEngine;
use contactrs::infrastructure::metrics;
use contactrs::infrastructure::repositories::job_registry_impl::InMemoryJobRegistry;
use contactrs::presentation::routes;
use contactrs::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    telemetry::init_telemetry();
    info!("Starting contactrs...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    metrics::init_metrics(&settings.metrics);

    // 3. Engines
    let crawler = &settings.crawler;
    let fetcher = Arc::new(ReqwestEngine);
    let renderer = Arc::new(ChromiumEngine::new(
        settings.browser.clone(),
        crawler.navigation_timeout(),
        crawler.settle_delay(),
    ));

    // 4. Domain services
    let orchestrator = Arc::new(CrawlOrchestrator::new(
        fetcher,
        renderer,
        EmailExtractor::new(crawler.excluded_email_domains.iter().cloned()),
        LinkClassifier::new(crawler.search_keywords.iter().cloned()),
        OrchestratorOptions {
            static_timeout: crawler.static_timeout(),
            static_probe_enabled: crawler.static_probe_enabled,
        },
    ));
    info!(
        keywords = ?crawler.search_keywords,
        static_probe = crawler.static_probe_enabled,
        "Crawl orchestrator ready"
    );

    let registry = Arc::new(InMemoryJobRegistry::new());
    let use_case = Arc::new(CheckUseCase::new(
        orchestrator,
        registry,
        crawler.inter_site_delay(),
    ));

    // 5. Start HTTP server
    let app = routes::routes(use_case);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

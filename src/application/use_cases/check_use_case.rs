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

use crate::domain::models::crawl_result::CrawlResult;
use crate::domain::repositories::job_registry::{Job, JobRegistry};
use crate::domain::services::crawl_orchestrator::CrawlOrchestrator;
use crate::infrastructure::metrics;
use crate::utils::errors::JobError;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// 结果通道容量
const RESULT_BUFFER: usize = 16;

/// 逐条产出的站点结果流，流结束即批次结束
pub type ResultStream = BoxStream<'static, CrawlResult>;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Job(#[from] JobError),
}

/// 批量检查用例
///
/// 每个批次在独立的任务中顺序处理站点，结果一完成就推送到通道，
/// 相邻站点之间插入固定延迟
pub struct CheckUseCase {
    orchestrator: Arc<CrawlOrchestrator>,
    registry: Arc<dyn JobRegistry>,
    inter_site_delay: Duration,
}

impl CheckUseCase {
    pub fn new(
        orchestrator: Arc<CrawlOrchestrator>,
        registry: Arc<dyn JobRegistry>,
        inter_site_delay: Duration,
    ) -> Self {
        Self {
            orchestrator,
            registry,
            inter_site_delay,
        }
    }

    /// 启动批量检查
    ///
    /// # 参数
    ///
    /// * `job_id` - 任务ID，同一时间不可重复
    /// * `domains` - 待检查的域名列表
    ///
    /// # 返回值
    ///
    /// * `Ok(ResultStream)` - 按输入顺序逐条产出结果的流
    /// * `Err(CheckError)` - 任务ID已存在
    pub fn start(&self, job_id: &str, domains: Vec<String>) -> Result<ResultStream, CheckError> {
        let job = self.registry.register(job_id)?;
        let (tx, rx) = mpsc::channel(RESULT_BUFFER);

        // A dropped consumer cancels the job so the open session gets released
        let watcher_tx = tx.clone();
        let watcher_job = job.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = watcher_tx.closed() => {
                    if watcher_job.is_active() {
                        warn!(job_id = watcher_job.id(), "Client disconnected, cancelling job");
                        watcher_job.cancel().await;
                    }
                }
                _ = watcher_job.cancelled() => {}
            }
        });

        tokio::spawn(run_batch(
            self.orchestrator.clone(),
            self.registry.clone(),
            job,
            domains,
            self.inter_site_delay,
            tx,
        ));

        Ok(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|result| (result, rx))
        })
        .boxed())
    }

    /// 取消任务
    pub async fn cancel(&self, job_id: &str) -> Result<(), CheckError> {
        self.registry.cancel(job_id).await?;
        Ok(())
    }

    pub fn registry(&self) -> &Arc<dyn JobRegistry> {
        &self.registry
    }
}

async fn run_batch(
    orchestrator: Arc<CrawlOrchestrator>,
    registry: Arc<dyn JobRegistry>,
    job: Arc<Job>,
    domains: Vec<String>,
    inter_site_delay: Duration,
    tx: mpsc::Sender<CrawlResult>,
) {
    info!(job_id = job.id(), sites = domains.len(), "Batch started");
    metrics::job_started();

    let mut emitted = 0usize;
    for (index, domain) in domains.iter().enumerate() {
        if !job.is_active() {
            break;
        }

        let Some(result) = orchestrator.crawl_site(domain, &job).await else {
            break;
        };
        metrics::record_site(&result);

        if tx.send(result).await.is_err() {
            break;
        }
        emitted += 1;

        if index + 1 < domains.len() {
            tokio::select! {
                _ = tokio::time::sleep(inter_site_delay) => {}
                _ = job.cancelled() => break,
            }
        }
    }

    let cancelled = !job.is_active();
    job.finish();
    registry.remove(job.id());
    metrics::job_finished(cancelled);

    info!(
        job_id = job.id(),
        emitted,
        total = domains.len(),
        cancelled,
        "Batch finished"
    );
}

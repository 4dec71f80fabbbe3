// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::CancellableResource;
use crate::utils::errors::JobError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 批量任务
///
/// 每个批量请求对应一个任务记录，保存活跃标志和当前可被中断的资源。
/// 活跃标志只会从 `true` 变为 `false`
pub struct Job {
    id: String,
    token: CancellationToken,
    resource: Mutex<Option<Arc<dyn CancellableResource>>>,
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .field("has_resource", &self.resource.lock().is_some())
            .finish()
    }
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token: CancellationToken::new(),
            resource: Mutex::new(None),
        }
    }

    /// 任务ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 任务是否仍然活跃
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// 等待任务变为非活跃
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// 绑定可中断资源
    ///
    /// 若任务已被取消，资源会被立即关闭
    pub async fn attach_resource(&self, handle: Arc<dyn CancellableResource>) {
        *self.resource.lock() = Some(handle);

        // A cancel that raced with the store above has already taken (or missed) the slot.
        if !self.is_active() {
            let pending = self.resource.lock().take();
            if let Some(resource) = pending {
                resource.close().await;
            }
        }
    }

    /// 解绑资源，由资源所有者在自行关闭前调用
    pub fn detach_resource(&self) -> Option<Arc<dyn CancellableResource>> {
        self.resource.lock().take()
    }

    /// 取消任务：标记为非活跃并关闭已绑定的资源
    pub async fn cancel(&self) {
        self.token.cancel();

        let attached = self.resource.lock().take();
        if let Some(resource) = attached {
            resource.close().await;
        }
    }

    /// 自然完成时标记为非活跃
    pub fn finish(&self) {
        self.token.cancel();
    }
}

/// 任务注册表特质
///
/// 进程内唯一被多个任务共享的可变状态
#[async_trait]
pub trait JobRegistry: Send + Sync {
    /// 注册新任务，ID已存在时失败
    fn register(&self, job_id: &str) -> Result<Arc<Job>, JobError>;

    /// 查找任务
    fn get(&self, job_id: &str) -> Option<Arc<Job>>;

    /// 为任务绑定可中断资源
    async fn attach_resource(
        &self,
        job_id: &str,
        handle: Arc<dyn CancellableResource>,
    ) -> Result<(), JobError>;

    /// 取消任务并关闭其资源
    async fn cancel(&self, job_id: &str) -> Result<(), JobError>;

    /// 移除任务
    fn remove(&self, job_id: &str) -> Option<Arc<Job>>;

    /// 当前登记的任务数量
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::job_registry::{Job, JobRegistry};
use crate::engines::traits::CancellableResource;
use crate::utils::errors::JobError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// 内存任务注册表
///
/// 基于DashMap实现，按条目加锁
#[derive(Default)]
pub struct InMemoryJobRegistry {
    jobs: DashMap<String, Arc<Job>>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRegistry for InMemoryJobRegistry {
    fn register(&self, job_id: &str) -> Result<Arc<Job>, JobError> {
        match self.jobs.entry(job_id.to_string()) {
            Entry::Occupied(_) => Err(JobError::AlreadyExists(job_id.to_string())),
            Entry::Vacant(entry) => {
                let job = Arc::new(Job::new(job_id));
                entry.insert(job.clone());
                tracing::debug!(job_id, "Job registered");
                Ok(job)
            }
        }
    }

    fn get(&self, job_id: &str) -> Option<Arc<Job>> {
        self.jobs.get(job_id).map(|entry| entry.value().clone())
    }

    async fn attach_resource(
        &self,
        job_id: &str,
        handle: Arc<dyn CancellableResource>,
    ) -> Result<(), JobError> {
        let job = self.get(job_id).ok_or(JobError::NotFound)?;
        job.attach_resource(handle).await;
        Ok(())
    }

    async fn cancel(&self, job_id: &str) -> Result<(), JobError> {
        let job = self.get(job_id).ok_or(JobError::NotFound)?;
        job.cancel().await;
        tracing::info!(job_id, "Job cancelled");
        Ok(())
    }

    fn remove(&self, job_id: &str) -> Option<Arc<Job>> {
        self.jobs.remove(job_id).map(|(_, job)| job)
    }

    fn len(&self) -> usize {
        self.jobs.len()
    }
}

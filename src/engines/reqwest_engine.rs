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

use crate::engines::traits::{EngineError, StaticFetcher};
use async_trait::async_trait;
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; contactrs/0.1; +https://github.com/Kirky-X)";

/// 静态抓取引擎
///
/// 基于reqwest实现的轻量HTTP探测
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestEngine;

#[async_trait]
impl StaticFetcher for ReqwestEngine {
    /// 执行HTTP抓取
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `timeout` - 超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 响应正文
    /// * `Err(EngineError)` - 传输错误、超时或非2xx状态码
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, EngineError> {
        // Each request gets a fresh client for cookie isolation
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        let start = Instant::now();
        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(timeout)
            } else {
                EngineError::RequestFailed(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::HttpStatus(status.as_u16()));
        }

        let content = response.text().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout(timeout)
            } else {
                EngineError::RequestFailed(e)
            }
        })?;

        tracing::debug!(
            url,
            status = status.as_u16(),
            bytes = content.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Static fetch completed"
        );

        Ok(content)
    }

    /// 获取引擎名称
    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
#[path = "reqwest_engine_test.rs"]
mod tests;

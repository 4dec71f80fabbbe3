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

use crate::domain::services::email_extractor::{EmailExtractor, PageSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 非2xx状态码
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    /// 超时
    #[error("Timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    /// 浏览器启动失败
    #[error("Browser launch failed: {0}")]
    Launch(String),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 页面脚本执行失败
    #[error("Evaluation failed: {0}")]
    Evaluation(String),
    /// 会话已关闭
    #[error("Rendering session is closed")]
    SessionClosed,
}

impl EngineError {
    /// 判断错误是否为超时
    pub fn is_timeout(&self) -> bool {
        match self {
            EngineError::RequestFailed(e) => e.is_timeout(),
            EngineError::Timeout(_) => true,
            _ => false,
        }
    }
}

/// 静态抓取引擎特质
///
/// 发起一次轻量GET请求并返回响应正文，不做重试
#[async_trait]
pub trait StaticFetcher: Send + Sync {
    /// 抓取页面正文
    ///
    /// # 参数
    ///
    /// * `url` - 目标URL
    /// * `timeout` - 整个请求的超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(String)` - 2xx响应的正文
    /// * `Err(EngineError)` - 传输错误、超时或非2xx状态
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 可被取消请求关闭的资源
#[async_trait]
pub trait CancellableResource: Send + Sync {
    /// 立即释放资源，重复调用无副作用
    async fn close(&self);
}

/// 渲染会话
///
/// 一个隔离的浏览器上下文，同一站点的主页与子链接复用同一会话
#[async_trait]
pub trait RenderSession: Send + Sync {
    /// 导航到URL，等待网络稳定（受导航超时约束）后再等待固定的稳定延迟
    async fn navigate(&self, url: &str) -> Result<(), EngineError>;

    /// 当前DOM的序列化标记与所有 `mailto:` 链接
    async fn snapshot(&self) -> Result<PageSnapshot, EngineError>;

    /// 当前页面所有可导航的绝对链接（首次出现顺序，已去重）
    async fn extract_links(&self) -> Result<Vec<String>, EngineError>;

    /// 释放底层资源，重复调用无副作用
    async fn close(&self);

    /// 在当前DOM上运行邮箱提取
    async fn extract_emails(&self, extractor: &EmailExtractor) -> Result<Vec<String>, EngineError> {
        let snapshot = self.snapshot().await?;
        Ok(extractor.extract(&snapshot))
    }
}

/// 动态渲染引擎特质
#[async_trait]
pub trait DynamicRenderer: Send + Sync {
    /// 启动一个隔离的渲染会话
    async fn launch(&self) -> Result<Arc<dyn RenderSession>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 将渲染会话包装为可取消资源，供任务注册表持有
pub struct SessionHandle(pub Arc<dyn RenderSession>);

#[async_trait]
impl CancellableResource for SessionHandle {
    async fn close(&self) {
        self.0.close().await;
    }
}

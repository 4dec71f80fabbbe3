// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 邮箱提取（email_extractor）：从页面标记和mailto链接中提取邮箱
/// - 链接分类（link_classifier）：挑出同源的联系/关于类链接
/// - 站点解析（site_resolver）：把用户输入规范化为可请求的URL
/// - 爬取编排（crawl_orchestrator）：静态探测与动态渲染的两级策略
pub mod crawl_orchestrator;
pub mod email_extractor;
pub mod link_classifier;
pub mod site_resolver;

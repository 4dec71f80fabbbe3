// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// - 爬取结果（crawl_result）：单个站点的最终输出及统计
/// - 站点任务（site）：一个输入域名解析后的目标
pub mod crawl_result;
pub mod site;

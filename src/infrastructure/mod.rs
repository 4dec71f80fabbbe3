// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// - 指标（metrics）：Prometheus导出与计数器
/// - 仓库实现（repositories）：任务注册表的内存实现
pub mod metrics;
pub mod repositories;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：站点任务与爬取结果
/// - 仓库接口（repositories）：任务注册表抽象
/// - 服务（services）：邮箱提取、链接分类、站点解析与爬取编排
///
/// 领域层只依赖引擎抽象，不依赖任何具体的抓取或渲染实现。
pub mod models;
pub mod repositories;
pub mod services;

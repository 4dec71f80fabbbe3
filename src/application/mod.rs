// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求DTO与批量检查用例，将HTTP层与领域编排分离
pub mod dto;
pub mod use_cases;

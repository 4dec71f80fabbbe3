// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 用例模块
///
/// 批量检查用例：登记任务、顺序爬取站点并逐条推送结果
pub mod check_use_case;

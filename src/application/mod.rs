// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求数据传输对象与批处理用例
/// 用例负责编排领域服务与抓取引擎，并管理批处理范围内的资源
pub mod dto;
pub mod use_cases;

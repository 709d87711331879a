// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：诊断记录与批处理结果
/// - 服务（services）：规范化、邮箱匹配与域名抓取
///
/// 领域层只依赖 `PageSource` 抽象，不关心页面是静态获取还是浏览器渲染。
pub mod models;
pub mod services;

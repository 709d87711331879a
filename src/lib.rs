// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含请求数据传输对象与批处理用例
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含诊断记录、域名规范化、邮箱匹配与域名抓取
pub mod domain;

/// 引擎模块
///
/// 实现静态抓取与浏览器渲染两种页面来源
pub mod engines;

/// 基础设施模块
///
/// 提供指标导出
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由和处理器
pub mod presentation;

/// 工具模块
///
/// 提供错误类型与日志初始化
pub mod utils;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 包含系统的技术实现细节：
/// - 指标（metrics）：Prometheus 导出器与指标说明
pub mod metrics;

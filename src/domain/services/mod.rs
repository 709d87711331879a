// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含邮箱抓取的核心业务逻辑，这些服务不关心页面如何获取，
/// 只负责输入规范化、候选邮箱识别与单个域名的抓取流程。
///
/// 包含的服务：
/// - 域名规范化（domain_normalizer）：把任意输入转换为 https 根 URL
/// - 邮箱匹配（email_matcher）：候选提取与有效性分类
/// - 域名抓取（domain_scraper）：抓取候选页面并生成诊断记录
/// - 主机节流（host_pacer）：同一主机请求之间的最小间隔
pub mod domain_normalizer;
pub mod domain_scraper;
pub mod email_matcher;
pub mod host_pacer;

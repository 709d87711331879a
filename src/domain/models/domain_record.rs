// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 域名处理状态
///
/// `Failed` 只表示处理过程中出现了意外错误，
/// 没有找到邮箱或所有页面抓取失败仍然是 `Success`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Success,
    Failed,
}

/// 单个域名的诊断记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// 规范化后的根 URL
    pub url: String,
    /// 处理状态
    pub status: DomainStatus,
    /// 通过校验的邮箱（小写）
    pub emails_found: Vec<String>,
    /// 被过滤的候选项（保持原样）
    pub emails_filtered: Vec<String>,
    /// 第一个意外错误信息
    pub error: Option<String>,
}

impl DomainRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: DomainStatus::Success,
            emails_found: Vec::new(),
            emails_filtered: Vec::new(),
            error: None,
        }
    }

    /// 创建一条失败记录
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        let mut record = Self::new(url);
        record.mark_failed(error);
        record
    }

    /// 标记失败，只保留第一条错误信息
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = DomainStatus::Failed;
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DomainStatus::Success
    }
}

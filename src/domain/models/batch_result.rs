// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::domain_record::DomainRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const NO_EMAILS_MESSAGE: &str = "No valid emails found";
pub const SUCCESS_MESSAGE: &str = "Emails scraped successfully";

/// 一次批处理的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    /// 跨域名去重后的邮箱，按首次出现顺序排列
    pub emails: Vec<String>,
    /// 面向用户的摘要信息
    pub message: String,
    /// 每个域名的诊断记录，与输入顺序一致
    #[serde(rename = "debug")]
    pub records: Vec<DomainRecord>,
}

impl BatchResult {
    /// 汇总所有域名记录
    pub fn from_records(records: Vec<DomainRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut emails = Vec::new();
        for email in records.iter().flat_map(|r| r.emails_found.iter()) {
            let email = email.to_lowercase();
            if seen.insert(email.clone()) {
                emails.push(email);
            }
        }

        let message = if emails.is_empty() {
            NO_EMAILS_MESSAGE
        } else {
            SUCCESS_MESSAGE
        };

        Self {
            emails,
            message: message.to_string(),
            records,
        }
    }
}

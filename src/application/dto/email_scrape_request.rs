// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// 邮箱抓取请求数据传输对象
///
/// `domains` 中的元素可以是任意 JSON 值，非字符串元素会在规范化阶段被丢弃
#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct EmailScrapeRequestDto {
    #[serde(default)]
    #[validate(length(min = 1, message = "No domains supplied"))]
    pub domains: Vec<Value>,
}

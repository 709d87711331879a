// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::HarvestError;
use serde_json::Value;
use std::collections::HashSet;

const SECURE_SCHEME: &str = "https://";
const INSECURE_SCHEME: &str = "http://";

/// 将原始单元格值规范化为去重后的根 URL 列表
///
/// 非字符串与空白值会被丢弃；缺少协议的值补全为 `https://`，
/// `http://` 一律改写为 `https://`。
///
/// # 返回值
///
/// * `Ok(Vec<String>)` - 按首次出现顺序排列的域名
/// * `Err(HarvestError::NoValidDomains)` - 没有任何可用域名
pub fn normalize_domains(values: &[Value]) -> Result<Vec<String>, HarvestError> {
    let mut seen = HashSet::new();
    let mut domains = Vec::new();

    for value in values {
        let Some(raw) = value.as_str() else {
            continue;
        };
        let Some(domain) = normalize_domain(raw) else {
            continue;
        };
        if seen.insert(domain.clone()) {
            domains.push(domain);
        }
    }

    if domains.is_empty() {
        return Err(HarvestError::NoValidDomains);
    }
    Ok(domains)
}

/// 规范化单个域名，空白输入返回 `None`
pub fn normalize_domain(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let rest = strip_prefix_ignore_case(trimmed, SECURE_SCHEME)
        .or_else(|| strip_prefix_ignore_case(trimmed, INSECURE_SCHEME))
        .unwrap_or(trimmed);

    Some(format!("{}{}", SECURE_SCHEME, rest))
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

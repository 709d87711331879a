// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 邮箱匹配与过滤
//!
//! 从文本中提取候选邮箱，并按语法规则与噪声策略进行分类。

use crate::config::settings::EmailPolicySettings;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidateEmail;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[a-z]{2,}").expect("email pattern is valid")
});

const MAX_LOCAL_PART_LEN: usize = 64;
const SCALE_SUFFIX: &str = "@2x";
const MAILTO_SCHEME: &str = "mailto:";

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Valid,
    Invalid,
}

/// 噪声过滤策略
///
/// 占位域名与公共邮箱服务商属于业务策略，因此以数据形式配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailPolicy {
    /// 以 `@<domain>` 结尾即视为噪声
    pub denied_domains: Vec<String>,
    /// 域名部分以 `.<ext>` 结尾即视为图片资源
    pub asset_extensions: Vec<String>,
    /// 是否拒绝 `@2x` 缩放后缀
    pub reject_scale_suffix: bool,
}

impl Default for EmailPolicy {
    fn default() -> Self {
        Self::from(&EmailPolicySettings::default())
    }
}

impl From<&EmailPolicySettings> for EmailPolicy {
    fn from(settings: &EmailPolicySettings) -> Self {
        Self {
            denied_domains: settings
                .denied_domains
                .iter()
                .map(|d| d.trim().trim_start_matches('@').to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            asset_extensions: settings
                .asset_extensions
                .iter()
                .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
            reject_scale_suffix: settings.reject_scale_suffix,
        }
    }
}

impl EmailPolicy {
    /// 判断候选项是否命中噪声规则
    pub fn is_noise(&self, candidate: &str) -> bool {
        let lowered = candidate.to_ascii_lowercase();

        if self.reject_scale_suffix && lowered.contains(SCALE_SUFFIX) {
            return true;
        }

        if self
            .denied_domains
            .iter()
            .any(|domain| lowered.ends_with(&format!("@{}", domain)))
        {
            return true;
        }

        match lowered.split_once('@') {
            Some((_, domain_part)) => self
                .asset_extensions
                .iter()
                .any(|ext| domain_part.ends_with(&format!(".{}", ext))),
            None => false,
        }
    }
}

/// 邮箱匹配器
#[derive(Debug, Clone, Default)]
pub struct EmailMatcher {
    policy: EmailPolicy,
}

impl EmailMatcher {
    pub fn new(policy: EmailPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EmailPolicy {
        &self.policy
    }

    /// 从文本中按出现顺序提取候选邮箱，不做去重
    ///
    /// 若匹配之后紧跟的非空白片段中还有 `@`，该起点不产生匹配，
    /// 扫描从下一个字符继续，以避免拼接文本产生的链式误匹配。
    pub fn extract_candidates(&self, text: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        let mut pos = 0;

        while let Some(m) = EMAIL_PATTERN.find_at(text, pos) {
            if trailing_run_has_at(&text[m.end()..]) {
                pos = m.start()
                    + text[m.start()..]
                        .chars()
                        .next()
                        .map_or(1, char::len_utf8);
                continue;
            }
            candidates.push(m.as_str().to_string());
            pos = m.end();
        }

        candidates
    }

    /// 对候选邮箱进行分类
    ///
    /// 语法校验与噪声策略两者都通过才视为有效
    pub fn classify(&self, candidate: &str) -> Classification {
        if is_syntactically_valid(candidate) && !self.policy.is_noise(candidate) {
            Classification::Valid
        } else {
            Classification::Invalid
        }
    }

    pub fn is_valid(&self, candidate: &str) -> bool {
        self.classify(candidate) == Classification::Valid
    }
}

fn trailing_run_has_at(rest: &str) -> bool {
    rest.chars()
        .take_while(|c| !c.is_whitespace())
        .any(|c| c == '@')
}

/// 标准邮箱语法校验
pub fn is_syntactically_valid(candidate: &str) -> bool {
    let mut parts = candidate.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.len() > MAX_LOCAL_PART_LEN {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    candidate.validate_email()
}

/// 判断 href 是否为 mailto 链接（忽略大小写与首尾空白）
pub fn is_mailto(href: &str) -> bool {
    href.trim()
        .get(..MAILTO_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(MAILTO_SCHEME))
}

/// 将 mailto 链接转换为候选邮箱
///
/// 去掉 `mailto:` 前缀与查询串并进行百分号解码，
/// 逗号分隔的多个收件人拆分为多个候选项
pub fn mailto_addresses(target: &str) -> Vec<String> {
    let trimmed = target.trim();
    let without_scheme = if is_mailto(trimmed) {
        &trimmed[MAILTO_SCHEME.len()..]
    } else {
        trimmed
    };
    let recipients = without_scheme
        .split_once('?')
        .map_or(without_scheme, |(recipients, _)| recipients);

    let decoded = urlencoding::decode(recipients)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| recipients.to_string());

    decoded
        .split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "email_matcher_test.rs"]
mod tests;

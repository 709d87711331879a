// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::FetchError;
use thiserror::Error;

/// 批处理错误类型
///
/// 只有 `NoValidDomains` 与 `Internal` 会跨越批处理边界，
/// 其余错误都会在域名抓取内部被转换为诊断记录。
#[derive(Error, Debug)]
pub enum HarvestError {
    /// 规范化后没有任何可用域名
    #[error("No valid domains found in the input")]
    NoValidDomains,

    /// 候选页面URL无法解析
    #[error("Invalid page URL {url}: {source}")]
    InvalidPageUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// 抓取组件初始化失败
    #[error("Fetcher setup failed: {0}")]
    Fetch(#[from] FetchError),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{FetchStrategy, PageSource};
use metrics::counter;
use std::sync::Arc;
use tracing::{info, warn};

/// 单个页面的抓取结果
///
/// `strategy_used` 为 `None` 表示所有策略都失败，此时 `error` 记录最后一次失败原因
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchResult {
    pub raw_text: String,
    pub mailto_targets: Vec<String>,
    pub strategy_used: Option<FetchStrategy>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        self.strategy_used.is_some()
    }
}

/// 页面抓取器
///
/// 按顺序尝试各个来源（静态优先，渲染回退），从不向调用方返回错误
pub struct PageFetcher {
    sources: Vec<Arc<dyn PageSource>>,
}

impl PageFetcher {
    pub fn new(sources: Vec<Arc<dyn PageSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// 抓取页面
    ///
    /// 前一个来源失败时才会尝试下一个来源
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let mut last_error = None;

        for (index, source) in self.sources.iter().enumerate() {
            match source.fetch(url).await {
                Ok(content) => {
                    counter!("pages_fetched_total", "strategy" => source.strategy().as_str())
                        .increment(1);
                    return FetchResult {
                        raw_text: content.text,
                        mailto_targets: content.mailto_targets,
                        strategy_used: Some(source.strategy()),
                        error: None,
                    };
                }
                Err(e) => {
                    counter!("page_fetch_failures_total", "source" => source.name()).increment(1);
                    match self.sources.get(index + 1) {
                        Some(next) => info!(
                            "{} fetch failed for {}: {}, trying {}...",
                            source.name(),
                            url,
                            e,
                            next.name()
                        ),
                        None => warn!("{} fetch failed for {}: {}", source.name(), url, e),
                    }
                    last_error = Some(format!("{}: {}", source.name(), e));
                }
            }
        }

        FetchResult {
            error: Some(last_error.unwrap_or_else(|| "no page source configured".to_string())),
            ..FetchResult::default()
        }
    }
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::domain_record::DomainRecord;
use crate::domain::services::email_matcher::{mailto_addresses, Classification, EmailMatcher};
use crate::domain::services::host_pacer::HostPacer;
use crate::engines::page_fetcher::PageFetcher;
use crate::utils::errors::HarvestError;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// 单个域名的抓取服务
///
/// 依次抓取域名下的候选页面，合并文本与 mailto 链接后分类候选邮箱
pub struct DomainScraper {
    fetcher: PageFetcher,
    matcher: EmailMatcher,
    pacer: Arc<HostPacer>,
    page_paths: Vec<String>,
}

impl DomainScraper {
    /// 创建域名抓取服务
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面抓取器
    /// * `matcher` - 邮箱匹配器
    /// * `pacer` - 按主机节流器，跨批处理共享
    /// * `page_paths` - 追加到域名后的候选页面路径
    pub fn new(
        fetcher: PageFetcher,
        matcher: EmailMatcher,
        pacer: Arc<HostPacer>,
        page_paths: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            matcher,
            pacer,
            page_paths,
        }
    }

    /// 构造候选页面 URL
    pub fn page_url(domain: &str, path: &str) -> Result<Url, HarvestError> {
        let raw = format!("{}{}", domain.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|source| HarvestError::InvalidPageUrl { url: raw, source })
    }

    /// 抓取单个域名
    ///
    /// 从不返回错误：页面抓取失败只会导致对应页面没有内容，
    /// 意外错误会把记录标记为失败并保留第一条错误信息
    pub async fn scrape(&self, domain: &str) -> DomainRecord {
        let mut record = DomainRecord::new(domain);
        let mut texts = Vec::new();
        let mut mailto_targets = Vec::new();

        for path in &self.page_paths {
            let url = match Self::page_url(domain, path) {
                Ok(url) => url,
                Err(e) => {
                    warn!("Skipping page of {}: {}", domain, e);
                    record.mark_failed(e.to_string());
                    continue;
                }
            };

            self.pacer.until_ready(&url).await;
            let result = self.fetcher.fetch(url.as_str()).await;
            match result.strategy_used {
                Some(strategy) => debug!("Fetched {} via {}", url, strategy),
                None => debug!(
                    "No content for {}: {}",
                    url,
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }

            if !result.raw_text.is_empty() {
                texts.push(result.raw_text);
            }
            mailto_targets.extend(result.mailto_targets);
        }

        let merged = texts.join(" ");
        let candidates = self
            .matcher
            .extract_candidates(&merged)
            .into_iter()
            .chain(mailto_targets.iter().flat_map(|t| mailto_addresses(t)));

        for candidate in candidates {
            match self.matcher.classify(&candidate) {
                Classification::Valid => record.emails_found.push(candidate.to_lowercase()),
                Classification::Invalid => record.emails_filtered.push(candidate),
            }
        }

        counter!("emails_found_total").increment(record.emails_found.len() as u64);
        counter!("emails_filtered_total").increment(record.emails_filtered.len() as u64);
        info!(
            "Scraped {}: {} found, {} filtered",
            domain,
            record.emails_found.len(),
            record.emails_filtered.len()
        );

        record
    }
}

#[cfg(test)]
#[path = "domain_scraper_test.rs"]
mod tests;

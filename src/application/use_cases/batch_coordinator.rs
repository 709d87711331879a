// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::{BrowserSettings, ScraperSettings, Settings};
use crate::domain::models::batch_result::BatchResult;
use crate::domain::models::domain_record::DomainRecord;
use crate::domain::services::domain_normalizer::normalize_domains;
use crate::domain::services::domain_scraper::DomainScraper;
use crate::domain::services::email_matcher::{EmailMatcher, EmailPolicy};
use crate::domain::services::host_pacer::HostPacer;
use crate::engines::browser_session::BrowserSession;
use crate::engines::page_fetcher::PageFetcher;
use crate::engines::rendered_source::RenderedPageSource;
use crate::engines::static_source::StaticPageSource;
use crate::engines::traits::PageSource;
use crate::utils::errors::HarvestError;
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use serde_json::Value;
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinError;
use tracing::{error, info, warn};

pub const DEADLINE_EXCEEDED: &str = "batch deadline exceeded";

/// 批处理选项
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// 追加到每个域名后的候选页面路径
    pub page_paths: Vec<String>,
    /// 同时处理的域名数量，1 表示逐个处理
    pub max_concurrent_domains: usize,
    /// 整个批处理的截止时间
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            page_paths: vec![String::new(), "/contact".to_string()],
            max_concurrent_domains: 1,
            deadline: Some(Duration::from_secs(300)),
        }
    }
}

impl From<&Settings> for BatchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            page_paths: settings.scraper.page_paths.clone(),
            max_concurrent_domains: settings.concurrency.max_concurrent_domains,
            deadline: settings.batch.deadline(),
        }
    }
}

#[derive(Debug, Clone)]
struct RenderedConfig {
    browser: BrowserSettings,
    scraper: ScraperSettings,
}

/// 批处理协调器
///
/// 负责规范化输入、管理批处理范围内的浏览器会话、
/// 通过有界工作池抓取所有域名并汇总结果
pub struct BatchCoordinator {
    sources: Vec<Arc<dyn PageSource>>,
    rendered: Option<RenderedConfig>,
    matcher: EmailMatcher,
    pacer: Arc<HostPacer>,
    options: BatchOptions,
}

impl BatchCoordinator {
    /// 创建协调器
    ///
    /// # 参数
    ///
    /// * `sources` - 每个批处理共享的页面来源，按顺序尝试
    /// * `matcher` - 邮箱匹配器
    /// * `pacer` - 按主机节流器
    /// * `options` - 批处理选项
    pub fn new(
        sources: Vec<Arc<dyn PageSource>>,
        matcher: EmailMatcher,
        pacer: HostPacer,
        options: BatchOptions,
    ) -> Self {
        Self {
            sources,
            rendered: None,
            matcher,
            pacer: Arc::new(pacer),
            options,
        }
    }

    /// 启用渲染回退
    ///
    /// 每个批处理会创建自己的浏览器会话，渲染来源排在已有来源之后
    pub fn with_browser(mut self, browser: BrowserSettings, scraper: ScraperSettings) -> Self {
        self.rendered = Some(RenderedConfig { browser, scraper });
        self
    }

    /// 根据配置创建协调器
    pub fn from_settings(settings: &Settings) -> Result<Self, HarvestError> {
        let static_source: Arc<dyn PageSource> =
            Arc::new(StaticPageSource::new(&settings.scraper)?);
        let matcher = EmailMatcher::new(EmailPolicy::from(&settings.email_policy));
        let pacer = HostPacer::new(Duration::from_millis(
            settings.pacing.min_host_interval_ms,
        ));

        info!(
            "Email policy denies {} domains and {} asset extensions",
            matcher.policy().denied_domains.len(),
            matcher.policy().asset_extensions.len()
        );
        if pacer.is_enabled() {
            info!("Pacing requests per host at {:?}", pacer.min_interval());
        } else {
            info!("Host pacing disabled");
        }

        let coordinator = Self::new(
            vec![static_source],
            matcher,
            pacer,
            BatchOptions::from(settings),
        );

        if settings.browser.enabled {
            Ok(coordinator.with_browser(settings.browser.clone(), settings.scraper.clone()))
        } else {
            info!("Rendered fallback disabled");
            Ok(coordinator)
        }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// 在独立任务中执行批处理
    ///
    /// 批处理内部（单个域名任务之外）发生 panic 时返回 `HarvestError::Internal`，
    /// 调用方总能得到一个结果
    pub async fn run_batch_isolated(
        self: &Arc<Self>,
        values: Vec<Value>,
    ) -> Result<BatchResult, HarvestError> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run_batch(&values).await })
            .await
            .unwrap_or_else(|e| Err(HarvestError::Internal(join_error_message(e))))
    }

    /// 执行一次批处理
    ///
    /// # 返回值
    ///
    /// * `Ok(BatchResult)` - 汇总结果，诊断记录与规范化后的域名一一对应
    /// * `Err(HarvestError::NoValidDomains)` - 输入中没有可用域名
    pub async fn run_batch(&self, values: &[Value]) -> Result<BatchResult, HarvestError> {
        let start = Instant::now();
        let domains = normalize_domains(values)?;

        let session = self
            .rendered
            .as_ref()
            .map(|cfg| Arc::new(BrowserSession::new(cfg.browser.clone())));

        let mut sources = self.sources.clone();
        if let (Some(session), Some(cfg)) = (&session, &self.rendered) {
            sources.push(Arc::new(RenderedPageSource::new(
                session.clone(),
                &cfg.scraper,
                &cfg.browser,
            )));
        }

        let fetcher = PageFetcher::new(sources);
        info!(
            "Starting batch of {} domains via {}",
            domains.len(),
            fetcher.source_names().join(" -> ")
        );

        let scraper = Arc::new(DomainScraper::new(
            fetcher,
            self.matcher.clone(),
            self.pacer.clone(),
            self.options.page_paths.clone(),
        ));
        let deadline = self
            .options
            .deadline
            .map(|d| tokio::time::Instant::now() + d);

        let records: Vec<DomainRecord> = stream::iter(domains)
            .map(|domain| scrape_domain(scraper.clone(), domain, deadline))
            .buffered(self.options.max_concurrent_domains.max(1))
            .collect()
            .await;

        if let Some(session) = session {
            if session.is_launched().await {
                info!("Rendered fallback was used, closing browser session");
            }
            session.close().await;
        }
        self.pacer.prune();

        let failures = records.iter().filter(|r| !r.is_success()).count();
        counter!("domains_scraped_total").increment(records.len() as u64);
        counter!("domain_failures_total").increment(failures as u64);
        histogram!("batch_duration_seconds").record(start.elapsed().as_secs_f64());

        let result = BatchResult::from_records(records);
        info!(
            "Batch finished in {}ms: {} unique emails, {} failed domains",
            start.elapsed().as_millis(),
            result.emails.len(),
            failures
        );
        Ok(result)
    }
}

/// 在独立任务中抓取单个域名
///
/// 任务 panic 或超过截止时间都会被转换为失败记录
async fn scrape_domain(
    scraper: Arc<DomainScraper>,
    domain: String,
    deadline: Option<tokio::time::Instant>,
) -> DomainRecord {
    if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
        warn!("Deadline passed before {} was started", domain);
        return DomainRecord::failed(domain, DEADLINE_EXCEEDED);
    }

    let task_domain = domain.clone();
    let mut handle = tokio::spawn(async move { scraper.scrape(&task_domain).await });

    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                warn!("Aborted {}: {}", domain, DEADLINE_EXCEEDED);
                return DomainRecord::failed(domain, DEADLINE_EXCEEDED);
            }
        },
        None => handle.await,
    };

    joined.unwrap_or_else(|e| {
        let message = join_error_message(e);
        error!("Scraping {} failed: {}", domain, message);
        DomainRecord::failed(domain, message)
    })
}

fn join_error_message(e: JoinError) -> String {
    if e.is_panic() {
        panic_message(e.into_panic())
    } else {
        "domain task was cancelled".to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "domain task panicked".to_string()
    }
}

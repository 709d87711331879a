// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use mailharvest::application::use_cases::batch_coordinator::{BatchCoordinator, BatchOptions};
use mailharvest::domain::services::email_matcher::EmailMatcher;
use mailharvest::domain::services::host_pacer::HostPacer;
use mailharvest::engines::traits::{FetchError, FetchStrategy, PageContent, PageSource};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
enum StubPage {
    Content(PageContent),
    Panic(String),
    Hang(Duration),
}

/// 按 URL 返回预设结果的页面来源，未登记的 URL 视为不可达
pub struct StubPageSource {
    strategy: FetchStrategy,
    name: &'static str,
    pages: HashMap<String, StubPage>,
    requests: Mutex<Vec<String>>,
    broken_name: bool,
}

impl StubPageSource {
    pub fn new(strategy: FetchStrategy, name: &'static str) -> Self {
        Self {
            strategy,
            name,
            pages: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            broken_name: false,
        }
    }

    /// `name()` 直接 panic，用于模拟批处理层面（而非单个域名）的崩溃
    pub fn with_broken_name(mut self) -> Self {
        self.broken_name = true;
        self
    }

    pub fn page(mut self, url: &str, text: &str, mailto: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            StubPage::Content(PageContent {
                text: text.to_string(),
                mailto_targets: mailto.iter().map(|m| m.to_string()).collect(),
            }),
        );
        self
    }

    pub fn panics_on(mut self, url: &str, message: &str) -> Self {
        self.pages
            .insert(url.to_string(), StubPage::Panic(message.to_string()));
        self
    }

    pub fn hangs_on(mut self, url: &str, duration: Duration) -> Self {
        self.pages.insert(url.to_string(), StubPage::Hang(duration));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PageSource for StubPageSource {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        self.requests.lock().push(url.to_string());
        let page = self.pages.get(url).cloned();
        match page {
            Some(StubPage::Content(content)) => Ok(content),
            Some(StubPage::Panic(message)) => panic!("{}", message),
            Some(StubPage::Hang(duration)) => {
                tokio::time::sleep(duration).await;
                Err(FetchError::Timeout)
            }
            None => Err(FetchError::Status(404)),
        }
    }

    fn strategy(&self) -> FetchStrategy {
        self.strategy
    }

    fn name(&self) -> &'static str {
        if self.broken_name {
            panic!("source registry corrupted");
        }
        self.name
    }
}

/// 使用给定来源、不做节流的协调器
pub fn coordinator(sources: Vec<Arc<dyn PageSource>>, options: BatchOptions) -> BatchCoordinator {
    BatchCoordinator::new(
        sources,
        EmailMatcher::default(),
        HostPacer::disabled(),
        options,
    )
}

/// acme.com 根页面只有 mailto 链接，beta.com 不可达
pub fn acme_site() -> StubPageSource {
    StubPageSource::new(FetchStrategy::Static, "static").page(
        "https://acme.com/",
        "Welcome to Acme",
        &["mailto:info@acme.com"],
    )
}

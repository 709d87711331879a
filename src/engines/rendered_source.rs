// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::{BrowserSettings, ScraperSettings};
use crate::engines::browser_session::BrowserSession;
use crate::engines::traits::{FetchError, FetchStrategy, PageContent, PageSource};
use crate::engines::validators;
use async_trait::async_trait;
use chromiumoxide::Page;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

const BODY_TEXT_SCRIPT: &str = "document.body ? document.body.innerText : ''";

const MAILTO_SCRIPT: &str = r#"Array.from(document.querySelectorAll('a[href^="mailto:" i]')).map(a => a.getAttribute('href'))"#;

/// 渲染抓取来源
///
/// 基于 chromiumoxide，在批处理共享的浏览器会话中为每次导航打开新页面
pub struct RenderedPageSource {
    session: Arc<BrowserSession>,
    user_agent: String,
    timeout: Duration,
    settle: Duration,
    allow_private_hosts: bool,
    allowed_hosts: Vec<String>,
}

impl RenderedPageSource {
    pub fn new(
        session: Arc<BrowserSession>,
        scraper: &ScraperSettings,
        browser: &BrowserSettings,
    ) -> Self {
        Self {
            session,
            user_agent: scraper.user_agent.clone(),
            timeout: scraper.rendered_timeout(),
            settle: Duration::from_millis(browser.settle_millis),
            allow_private_hosts: scraper.allow_private_hosts,
            allowed_hosts: scraper.private_host_allowlist.clone(),
        }
    }

    async fn read_page(&self, page: &Page, url: &str) -> Result<PageContent, FetchError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // goto waits for the load event
        page.goto(url)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        // Network-idle is not exposed, give late XHR content a moment instead.
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }

        let text: String = page
            .evaluate(BODY_TEXT_SCRIPT)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| FetchError::Render(e.to_string()))?;

        let mailto_targets: Vec<String> = page
            .evaluate(MAILTO_SCRIPT)
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| FetchError::Render(e.to_string()))?;

        Ok(PageContent {
            text,
            mailto_targets,
        })
    }
}

#[async_trait]
impl PageSource for RenderedPageSource {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        if !self.allow_private_hosts {
            validators::validate_url(url, &self.allowed_hosts).await?;
        }

        let start = Instant::now();
        let context = self.session.open_page().await?;

        let outcome = tokio::time::timeout(self.timeout, self.read_page(context.page(), url)).await;
        context.release().await;

        let content = outcome.map_err(|_| FetchError::Timeout)??;
        debug!(
            "Rendered fetch of {} read {} chars in {}ms",
            url,
            content.text.len(),
            start.elapsed().as_millis()
        );
        Ok(content)
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Rendered
    }

    fn name(&self) -> &'static str {
        "rendered"
    }
}

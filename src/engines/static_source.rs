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

use crate::config::settings::ScraperSettings;
use crate::domain::services::email_matcher::is_mailto;
use crate::engines::traits::{FetchError, FetchStrategy, PageContent, PageSource};
use crate::engines::validators;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug;
use url::Url;

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("link selector is valid"));

static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "body p, body div, body footer, body .contact, body .footer, body .email, body .contact-us",
    )
    .expect("text selector is valid")
});

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// 最多跟随的重定向次数
pub const MAX_REDIRECTS: usize = 10;

/// 静态抓取来源
///
/// 基于 reqwest 获取页面、基于 scraper 解析 HTML，看不到 JavaScript 渲染的内容。
/// 开启私有地址保护时重定向由本来源逐跳跟随，每一跳都重新校验目标地址
pub struct StaticPageSource {
    client: reqwest::Client,
    allow_private_hosts: bool,
    allowed_hosts: Vec<String>,
}

impl StaticPageSource {
    /// 创建静态抓取来源
    ///
    /// # 参数
    ///
    /// * `settings` - 抓取配置（User-Agent、超时、私有地址开关）
    pub fn new(settings: &ScraperSettings) -> Result<Self, FetchError> {
        let redirect = if settings.allow_private_hosts {
            Policy::limited(MAX_REDIRECTS)
        } else {
            Policy::none()
        };

        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.static_timeout())
            .cookie_store(true)
            .redirect(redirect)
            .build()?;

        Ok(Self {
            client,
            allow_private_hosts: settings.allow_private_hosts,
            allowed_hosts: settings.private_host_allowlist.clone(),
        })
    }

    /// 发送请求并在需要时逐跳跟随重定向
    async fn get_checked(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        if self.allow_private_hosts {
            return Ok(self.client.get(url).send().await?);
        }

        let mut current = Url::parse(url)?;
        for _ in 0..=MAX_REDIRECTS {
            validators::validate_url(current.as_str(), &self.allowed_hosts).await?;

            let response = self.client.get(current.clone()).send().await?;
            if !response.status().is_redirection() {
                return Ok(response);
            }

            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    FetchError::Redirect(format!("{} without Location header", response.status()))
                })?;
            let next = current.join(location)?;
            debug!("Following redirect {} -> {}", current, next);
            current = next;
        }

        Err(FetchError::Redirect(format!(
            "more than {} redirects",
            MAX_REDIRECTS
        )))
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError> {
        let start = Instant::now();
        let response = self.get_checked(url).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            "Static fetch of {} returned {} bytes in {}ms",
            url,
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(extract_page_content(&body))
    }

    fn strategy(&self) -> FetchStrategy {
        FetchStrategy::Static
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// 从静态 HTML 中提取 mailto 链接与联系相关区域的文本
///
/// 嵌套命中的元素只计算最外层一次，脚本与样式内容不计入文本。
/// 同一元素内的文本节点直接拼接，被行内标签拆开的地址保持完整
pub fn extract_page_content(html: &str) -> PageContent {
    let document = Html::parse_document(html);

    let mailto_targets = document
        .select(&LINK_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| is_mailto(href))
        .map(|href| href.trim().to_string())
        .collect();

    let mut matched = HashSet::new();
    let mut fragments = Vec::new();
    for element in document.select(&TEXT_SELECTOR) {
        let nested = element.ancestors().any(|a| matched.contains(&a.id()));
        matched.insert(element.id());
        if nested {
            continue;
        }
        let text = visible_text(element);
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            fragments.push(trimmed.to_string());
        }
    }

    PageContent {
        text: fragments.join(" "),
        mailto_targets,
    }
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut text = String::new();
    for node in element.descendants() {
        let Some(chunk) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element())
            .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()));
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}

#[cfg(test)]
#[path = "static_source_test.rs"]
mod tests;

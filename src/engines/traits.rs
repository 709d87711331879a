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

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 页面抓取错误类型
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求失败
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// 页面 URL 无法解析
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// 非 2xx 响应
    #[error("Unexpected status code: {0}")]
    Status(u16),
    /// 重定向无法跟随（缺少 Location 或超过跳转上限）
    #[error("Redirect error: {0}")]
    Redirect(String),
    /// 目标地址被 SSRF 保护拦截
    #[error("Blocked: {0}")]
    Blocked(String),
    /// 浏览器会话或页面错误
    #[error("Browser error: {0}")]
    Browser(String),
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 页面内容读取失败
    #[error("Render error: {0}")]
    Render(String),
}

/// 抓取策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStrategy {
    /// 静态 HTTP 抓取
    Static,
    /// 无头浏览器渲染抓取
    Rendered,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStrategy::Static => "static",
            FetchStrategy::Rendered => "rendered",
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个页面提取出的原始内容
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContent {
    /// 页面可见文本
    pub text: String,
    /// mailto 链接的原始 href
    pub mailto_targets: Vec<String>,
}

/// 页面来源特质
///
/// 每种实现代表一种抓取策略，由 `PageFetcher` 按顺序调用
#[async_trait]
pub trait PageSource: Send + Sync {
    /// 抓取页面并提取文本与 mailto 链接
    async fn fetch(&self, url: &str) -> Result<PageContent, FetchError>;

    /// 该来源对应的抓取策略
    fn strategy(&self) -> FetchStrategy;

    /// 来源名称
    fn name(&self) -> &'static str;
}

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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 默认桌面浏览器标识
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、抓取、浏览器、节流、并发、批处理和邮箱过滤策略等所有配置项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取配置
    pub scraper: ScraperSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 按主机节流配置
    pub pacing: PacingSettings,
    /// 并发控制配置
    pub concurrency: ConcurrencySettings,
    /// 批处理配置
    pub batch: BatchSettings,
    /// 邮箱过滤策略配置
    pub email_policy: EmailPolicySettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 静态抓取超时时间（秒）
    pub static_timeout_secs: u64,
    /// 渲染抓取超时时间（秒）
    pub rendered_timeout_secs: u64,
    /// 每个域名下依次尝试的路径后缀
    pub page_paths: Vec<String>,
    /// 是否允许访问私有地址（仅用于测试）
    pub allow_private_hosts: bool,
    /// 不做私有地址检查的主机名（如内网预发环境）
    pub private_host_allowlist: Vec<String>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            static_timeout_secs: 10,
            rendered_timeout_secs: 15,
            page_paths: vec![String::new(), "/contact".to_string()],
            allow_private_hosts: false,
            private_host_allowlist: Vec::new(),
        }
    }
}

impl ScraperSettings {
    pub fn static_timeout(&self) -> Duration {
        Duration::from_secs(self.static_timeout_secs)
    }

    pub fn rendered_timeout(&self) -> Duration {
        Duration::from_secs(self.rendered_timeout_secs)
    }
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// 是否启用渲染回退
    pub enabled: bool,
    /// 远程 Chrome 调试地址，设置后不再本地启动浏览器
    pub remote_debugging_url: Option<String>,
    /// Chrome 可执行文件路径
    pub executable: Option<String>,
    /// 同时打开的页面上限
    pub max_open_pages: usize,
    /// 导航完成后的额外等待时间（毫秒）
    pub settle_millis: u64,
    /// CDP 请求超时时间（秒）
    pub request_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            remote_debugging_url: None,
            executable: None,
            max_open_pages: 2,
            settle_millis: 500,
            request_timeout_secs: 30,
        }
    }
}

/// 按主机节流配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    /// 同一主机两次请求之间的最小间隔（毫秒），0 表示不限制
    pub min_host_interval_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            min_host_interval_ms: 2000,
        }
    }
}

/// 并发控制配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConcurrencySettings {
    /// 同时处理的域名数量
    pub max_concurrent_domains: usize,
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            max_concurrent_domains: 1,
        }
    }
}

/// 批处理配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// 整批处理的截止时间（秒），0 表示不限制
    pub deadline_secs: u64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { deadline_secs: 300 }
    }
}

impl BatchSettings {
    pub fn deadline(&self) -> Option<Duration> {
        (self.deadline_secs > 0).then(|| Duration::from_secs(self.deadline_secs))
    }
}

/// 邮箱过滤策略配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailPolicySettings {
    /// 拒绝的邮箱域名（占位域名与公共邮箱服务商）
    pub denied_domains: Vec<String>,
    /// 被视为图片资源的域名后缀
    pub asset_extensions: Vec<String>,
    /// 是否拒绝包含 `@2x` 的候选项
    pub reject_scale_suffix: bool,
}

impl Default for EmailPolicySettings {
    fn default() -> Self {
        Self {
            denied_domains: ["example.com", "test.com", "gmail.com", "yahoo.com", "hotmail.com"]
                .iter()
                .map(|d| d.to_string())
                .collect(),
            asset_extensions: ["jpg", "png", "gif", "jpeg", "svg", "webp"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
            reject_scale_suffix: true,
        }
    }
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// 是否启用 Prometheus 导出
    pub enabled: bool,
    /// Prometheus 监听端口
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9000,
        }
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与
    /// `MAILHARVEST__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("MAILHARVEST")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scraper.page_paths")
                    .with_list_parse_key("scraper.private_host_allowlist")
                    .with_list_parse_key("email_policy.denied_domains")
                    .with_list_parse_key("email_policy.asset_extensions"),
            );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::FetchError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 一次批处理共享的无头浏览器会话
///
/// 浏览器在第一次渲染回退时才启动，之后所有导航复用同一个进程，
/// 由批处理协调器在结束时调用 `close` 关闭。
pub struct BrowserSession {
    settings: BrowserSettings,
    browser: Mutex<Option<Browser>>,
    handler: parking_lot::Mutex<Option<JoinHandle<()>>>,
    launch_error: parking_lot::Mutex<Option<String>>,
    page_slots: Semaphore,
}

impl BrowserSession {
    pub fn new(settings: BrowserSettings) -> Self {
        let slots = settings.max_open_pages.max(1);
        Self {
            settings,
            browser: Mutex::new(None),
            handler: parking_lot::Mutex::new(None),
            launch_error: parking_lot::Mutex::new(None),
            page_slots: Semaphore::new(slots),
        }
    }

    /// 浏览器是否已经启动
    pub async fn is_launched(&self) -> bool {
        self.browser.lock().await.is_some()
    }

    /// 打开一个新的页面上下文
    ///
    /// 同时打开的页面数量受 `max_open_pages` 限制，许可随 `PageContext` 一起释放
    pub async fn open_page(&self) -> Result<PageContext<'_>, FetchError> {
        let permit = self
            .page_slots
            .acquire()
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        let mut guard = self.browser.lock().await;
        if guard.is_none() {
            // A failed launch is not retried within the same batch.
            if let Some(reason) = self.launch_error.lock().clone() {
                return Err(FetchError::Browser(reason));
            }
            match self.launch().await {
                Ok(browser) => *guard = Some(browser),
                Err(e) => {
                    *self.launch_error.lock() = Some(e.to_string());
                    return Err(e);
                }
            }
        }
        let browser = guard
            .as_ref()
            .ok_or_else(|| FetchError::Browser("browser session is not available".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| FetchError::Browser(e.to_string()))?;

        Ok(PageContext {
            page,
            released: false,
            _permit: permit,
        })
    }

    async fn launch(&self) -> Result<Browser, FetchError> {
        let (browser, mut handler) = if let Some(url) = &self.settings.remote_debugging_url {
            info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url.as_str())
                .await
                .map_err(|e| FetchError::Browser(format!("Failed to connect to remote Chrome: {}", e)))?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(Duration::from_secs(self.settings.request_timeout_secs))
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage");
            if let Some(path) = &self.settings.executable {
                builder = builder.chrome_executable(path);
            }

            info!("Launching headless Chrome for rendered fallback");
            Browser::launch(builder.build().map_err(FetchError::Browser)?)
                .await
                .map_err(|e| FetchError::Browser(format!("Failed to launch Chrome: {}", e)))?
        };

        let task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        *self.handler.lock() = Some(task);

        Ok(browser)
    }

    /// 关闭浏览器会话，未启动时不做任何事
    pub async fn close(&self) {
        let browser = self.browser.lock().await.take();
        if let Some(mut browser) = browser {
            // A remote Chrome is shared with other clients and stays up.
            if self.settings.remote_debugging_url.is_none() {
                if let Err(e) = browser.close().await {
                    warn!("Failed to close browser cleanly: {}", e);
                }
                if let Err(e) = browser.wait().await {
                    debug!("Browser process wait failed: {}", e);
                }
            }
            info!("Browser session closed");
        }
        if let Some(task) = self.handler.lock().take() {
            task.abort();
        }
    }
}

/// 单次导航使用的页面上下文
///
/// 调用 `release` 关闭页面；若在释放前被丢弃（错误或取消），
/// 会在后台关闭页面
pub struct PageContext<'a> {
    page: Page,
    released: bool,
    _permit: SemaphorePermit<'a>,
}

impl PageContext<'_> {
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 关闭页面并释放许可
    pub async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.page.clone().close().await {
            debug!("Failed to close page: {}", e);
        }
    }
}

impl Drop for PageContext<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let page = self.page.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

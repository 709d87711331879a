// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// 按主机的最小请求间隔控制
///
/// 每个主机一个令牌桶，容量为 1，间隔为 `min_interval`
pub struct HostPacer {
    limiter: Option<DefaultKeyedRateLimiter<String>>,
    min_interval: Duration,
}

impl HostPacer {
    /// 创建节流器，间隔为 0 时不做限制
    pub fn new(min_interval: Duration) -> Self {
        Self {
            limiter: Quota::with_period(min_interval).map(RateLimiter::keyed),
            min_interval,
        }
    }

    /// 不做任何限制的节流器
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// 当前记录的主机数量
    pub fn tracked_hosts(&self) -> usize {
        self.limiter.as_ref().map_or(0, |l| l.len())
    }

    /// 清理已经恢复到初始状态的主机记录
    ///
    /// 间隔已过的主机与从未请求过的主机等价，可以安全丢弃
    pub fn prune(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// 等待直到允许向该 URL 的主机发起请求
    pub async fn until_ready(&self, url: &Url) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();

        if limiter.check_key(&host).is_ok() {
            return;
        }
        debug!("Pacing request to {} ({:?} minimum interval)", host, self.min_interval);
        limiter.until_key_ready(&host).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_disabled_pacer_never_waits() {
        let pacer = HostPacer::disabled();
        assert!(!pacer.is_enabled());

        let start = Instant::now();
        for _ in 0..5 {
            pacer.until_ready(&url("https://acme.com/")).await;
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_same_host_is_spaced() {
        let pacer = HostPacer::new(Duration::from_millis(200));

        let start = Instant::now();
        pacer.until_ready(&url("https://acme.com/")).await;
        pacer.until_ready(&url("https://acme.com/contact")).await;

        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_prune_drops_idle_hosts() {
        let pacer = HostPacer::new(Duration::from_millis(1));
        for i in 0..500 {
            pacer.until_ready(&url(&format!("https://host{}.com/", i))).await;
        }
        assert_eq!(pacer.tracked_hosts(), 500);

        tokio::time::sleep(Duration::from_millis(50)).await;
        pacer.prune();

        assert_eq!(pacer.tracked_hosts(), 0);
    }

    #[tokio::test]
    async fn test_prune_keeps_recent_hosts() {
        let pacer = HostPacer::new(Duration::from_secs(60));
        pacer.until_ready(&url("https://acme.com/")).await;

        pacer.prune();

        assert_eq!(pacer.tracked_hosts(), 1);
    }

    #[tokio::test]
    async fn test_different_hosts_are_independent() {
        let pacer = HostPacer::new(Duration::from_secs(5));

        let start = Instant::now();
        pacer.until_ready(&url("https://acme.com/")).await;
        pacer.until_ready(&url("https://beta.com/")).await;
        pacer.until_ready(&url("https://gamma.com/contact")).await;

        assert!(start.elapsed() < Duration::from_secs(1));
    }
}

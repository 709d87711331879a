// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::MetricsSettings;
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{Ipv4Addr, SocketAddr};
use tracing::{info, warn};

/// 初始化指标系统
///
/// 安装 Prometheus 导出器并注册抓取相关的指标说明。
/// 导出器安装失败（例如端口被占用）只记录警告，不影响抓取服务
pub fn init_metrics(settings: &MetricsSettings) {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port));

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }
    info!("Metrics exporter listening on {}", addr);

    describe_counter!(
        "pages_fetched_total",
        "Total number of pages fetched, labelled by strategy"
    );
    describe_counter!(
        "page_fetch_failures_total",
        "Total number of failed page fetch attempts, labelled by source"
    );
    describe_counter!("emails_found_total", "Total number of valid emails found");
    describe_counter!(
        "emails_filtered_total",
        "Total number of candidates rejected by validation or policy"
    );
    describe_counter!("domains_scraped_total", "Total number of domains processed");
    describe_counter!(
        "domain_failures_total",
        "Total number of domains recorded as failed"
    );
    describe_histogram!("batch_duration_seconds", "Duration of batches in seconds");
}

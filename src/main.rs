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

use mailharvest::application::use_cases::batch_coordinator::BatchCoordinator;
use mailharvest::config::settings::Settings;
use mailharvest::infrastructure::metrics;
use mailharvest::presentation::routes;
use mailharvest::utils::telemetry;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting mailharvest...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    if settings.metrics.enabled {
        metrics::init_metrics(&settings.metrics);
    }

    // 4. Build the batch coordinator
    let coordinator = Arc::new(BatchCoordinator::from_settings(&settings)?);
    info!(
        "Batch coordinator ready (max {} concurrent domains, rendered fallback {})",
        coordinator.options().max_concurrent_domains,
        if settings.browser.enabled { "on" } else { "off" }
    );

    // 5. Start server
    let app = routes::routes(coordinator);
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

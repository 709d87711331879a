// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    application::{
        dto::email_scrape_request::EmailScrapeRequestDto,
        use_cases::batch_coordinator::BatchCoordinator,
    },
    domain::models::batch_result::BatchResult,
    presentation::errors::{AppError, NO_DOMAINS_SUPPLIED},
};

/// 邮箱抓取处理器
///
/// 同步执行整个批处理，成功时总是返回诊断记录；
/// 批处理任务崩溃时返回 500
pub async fn scrape_emails(
    Extension(coordinator): Extension<Arc<BatchCoordinator>>,
    Json(payload): Json<EmailScrapeRequestDto>,
) -> Result<Json<BatchResult>, AppError> {
    if let Err(errors) = payload.validate() {
        warn!("Rejected email scrape request: {}", errors);
        return Err(AppError::Validation(NO_DOMAINS_SUPPLIED.to_string()));
    }

    info!("Email scrape requested for {} values", payload.domains.len());
    let result = coordinator.run_batch_isolated(payload.domains).await?;
    Ok(Json(result))
}

// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::utils::errors::HarvestError;

pub const NO_DOMAINS_SUPPLIED: &str = "No domains supplied";
pub const PROCESSING_FAILED: &str = "Failed to process the request";

/// 应用错误类型
///
/// 把请求校验失败与批处理错误转换为统一的 JSON 错误响应
#[derive(Debug)]
pub enum AppError {
    /// 请求参数不合法
    Validation(String),
    /// 批处理失败
    Harvest(HarvestError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Harvest(HarvestError::NoValidDomains) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": HarvestError::NoValidDomains.to_string() })),
            )
                .into_response(),
            AppError::Harvest(e) => {
                error!("Batch failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": PROCESSING_FAILED, "debug": [] })),
                )
                    .into_response()
            }
        }
    }
}

impl From<HarvestError> for AppError {
    fn from(err: HarvestError) -> Self {
        AppError::Harvest(err)
    }
}

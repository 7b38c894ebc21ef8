//! 定时任务 HTTP 入口
//!
//! 供外部调度器（如平台 cron）调用，使用独立的 Bearer 密钥而不是用户 JWT。

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{error, warn};

use crate::state::AppState;

const SUMMARY_FAILED: &str = "Budget summary failed";

#[derive(Debug, Default, Deserialize)]
pub struct CronParams {
    /// 跳过周一 8 点的触发窗口检查
    #[serde(default)]
    pub force: bool,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// 比较摘要而不是原文，避免按前缀逐字节泄露耗时差异
fn secret_matches(token: &str, secret: &str) -> bool {
    !secret.is_empty() && digest(token) == digest(secret)
}

/// GET|POST /api/cron/budget-summary
pub async fn budget_summary(
    State(state): State<AppState>,
    Query(params): Query<CronParams>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Response {
    let authorized = auth
        .map(|TypedHeader(Authorization(bearer))| secret_matches(bearer.token(), &state.cron_secret))
        .unwrap_or(false);
    if !authorized {
        warn!("定时任务入口鉴权失败");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response();
    }

    match state.summary_job.run(Utc::now(), params.force).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        // 底层错误只进日志
        Err(e) => {
            error!(error = %e, "预算汇总失败");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": SUMMARY_FAILED })),
            )
                .into_response()
        }
    }
}

//! 应用状态定义

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtManager;
use crate::crud::RecordStore;
use crate::summary::BudgetSummaryJob;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL 连接池，登录与健康检查直接使用
    pub pool: PgPool,
    pub jwt_manager: Arc<JwtManager>,
    /// 所有实体共用的记录存储
    pub records: Arc<dyn RecordStore>,
    pub summary_job: Arc<BudgetSummaryJob>,
    /// 调用 `/api/cron/budget-summary` 所需的 Bearer 密钥
    pub cron_secret: Arc<str>,
}

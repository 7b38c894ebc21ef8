//! 每周预算汇总调度 Worker
//!
//! 按 cron 表达式（默认 `0 0 8 * * Mon`，按配置时区解释）计算下一次触发时间，
//! 睡眠到点后执行 [`BudgetSummaryJob`]。与 cron HTTP 入口共用同一个任务。

use std::str::FromStr;
use std::sync::Arc;

use budget_shared::observability::metrics;
use chrono::{DateTime, Utc};
use cron::Schedule;
use tracing::{error, info, warn};

use crate::error::{AdminError, Result};
use crate::summary::BudgetSummaryJob;

pub struct SummaryWorker {
    job: Arc<BudgetSummaryJob>,
    schedule: Schedule,
}

impl SummaryWorker {
    pub fn new(job: Arc<BudgetSummaryJob>, expression: &str) -> Result<Self> {
        let schedule = Schedule::from_str(expression)
            .map_err(|e| AdminError::Validation(format!("无效的 cron 表达式 '{}': {}", expression, e)))?;
        Ok(Self { job, schedule })
    }

    /// `after` 之后的下一次触发时间（UTC）
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let tz = self.job.timezone();
        self.schedule
            .after(&after.with_timezone(&tz))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    /// 主循环：直到进程退出
    pub async fn run(&self) {
        info!(timezone = %self.job.timezone(), "SummaryWorker 已启动");

        loop {
            let now = Utc::now();
            let Some(next) = self.next_fire_after(now) else {
                warn!("cron 表达式没有后续触发时间，SummaryWorker 退出");
                return;
            };

            let wait = (next - now).to_std().unwrap_or_default();
            info!(next_run = %next, "等待下一次预算汇总");
            tokio::time::sleep(wait).await;

            match self.job.run(Utc::now(), false).await {
                Ok(result) if result.skipped => {
                    info!(reason = ?result.reason, "预算汇总已跳过");
                }
                Ok(result) => {
                    info!(
                        emails_sent = result.emails_sent,
                        emails_failed = result.emails_failed,
                        "定时预算汇总完成"
                    );
                }
                Err(e) => error!(error = %e, "定时预算汇总失败"),
            }

            metrics::set_worker_last_run("summary_worker");
        }
    }
}

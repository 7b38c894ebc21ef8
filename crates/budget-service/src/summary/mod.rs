//! 每周预算汇总
//!
//! 统计当月各分类的支出与预算，找出超支和接近上限的分类，
//! 给每位未被封禁的成员发送一封汇总邮件。
//! 定时 Worker 与 `/api/cron/budget-summary` 调用的是同一个 [`BudgetSummaryJob`]。

mod classify;
mod store;

pub use classify::{Classification, classify};
pub use store::{BudgetedCategory, PgSummaryStore, SummaryStore};

#[cfg(test)]
pub use store::MockSummaryStore;

use std::sync::Arc;

use budget_notifier::{EmailSender, SummaryEmailTemplate};
use budget_shared::config::SummaryConfig;
use budget_shared::error::BudgetError;
use budget_shared::events::{BudgetDigest, NearLimitCategory, OverBudgetCategory};
use budget_shared::observability::metrics;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{AdminError, Result};

/// 触发窗口：本地时间周一 8 点整点内
const TRIGGER_WEEKDAY: Weekday = Weekday::Mon;
const TRIGGER_HOUR: u32 = 8;

/// 一次汇总的执行结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummaryResult {
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    pub recipients: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub over_budget_count: usize,
    pub near_limit_count: usize,
    pub over_budget: Vec<OverBudgetCategory>,
    pub near_limit: Vec<NearLimitCategory>,
}

impl BudgetSummaryResult {
    fn skipped(reason: impl Into<String>, month: Option<String>) -> Self {
        Self {
            skipped: true,
            reason: Some(reason.into()),
            month,
            ..Self::default()
        }
    }
}

/// 预算汇总任务
pub struct BudgetSummaryJob {
    store: Arc<dyn SummaryStore>,
    sender: Arc<dyn EmailSender>,
    tz: Tz,
    near_limit_percent: u32,
    from_address: String,
    app_url: String,
}

impl BudgetSummaryJob {
    pub fn new(
        store: Arc<dyn SummaryStore>,
        sender: Arc<dyn EmailSender>,
        config: &SummaryConfig,
        from_address: impl Into<String>,
    ) -> std::result::Result<Self, BudgetError> {
        Ok(Self {
            store,
            sender,
            tz: config.tz()?,
            near_limit_percent: config.near_limit_percent,
            from_address: from_address.into(),
            app_url: config.app_url.clone(),
        })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// `now` 换算到配置时区后是否落在周一 8 点
    pub fn in_trigger_window(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.tz);
        local.weekday() == TRIGGER_WEEKDAY && local.hour() == TRIGGER_HOUR
    }

    /// 执行一次汇总
    ///
    /// `force` 只跳过触发窗口检查，其余流程不变。
    /// 跳过返回 `Ok` 且 `skipped = true`；存储出错返回 `Err`。
    pub async fn run(&self, now: DateTime<Utc>, force: bool) -> Result<BudgetSummaryResult> {
        if !force && !self.in_trigger_window(now) {
            metrics::record_summary_run("skipped");
            return Ok(BudgetSummaryResult::skipped("Not Monday 8am Pacific time", None));
        }

        match self.summarize(now).await {
            Ok(result) => {
                metrics::record_summary_run(if result.skipped { "skipped" } else { "completed" });
                Ok(result)
            }
            Err(e) => {
                metrics::record_summary_run("failed");
                Err(e)
            }
        }
    }

    async fn summarize(&self, now: DateTime<Utc>) -> Result<BudgetSummaryResult> {
        let today = now.with_timezone(&self.tz).date_naive();
        let month_start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
            .ok_or_else(|| AdminError::Internal(format!("无法计算月初: {today}")))?;
        let month_label = today.format("%B %Y").to_string();

        let budgets = self
            .store
            .monthly_budgets(today.year(), today.month() as i32)
            .await?;
        if budgets.is_empty() {
            info!(month = %month_label, "当月没有预算，跳过汇总");
            return Ok(BudgetSummaryResult::skipped(
                format!("No budgets found for {month_label}"),
                Some(month_label),
            ));
        }

        let category_ids = budgets.iter().map(|b| b.category_id).collect();
        let spending = self
            .store
            .spending_by_category(category_ids, month_start, today)
            .await?;
        let Classification {
            over_budget,
            near_limit,
        } = classify(&budgets, &spending, self.near_limit_percent);

        let recipients = self.store.recipients().await?;
        let digest = BudgetDigest {
            month_label: month_label.clone(),
            over_budget,
            near_limit,
            app_url: self.app_url.clone(),
        };

        let mut emails_sent = 0;
        let mut emails_failed = 0;
        for recipient in &recipients {
            let message = SummaryEmailTemplate::render(recipient, &digest)
                .into_message(&self.from_address, recipient);
            match self.sender.send(&message).await {
                Ok(_) => {
                    emails_sent += 1;
                    metrics::record_summary_email("sent");
                }
                Err(e) => {
                    emails_failed += 1;
                    metrics::record_summary_email("failed");
                    warn!(
                        recipient = %recipient.email,
                        provider = self.sender.provider(),
                        error = %e,
                        "汇总邮件发送失败"
                    );
                }
            }
        }

        info!(
            month = %month_label,
            recipients = recipients.len(),
            emails_sent,
            emails_failed,
            over_budget = digest.over_budget.len(),
            near_limit = digest.near_limit.len(),
            "预算汇总完成"
        );

        Ok(BudgetSummaryResult {
            skipped: false,
            reason: None,
            month: Some(month_label),
            recipients: recipients.len(),
            emails_sent,
            emails_failed,
            over_budget_count: digest.over_budget.len(),
            near_limit_count: digest.near_limit.len(),
            over_budget: digest.over_budget,
            near_limit: digest.near_limit,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use budget_notifier::{EmailMessage, EmailSender, NotificationError, SendResult};

    mockall::mock! {
        pub Sender {}

        #[async_trait]
        impl EmailSender for Sender {
            async fn send(&self, message: &EmailMessage) -> Result<SendResult, NotificationError>;
            fn provider(&self) -> &'static str;
        }
    }
}

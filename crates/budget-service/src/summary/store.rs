//! 汇总任务的数据读取

use std::collections::HashMap;

use async_trait::async_trait;
use budget_shared::events::Recipient;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::Result;

/// 某分类在当月的预算（同分类多条预算已合计）
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct BudgetedCategory {
    pub category_id: Uuid,
    pub category_name: String,
    pub budget_amount: Decimal,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// 指定年月的预算，按分类合计
    async fn monthly_budgets(&self, year: i32, month: i32) -> Result<Vec<BudgetedCategory>>;

    /// 给定分类在 `[from, to]` 日期范围内的支出合计，没有支出的分类不出现
    async fn spending_by_category(
        &self,
        category_ids: Vec<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<Uuid, Decimal>>;

    /// 未被封禁且有邮箱的用户
    async fn recipients(&self) -> Result<Vec<Recipient>>;
}

#[derive(Clone)]
pub struct PgSummaryStore {
    pool: PgPool,
}

impl PgSummaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SummaryStore for PgSummaryStore {
    async fn monthly_budgets(&self, year: i32, month: i32) -> Result<Vec<BudgetedCategory>> {
        let rows = sqlx::query_as::<_, BudgetedCategory>(
            r#"
            SELECT c.id AS category_id, c.name AS category_name, SUM(b.amount) AS budget_amount
            FROM budgets b
            INNER JOIN categories c ON c.id = b.category_id
            WHERE b.year = $1 AND b.month = $2
            GROUP BY c.id, c.name
            ORDER BY c.name
            "#,
        )
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn spending_by_category(
        &self,
        category_ids: Vec<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashMap<Uuid, Decimal>> {
        let rows: Vec<(Uuid, Decimal)> = sqlx::query_as(
            r#"
            SELECT category_id, SUM(amount)
            FROM transactions
            WHERE category_id = ANY($1) AND date >= $2 AND date <= $3
            GROUP BY category_id
            "#,
        )
        .bind(&category_ids)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn recipients(&self) -> Result<Vec<Recipient>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT name, email
            FROM users
            WHERE is_banned = FALSE AND email IS NOT NULL AND TRIM(email) <> ''
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(name, email)| Recipient { name, email })
            .collect())
    }
}

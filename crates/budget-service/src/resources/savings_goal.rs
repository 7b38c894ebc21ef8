//! 储蓄目标
//!
//! `current_amount` 不接受客户端输入，只由存入记录汇总得出。

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{money, not_blank, positive_amount};
use crate::crud::{Fields, HookContext, Resource, empty_string_as_none, string_or_number};
use crate::error::{AdminError, Result};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoalInput {
    #[validate(
        length(min = 1, max = 100, message = "目标名称长度必须在1-100个字符之间"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "positive_amount"))]
    pub target_amount: Decimal,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SavingsGoals;

#[async_trait]
impl Resource for SavingsGoals {
    const TABLE: &'static str = "savings_goals";
    const ENTITY: &'static str = "savings goal";
    type Input = SavingsGoalInput;

    fn into_fields(&self, input: SavingsGoalInput) -> Fields {
        Fields::new()
            .with("name", input.name.trim())
            .with("target_amount", money(input.target_amount))
            .with("target_date", input.target_date)
            .with("user_id", input.user_id)
    }

    async fn before_delete(&self, ctx: &HookContext<'_>, id: Uuid) -> Result<()> {
        let contributions = ctx
            .store
            .count_where("contributions", "savings_goal_id", id)
            .await?;
        if contributions > 0 {
            return Err(AdminError::Rejected(format!(
                "Cannot delete savings goal: it has {contributions} contribution(s)"
            )));
        }
        Ok(())
    }
}

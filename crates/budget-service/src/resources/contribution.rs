//! 储蓄目标的存入记录
//!
//! 每次增删改后重新汇总所属目标的 `current_amount`，保证两者一致。

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use super::{money, positive_amount};
use crate::crud::{
    Fields, HookContext, Record, Resource, empty_string_as_none, record_uuid, string_or_number,
    trimmed,
};
use crate::error::{AdminError, Result};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContributionInput {
    pub savings_goal_id: Uuid,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 500, message = "备注最长 500 字符"))]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Contributions;

impl Contributions {
    /// 按存入记录重新计算目标金额
    async fn recompute_goal(ctx: &HookContext<'_>, record: &Record) -> Result<()> {
        let Some(goal_id) = record_uuid(record, "savings_goal_id") else {
            return Err(AdminError::Internal("存入记录缺少 savings_goal_id".to_string()));
        };

        let total = ctx
            .store
            .sum_where("contributions", "amount", "savings_goal_id", goal_id)
            .await?;
        let fields = Fields::new()
            .with("current_amount", total)
            .with("updated_at", ctx.now)
            .with("updated_by", ctx.actor.id);

        ctx.store
            .update("savings_goals", goal_id, fields)
            .await?
            .ok_or_else(|| AdminError::not_found("savings goal", goal_id))?;

        debug!(goal_id = %goal_id, total = %total, "储蓄目标金额已更新");
        Ok(())
    }
}

#[async_trait]
impl Resource for Contributions {
    const TABLE: &'static str = "contributions";
    const ENTITY: &'static str = "contribution";
    type Input = ContributionInput;

    fn into_fields(&self, input: ContributionInput) -> Fields {
        Fields::new()
            .with("savings_goal_id", input.savings_goal_id)
            .with("amount", money(input.amount))
            .with("date", input.date)
            .with("note", trimmed(input.note))
            .with("user_id", input.user_id)
    }

    /// 不允许把存入记录挪到另一个目标，否则原目标的金额无法同步
    async fn before_update(&self, ctx: &HookContext<'_>, id: Uuid, fields: &Fields) -> Result<()> {
        let Some(existing) = ctx.store.get(Self::TABLE, id).await? else {
            return Err(AdminError::not_found(Self::ENTITY, id));
        };
        let requested = fields.get("savings_goal_id").and_then(|v| v.as_uuid());
        if requested.is_some() && requested != record_uuid(&existing, "savings_goal_id") {
            return Err(AdminError::Rejected(
                "Cannot move a contribution to a different savings goal".to_string(),
            ));
        }
        Ok(())
    }

    async fn after_create(&self, ctx: &HookContext<'_>, record: &Record) -> Result<()> {
        Self::recompute_goal(ctx, record).await
    }

    async fn after_update(&self, ctx: &HookContext<'_>, record: &Record) -> Result<()> {
        Self::recompute_goal(ctx, record).await
    }

    async fn after_delete(&self, ctx: &HookContext<'_>, record: &Record) -> Result<()> {
        Self::recompute_goal(ctx, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::{FieldValue, MockRecordStore};
    use crate::resources::test_support::{actor, ctx};
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[tokio::test]
    async fn test_after_create_recomputes_goal_total() {
        let goal_id = Uuid::now_v7();
        let mut store = MockRecordStore::new();
        store
            .expect_sum_where()
            .with(eq("contributions"), eq("amount"), eq("savings_goal_id"), eq(goal_id))
            .times(1)
            .returning(|_, _, _, _| Ok(dec!(350.00)));
        store
            .expect_update()
            .withf(move |table, id, fields| {
                table == "savings_goals"
                    && *id == goal_id
                    && fields.get("current_amount").and_then(FieldValue::as_decimal)
                        == Some(dec!(350.00))
            })
            .times(1)
            .returning(|_, _, _| Ok(Some(json!({}))));

        let actor = actor();
        let record = json!({ "id": Uuid::now_v7(), "savings_goal_id": goal_id, "amount": 50.0 });
        Contributions
            .after_create(&ctx(&store, &actor), &record)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_after_delete_with_missing_goal_is_not_found() {
        let mut store = MockRecordStore::new();
        store.expect_sum_where().returning(|_, _, _, _| Ok(dec!(0)));
        store.expect_update().returning(|_, _, _| Ok(None));

        let actor = actor();
        let record = json!({ "savings_goal_id": Uuid::now_v7() });
        let err = Contributions
            .after_delete(&ctx(&store, &actor), &record)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_cannot_move_to_other_goal() {
        let id = Uuid::now_v7();
        let original_goal = Uuid::now_v7();
        let mut store = MockRecordStore::new();
        store
            .expect_get()
            .with(eq("contributions"), eq(id))
            .returning(move |_, _| Ok(Some(json!({ "savings_goal_id": original_goal }))));

        let actor = actor();
        let moved = Fields::new().with("savings_goal_id", Uuid::now_v7());
        let err = Contributions
            .before_update(&ctx(&store, &actor), id, &moved)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Rejected(_)));

        let same = Fields::new().with("savings_goal_id", original_goal);
        assert!(
            Contributions
                .before_update(&ctx(&store, &actor), id, &same)
                .await
                .is_ok()
        );
    }
}

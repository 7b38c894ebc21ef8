//! 月度预算
//!
//! 同一分类同一月份允许存在多条预算，汇总时按分类求和。

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{money, non_negative_amount};
use crate::crud::{Fields, Resource, empty_string_as_none, string_or_number};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInput {
    pub category_id: Uuid,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "non_negative_amount"))]
    pub amount: Decimal,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(range(min = 1, max = 12, message = "月份必须在 1-12 之间"))]
    pub month: i32,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(range(min = 2000, max = 2100, message = "年份必须在 2000-2100 之间"))]
    pub year: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Budgets;

#[async_trait]
impl Resource for Budgets {
    const TABLE: &'static str = "budgets";
    const ENTITY: &'static str = "budget";
    type Input = BudgetInput;

    fn into_fields(&self, input: BudgetInput) -> Fields {
        Fields::new()
            .with("category_id", input.category_id)
            .with("amount", money(input.amount))
            .with("month", input.month)
            .with("year", input.year)
            .with("user_id", input.user_id)
    }
}

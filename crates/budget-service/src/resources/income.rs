//! 收入

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{money, not_blank, positive_amount};
use crate::crud::{Fields, Resource, empty_string_as_none, string_or_number, trimmed};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IncomeInput {
    #[validate(
        length(min = 1, max = 100, message = "收入来源长度必须在1-100个字符之间"),
        custom(function = "not_blank")
    )]
    pub source: String,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub date: NaiveDate,
    #[validate(length(max = 500, message = "描述最长 500 字符"))]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Income;

#[async_trait]
impl Resource for Income {
    const TABLE: &'static str = "income";
    const ENTITY: &'static str = "income";
    type Input = IncomeInput;

    fn into_fields(&self, input: IncomeInput) -> Fields {
        Fields::new()
            .with("source", input.source.trim())
            .with("amount", money(input.amount))
            .with("date", input.date)
            .with("description", trimmed(input.description))
            .with("user_id", input.user_id)
    }
}

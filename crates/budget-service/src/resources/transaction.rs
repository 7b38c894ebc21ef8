//! 支出流水

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{money, positive_amount};
use crate::crud::{Fields, Resource, empty_string_as_none, string_or_number, trimmed};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub category_id: Uuid,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "描述最长 500 字符"))]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Transactions;

#[async_trait]
impl Resource for Transactions {
    const TABLE: &'static str = "transactions";
    const ENTITY: &'static str = "transaction";
    type Input = TransactionInput;

    fn into_fields(&self, input: TransactionInput) -> Fields {
        Fields::new()
            .with("category_id", input.category_id)
            .with("amount", money(input.amount))
            .with("description", trimmed(input.description))
            .with("date", input.date)
            .with("user_id", input.user_id)
    }
}

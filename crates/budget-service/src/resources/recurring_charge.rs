//! 周期性扣费（订阅、房租等）

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{money, not_blank, positive_amount};
use crate::crud::{Fields, Resource, checkbox, empty_string_as_none, string_or_number};

/// 扣费周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecurringChargeInput {
    #[validate(
        length(min = 1, max = 100, message = "名称长度必须在1-100个字符之间"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    pub frequency: Frequency,
    pub next_due_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category_id: Option<Uuid>,
    /// 未勾选的复选框不会出现在表单里，缺失即停用
    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RecurringCharges;

#[async_trait]
impl Resource for RecurringCharges {
    const TABLE: &'static str = "recurring_charges";
    const ENTITY: &'static str = "recurring charge";
    type Input = RecurringChargeInput;

    fn into_fields(&self, input: RecurringChargeInput) -> Fields {
        Fields::new()
            .with("name", input.name.trim())
            .with("amount", money(input.amount))
            .with("frequency", input.frequency.as_str())
            .with("next_due_date", input.next_due_date)
            .with("category_id", input.category_id)
            .with("is_active", input.is_active)
            .with("user_id", input.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crud::{CrudActions, FieldValue, MockRecordStore};
    use crate::resources::test_support::actor;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_frequency_is_restricted() {
        let payload = |frequency: &str| {
            serde_json::json!({
                "name": "Streaming",
                "amount": "15.99",
                "frequency": frequency,
                "nextDueDate": "2026-11-01",
                "categoryId": ""
            })
        };

        let input: RecurringChargeInput = serde_json::from_value(payload("monthly")).unwrap();
        assert_eq!(input.frequency, Frequency::Monthly);
        assert!(input.category_id.is_none());

        assert!(serde_json::from_value::<RecurringChargeInput>(payload("daily")).is_err());
    }

    #[test]
    fn test_active_flag_follows_payload() {
        let input: RecurringChargeInput = serde_json::from_value(serde_json::json!({
            "name": "Rent",
            "amount": 1800,
            "frequency": "monthly",
            "nextDueDate": "2026-11-01",
            "isActive": true
        }))
        .unwrap();

        let fields = RecurringCharges.into_fields(input);
        assert_eq!(fields.get("is_active"), Some(&FieldValue::Bool(Some(true))));
        assert_eq!(fields.get("frequency").and_then(FieldValue::as_text), Some("monthly"));
    }

    #[tokio::test]
    async fn test_form_update_without_checkbox_deactivates() {
        let id = Uuid::now_v7();
        let mut store = MockRecordStore::new();
        store
            .expect_update()
            .withf(|table, _, fields| {
                table == "recurring_charges"
                    && fields.get("is_active") == Some(&FieldValue::Bool(Some(false)))
            })
            .times(1)
            .returning(move |_, _, _| Ok(Some(json!({ "id": id, "is_active": false }))));

        let input: RecurringChargeInput = serde_urlencoded::from_str(
            "name=Netflix&amount=15.99&frequency=monthly&nextDueDate=2026-11-01",
        )
        .unwrap();
        assert!(!input.is_active);

        let actions = CrudActions::new(RecurringCharges, Arc::new(store));
        let record = actions.update(&actor(), id, input).await.unwrap();
        assert_eq!(record["is_active"], json!(false));
    }
}

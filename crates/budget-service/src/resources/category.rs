//! 支出分类

use std::borrow::Cow;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::not_blank;
use crate::crud::{Fields, HookContext, Resource, empty_string_as_none, trimmed};
use crate::error::{AdminError, Result};

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("颜色正则无效"));

fn hex_color(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() || HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color").with_message(Cow::Borrowed("颜色必须是 #RRGGBB 格式")))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[validate(
        length(min = 1, max = 50, message = "分类名称长度必须在1-50个字符之间"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(length(max = 500, message = "描述最长 500 字符"))]
    pub description: Option<String>,
    #[validate(custom(function = "hex_color"))]
    pub color: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Categories;

#[async_trait]
impl Resource for Categories {
    const TABLE: &'static str = "categories";
    const ENTITY: &'static str = "category";
    type Input = CategoryInput;

    fn into_fields(&self, input: CategoryInput) -> Fields {
        Fields::new()
            .with("name", input.name)
            .with("description", trimmed(input.description))
            .with("color", trimmed(input.color).map(|c| c.to_lowercase()))
            .with("user_id", input.user_id)
    }

    async fn transform(&self, _ctx: &HookContext<'_>, mut fields: Fields) -> Result<Fields> {
        if let Some(name) = fields.get("name").and_then(|v| v.as_text()) {
            let name = name.trim().to_string();
            fields.set("name", name);
        }
        Ok(fields)
    }

    /// 仍被交易或预算引用的分类不能删除
    async fn before_delete(&self, ctx: &HookContext<'_>, id: Uuid) -> Result<()> {
        let transactions = ctx.store.count_where("transactions", "category_id", id).await?;
        let budgets = ctx.store.count_where("budgets", "category_id", id).await?;

        if transactions > 0 || budgets > 0 {
            return Err(AdminError::Rejected(format!(
                "Cannot delete category: it is used by {transactions} transaction(s) and {budgets} budget(s)"
            )));
        }
        Ok(())
    }
}

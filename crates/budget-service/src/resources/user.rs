//! 家庭成员账户
//!
//! 只有管理员能访问。明文密码在 `transform` 中换成 bcrypt 哈希，
//! 返回给客户端的记录不包含 `password_hash`。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::auth::hash_password;
use crate::crud::{Fields, HookContext, Record, Resource, checkbox, empty_string_as_none};
use crate::error::{AdminError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    #[validate(
        length(min = 1, max = 100, message = "姓名长度必须在1-100个字符之间"),
        custom(function = "not_blank")
    )]
    pub name: String,
    #[validate(email(message = "邮箱格式不正确"))]
    pub email: String,
    /// 更新时留空表示不修改密码
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(length(min = 8, max = 72, message = "密码长度必须在8-72个字符之间"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    /// 缺失即解除封禁
    #[serde(default, deserialize_with = "checkbox")]
    pub is_banned: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Users;

#[async_trait]
impl Resource for Users {
    const TABLE: &'static str = "users";
    const ENTITY: &'static str = "user";
    const OWNER_COLUMN: Option<&'static str> = None;
    type Input = UserInput;

    fn into_fields(&self, input: UserInput) -> Fields {
        let mut fields = Fields::new()
            .with("name", input.name.trim())
            .with("email", input.email)
            .with("is_banned", input.is_banned);
        if let Some(role) = input.role {
            fields.set("role", role.as_str());
        }
        if let Some(password) = input.password {
            fields.set("password", password);
        }
        fields
    }

    async fn before_create(&self, _ctx: &HookContext<'_>, fields: &Fields) -> Result<()> {
        if !fields.contains("password") {
            return Err(AdminError::Validation("新用户必须设置密码".to_string()));
        }
        Ok(())
    }

    async fn transform(&self, _ctx: &HookContext<'_>, mut fields: Fields) -> Result<Fields> {
        if let Some(email) = fields.get("email").and_then(|v| v.as_text()) {
            let normalized = email.trim().to_lowercase();
            fields.set("email", normalized);
        }
        if let Some(password) = fields.remove("password") {
            if let Some(plain) = password.as_text() {
                fields.set("password_hash", hash_password(plain)?);
            }
        }
        Ok(fields)
    }

    async fn before_delete(&self, ctx: &HookContext<'_>, id: Uuid) -> Result<()> {
        if ctx.actor.id == id {
            return Err(AdminError::Rejected("You cannot delete your own account".to_string()));
        }
        Ok(())
    }

    fn redact(&self, record: &mut Record) {
        if let Some(obj) = record.as_object_mut() {
            obj.remove("password_hash");
        }
    }
}

//! 通用 CRUD 动作工厂
//!
//! 每个实体实现 [`Resource`]：声明目标表、实体名、输入结构（serde + validator），
//! 以及若干可选的生命周期钩子。[`CrudActions`] 基于这些声明统一生成
//! create / update / delete / list / get 操作，负责校验、剥离客户端 ID、
//! 填充所有者与审计字段，并在合适的时机调用钩子。
//!
//! 钩子执行顺序：
//!
//! | 操作   | 顺序                                                             |
//! |--------|------------------------------------------------------------------|
//! | create | validate → before_create → transform → 写审计字段 → insert → after_create |
//! | update | validate → before_update → transform → 写审计字段 → update → after_update |
//! | delete | before_delete（可否决）→ delete → after_delete                    |

mod actions;
mod store;

pub use actions::CrudActions;
pub use store::{PgRecordStore, Record, RecordStore, record_decimal, record_uuid};

#[cfg(test)]
pub use store::MockRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::Validate;

use crate::auth::Claims;
use crate::error::Result;

/// 列值
///
/// 每种类型都可为 NULL，绑定参数时按变体选择 SQL 类型
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(Option<String>),
    Decimal(Option<Decimal>),
    Date(Option<NaiveDate>),
    Int(Option<i32>),
    Bool(Option<bool>),
    Uuid(Option<Uuid>),
    Timestamp(Option<DateTime<Utc>>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            Self::Text(v) => v.is_none(),
            Self::Decimal(v) => v.is_none(),
            Self::Date(v) => v.is_none(),
            Self::Int(v) => v.is_none(),
            Self::Bool(v) => v.is_none(),
            Self::Uuid(v) => v.is_none(),
            Self::Timestamp(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => v.as_deref(),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(v) => *v,
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Decimal(v) => *v,
            _ => None,
        }
    }
}

macro_rules! impl_field_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(Some(value))
                }
            }

            impl From<Option<$ty>> for FieldValue {
                fn from(value: Option<$ty>) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_field_value_from! {
    String => Text,
    Decimal => Decimal,
    NaiveDate => Date,
    i32 => Int,
    bool => Bool,
    Uuid => Uuid,
    DateTime<Utc> => Timestamp,
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(Some(value.to_string()))
    }
}

/// 有序的 列名 → 值 集合
///
/// 列名只来自代码中的静态字符串，拼接 SQL 时不会引入外部输入
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// 构建器风格的 `set`
    pub fn with(mut self, column: &'static str, value: impl Into<FieldValue>) -> Self {
        self.set(column, value);
        self
    }

    /// 设置列值，已存在时原位替换
    pub fn set(&mut self, column: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn remove(&mut self, column: &str) -> Option<FieldValue> {
        let index = self.0.iter().position(|(c, _)| *c == column)?;
        Some(self.0.remove(index).1)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|(c, _)| *c == column)
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.0.iter().map(|(c, _)| *c).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, FieldValue)> {
        self.0.iter()
    }
}

impl IntoIterator for Fields {
    type Item = (&'static str, FieldValue);
    type IntoIter = std::vec::IntoIter<(&'static str, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// 发起操作的用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub is_admin: bool,
}

impl Actor {
    pub fn from_claims(claims: &Claims) -> Result<Self> {
        Ok(Self {
            id: claims.user_id()?,
            is_admin: claims.has_role("admin"),
        })
    }
}

/// 钩子可访问的上下文
pub struct HookContext<'a> {
    pub store: &'a dyn RecordStore,
    pub actor: &'a Actor,
    pub now: DateTime<Utc>,
}

/// 一个可被 CRUD 工厂管理的实体
///
/// 所有钩子都有空实现，实体只覆盖自己需要的部分。
/// `before_*` 返回 `AdminError::Rejected` 即可否决操作，消息会原样返回给调用方。
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// 目标表名
    const TABLE: &'static str;
    /// 实体名，用于日志、指标和错误消息
    const ENTITY: &'static str;
    /// 所有者列，创建时未提供则填入当前用户
    const OWNER_COLUMN: Option<&'static str> = Some("user_id");

    /// 表单 / JSON 输入
    type Input: DeserializeOwned + Validate + Send + 'static;

    /// 把已校验的输入转换为列值
    fn into_fields(&self, input: Self::Input) -> Fields;

    async fn before_create(&self, _ctx: &HookContext<'_>, _fields: &Fields) -> Result<()> {
        Ok(())
    }

    /// create 与 update 共用的字段转换
    async fn transform(&self, _ctx: &HookContext<'_>, fields: Fields) -> Result<Fields> {
        Ok(fields)
    }

    async fn after_create(&self, _ctx: &HookContext<'_>, _record: &Record) -> Result<()> {
        Ok(())
    }

    async fn before_update(&self, _ctx: &HookContext<'_>, _id: Uuid, _fields: &Fields) -> Result<()> {
        Ok(())
    }

    async fn after_update(&self, _ctx: &HookContext<'_>, _record: &Record) -> Result<()> {
        Ok(())
    }

    async fn before_delete(&self, _ctx: &HookContext<'_>, _id: Uuid) -> Result<()> {
        Ok(())
    }

    async fn after_delete(&self, _ctx: &HookContext<'_>, _record: &Record) -> Result<()> {
        Ok(())
    }

    /// 返回给客户端前去掉敏感列
    fn redact(&self, _record: &mut Record) {}
}

/// 表单里的空字符串视为未填写
///
/// 用于 `Option<Uuid>`、`Option<NaiveDate>`、`Option<Decimal>` 等字段，HTML 表单无法提交 null。
/// 字符串和 JSON 数字都按 `FromStr` 解析，金额不会经过 f64。
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrValue {
        Str(String),
        Num(serde_json::Number),
        Null(Option<()>),
    }

    match StringOrValue::deserialize(deserializer)? {
        StringOrValue::Str(s) if s.trim().is_empty() => Ok(None),
        StringOrValue::Str(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        StringOrValue::Num(n) => n.to_string().parse().map(Some).map_err(serde::de::Error::custom),
        StringOrValue::Null(_) => Ok(None),
    }
}

/// 必填版本的 [`empty_string_as_none`]，主要用于金额
pub fn string_or_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    empty_string_as_none(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("值不能为空"))
}

/// HTML 复选框：勾选时提交 "on"，未勾选时不提交；JSON 直接给布尔值
///
/// 配合 `#[serde(default)]` 使用，字段缺失即为 `false`。
pub fn checkbox<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Str(String),
        Null(Option<()>),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(true),
            "" | "off" | "false" | "0" | "no" => Ok(false),
            other => Err(serde::de::Error::custom(format!("无法识别的布尔值: {other}"))),
        },
        Flag::Null(_) => Ok(false),
    }
}

/// 去掉首尾空白，空字符串视为 NULL
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[test]
    fn test_fields_set_replaces_in_place() {
        let mut fields = Fields::new()
            .with("name", "Groceries")
            .with("amount", dec!(500));
        fields.set("name", "Food");

        assert_eq!(fields.columns(), vec!["name", "amount"]);
        assert_eq!(fields.get("name").and_then(FieldValue::as_text), Some("Food"));
        assert_eq!(fields.get("amount").and_then(FieldValue::as_decimal), Some(dec!(500)));
    }

    #[test]
    fn test_fields_remove() {
        let mut fields = Fields::new().with("id", Uuid::nil()).with("name", "x");
        assert!(fields.remove("id").is_some());
        assert!(!fields.contains("id"));
        assert!(fields.remove("id").is_none());
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_field_value_null_detection() {
        assert!(FieldValue::from(None::<Uuid>).is_null());
        assert!(FieldValue::Text(None).is_null());
        assert!(!FieldValue::from(true).is_null());
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(trimmed(Some("  Rent ".into())), Some("Rent".into()));
        assert_eq!(trimmed(Some("   ".into())), None);
        assert_eq!(trimmed(None), None);
    }

    #[derive(Deserialize)]
    struct OptionalCategory {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        category_id: Option<Uuid>,
    }

    #[test]
    fn test_empty_string_as_none() {
        let p: OptionalCategory = serde_json::from_str(r#"{"category_id": ""}"#).unwrap();
        assert!(p.category_id.is_none());

        let p: OptionalCategory = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert!(p.category_id.is_none());

        let p: OptionalCategory = serde_json::from_str(r#"{}"#).unwrap();
        assert!(p.category_id.is_none());

        let id = Uuid::now_v7();
        let p: OptionalCategory = serde_json::from_str(&format!(r#"{{"category_id": "{id}"}}"#)).unwrap();
        assert_eq!(p.category_id, Some(id));

        assert!(serde_json::from_str::<OptionalCategory>(r#"{"category_id": "nope"}"#).is_err());
    }

    #[derive(Deserialize)]
    struct OptionalAmount {
        #[serde(default, deserialize_with = "empty_string_as_none")]
        amount: Option<Decimal>,
    }

    #[test]
    fn test_empty_string_as_none_accepts_numbers() {
        let p: OptionalAmount = serde_json::from_str(r#"{"amount": 12.5}"#).unwrap();
        assert_eq!(p.amount, Some(dec!(12.5)));

        let p: OptionalAmount = serde_json::from_str(r#"{"amount": "99.99"}"#).unwrap();
        assert_eq!(p.amount, Some(dec!(99.99)));
    }

    #[derive(Debug, Deserialize)]
    struct RequiredAmount {
        #[serde(deserialize_with = "string_or_number")]
        amount: Decimal,
    }

    #[derive(Deserialize)]
    struct Toggle {
        #[serde(default, deserialize_with = "checkbox")]
        active: bool,
    }

    #[test]
    fn test_checkbox_values() {
        let parse = |v: serde_json::Value| {
            serde_json::from_value::<Toggle>(serde_json::json!({ "active": v }))
                .map(|t| t.active)
        };
        assert!(parse(serde_json::json!("on")).unwrap());
        assert!(!parse(serde_json::json!("false")).unwrap());
        assert!(parse(serde_json::json!(true)).unwrap());
        assert!(!parse(serde_json::json!("")).unwrap());
        assert!(!parse(serde_json::Value::Null).unwrap());
        assert!(parse(serde_json::json!("maybe")).is_err());
    }

    #[test]
    fn test_unchecked_checkbox_is_false() {
        let t: Toggle = serde_urlencoded::from_str("other=1").unwrap();
        assert!(!t.active);
        let t: Toggle = serde_urlencoded::from_str("active=on").unwrap();
        assert!(t.active);
    }

    #[test]
    fn test_string_or_number_requires_value() {
        let p: RequiredAmount = serde_json::from_str(r#"{"amount": "0.10"}"#).unwrap();
        assert_eq!(p.amount, dec!(0.10));
        assert!(serde_json::from_str::<RequiredAmount>(r#"{"amount": ""}"#).is_err());
    }
}

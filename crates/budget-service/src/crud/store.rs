//! 记录存储
//!
//! `RecordStore` 以 JSON 形式读写任意实体表，CRUD 工厂和钩子都只依赖这个 trait。
//! `PgRecordStore` 基于 `sqlx::QueryBuilder` 拼接语句并用 `to_jsonb` 返回整行。

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{FieldValue, Fields};
use crate::error::{AdminError, Result};

/// 一行记录，键为列名
pub type Record = serde_json::Value;

/// 读取记录中的 UUID 列
pub fn record_uuid(record: &Record, column: &str) -> Option<Uuid> {
    record
        .get(column)
        .and_then(|v| v.as_str())
        .and_then(|s| Uuid::parse_str(s).ok())
}

/// 读取记录中的金额列（NUMERIC 在 jsonb 中是数字）
pub fn record_decimal(record: &Record, column: &str) -> Option<Decimal> {
    match record.get(column)? {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

/// 实体表的存储抽象
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 插入一行并返回写入后的完整记录
    async fn insert(&self, table: &'static str, fields: Fields) -> Result<Record>;

    /// 按 ID 更新，记录不存在时返回 None
    async fn update(&self, table: &'static str, id: Uuid, fields: Fields) -> Result<Option<Record>>;

    /// 按 ID 删除，返回被删除的记录
    async fn delete(&self, table: &'static str, id: Uuid) -> Result<Option<Record>>;

    async fn get(&self, table: &'static str, id: Uuid) -> Result<Option<Record>>;

    /// 按创建时间倒序分页
    async fn list(&self, table: &'static str, limit: i64, offset: i64) -> Result<Vec<Record>>;

    async fn count(&self, table: &'static str) -> Result<i64>;

    /// `SELECT COUNT(*) FROM table WHERE column = value`
    async fn count_where(&self, table: &'static str, column: &'static str, value: Uuid) -> Result<i64>;

    /// `SELECT SUM(sum_column) FROM table WHERE column = value`，无记录时为 0
    async fn sum_where(
        &self,
        table: &'static str,
        sum_column: &'static str,
        column: &'static str,
        value: Uuid,
    ) -> Result<Decimal>;
}

/// PostgreSQL 实现
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 按变体绑定参数
fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: FieldValue) {
    match value {
        FieldValue::Text(v) => qb.push_bind(v),
        FieldValue::Decimal(v) => qb.push_bind(v),
        FieldValue::Date(v) => qb.push_bind(v),
        FieldValue::Int(v) => qb.push_bind(v),
        FieldValue::Bool(v) => qb.push_bind(v),
        FieldValue::Uuid(v) => qb.push_bind(v),
        FieldValue::Timestamp(v) => qb.push_bind(v),
    };
}

/// 把约束冲突翻译成调用方能理解的错误，其余仍按数据库错误处理
fn map_write_error(err: sqlx::Error) -> AdminError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AdminError::Rejected("已存在相同的记录".to_string());
        }
        if db.is_foreign_key_violation() {
            return AdminError::Rejected("关联的记录不存在或仍被其他记录引用".to_string());
        }
        if db.is_check_violation() {
            return AdminError::Validation(format!("字段取值不合法: {}", db.message()));
        }
    }
    AdminError::Database(err)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, table: &'static str, fields: Fields) -> Result<Record> {
        if fields.is_empty() {
            return Err(AdminError::Validation("没有可写入的字段".to_string()));
        }

        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(table).push(" AS t (");
        qb.push(fields.columns().join(", "));
        qb.push(") VALUES (");
        for (i, (_, value)) in fields.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(") RETURNING to_jsonb(t.*)");

        qb.build_query_scalar::<Record>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update(&self, table: &'static str, id: Uuid, fields: Fields) -> Result<Option<Record>> {
        if fields.is_empty() {
            return self.get(table, id).await;
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE ");
        qb.push(table).push(" AS t SET ");
        for (i, (column, value)) in fields.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column).push(" = ");
            push_value(&mut qb, value);
        }
        qb.push(" WHERE t.id = ");
        qb.push_bind(id);
        qb.push(" RETURNING to_jsonb(t.*)");

        qb.build_query_scalar::<Record>()
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete(&self, table: &'static str, id: Uuid) -> Result<Option<Record>> {
        let sql = format!("DELETE FROM {table} AS t WHERE t.id = $1 RETURNING to_jsonb(t.*)");
        sqlx::query_scalar::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get(&self, table: &'static str, id: Uuid) -> Result<Option<Record>> {
        let sql = format!("SELECT to_jsonb(t.*) FROM {table} t WHERE t.id = $1");
        let record = sqlx::query_scalar::<_, Record>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn list(&self, table: &'static str, limit: i64, offset: i64) -> Result<Vec<Record>> {
        let sql = format!(
            "SELECT to_jsonb(t.*) FROM {table} t ORDER BY t.created_at DESC, t.id DESC LIMIT $1 OFFSET $2"
        );
        let records = sqlx::query_scalar::<_, Record>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn count(&self, table: &'static str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let total: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn count_where(&self, table: &'static str, column: &'static str, value: Uuid) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {table} WHERE {column} = $1");
        let total: i64 = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn sum_where(
        &self,
        table: &'static str,
        sum_column: &'static str,
        column: &'static str,
        value: Uuid,
    ) -> Result<Decimal> {
        let sql =
            format!("SELECT COALESCE(SUM({sum_column}), 0) FROM {table} WHERE {column} = $1");
        let total: Decimal = sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}

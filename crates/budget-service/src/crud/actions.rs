//! CRUD 动作

use std::sync::Arc;

use budget_shared::observability::metrics;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{Actor, FieldValue, HookContext, Record, RecordStore, Resource};
use crate::dto::{PageResponse, PaginationParams};
use crate::error::{AdminError, Result};

/// 由 [`Resource`] 声明生成的一组 CRUD 操作
pub struct CrudActions<R: Resource> {
    resource: R,
    store: Arc<dyn RecordStore>,
}

impl<R: Resource> CrudActions<R> {
    pub fn new(resource: R, store: Arc<dyn RecordStore>) -> Self {
        Self { resource, store }
    }

    fn context<'a>(&'a self, actor: &'a Actor) -> HookContext<'a> {
        HookContext {
            store: self.store.as_ref(),
            actor,
            now: Utc::now(),
        }
    }

    /// 创建记录
    ///
    /// 客户端提交的 `id` 一律丢弃，主键始终由服务端生成（UUID v7）
    pub async fn create(&self, actor: &Actor, input: R::Input) -> Result<Record> {
        let result = self.do_create(actor, input).await;
        record_outcome(R::ENTITY, "create", &result);
        result
    }

    async fn do_create(&self, actor: &Actor, input: R::Input) -> Result<Record> {
        input.validate()?;

        let ctx = self.context(actor);
        let fields = self.resource.into_fields(input);
        self.resource.before_create(&ctx, &fields).await?;

        let mut fields = self.resource.transform(&ctx, fields).await?;
        fields.remove("id");

        if let Some(owner) = R::OWNER_COLUMN {
            if fields.get(owner).is_none_or(FieldValue::is_null) {
                fields.set(owner, actor.id);
            }
        }

        let id = Uuid::now_v7();
        fields.set("id", id);
        fields.set("created_at", ctx.now);
        fields.set("created_by", actor.id);
        fields.set("updated_at", ctx.now);
        fields.set("updated_by", actor.id);

        let mut record = self.store.insert(R::TABLE, fields).await?;
        self.resource.after_create(&ctx, &record).await?;

        info!(entity = R::ENTITY, id = %id, actor = %actor.id, "记录已创建");
        self.resource.redact(&mut record);
        Ok(record)
    }

    /// 更新记录
    pub async fn update(&self, actor: &Actor, id: Uuid, input: R::Input) -> Result<Record> {
        let result = self.do_update(actor, id, input).await;
        record_outcome(R::ENTITY, "update", &result);
        result
    }

    async fn do_update(&self, actor: &Actor, id: Uuid, input: R::Input) -> Result<Record> {
        input.validate()?;

        let ctx = self.context(actor);
        let fields = self.resource.into_fields(input);
        self.resource.before_update(&ctx, id, &fields).await?;

        let mut fields = self.resource.transform(&ctx, fields).await?;
        for column in ["id", "created_at", "created_by"] {
            fields.remove(column);
        }
        // 未提交所有者时保留原值
        if let Some(owner) = R::OWNER_COLUMN {
            if fields.get(owner).is_some_and(FieldValue::is_null) {
                fields.remove(owner);
            }
        }
        fields.set("updated_at", ctx.now);
        fields.set("updated_by", actor.id);

        let mut record = self
            .store
            .update(R::TABLE, id, fields)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))?;
        self.resource.after_update(&ctx, &record).await?;

        info!(entity = R::ENTITY, id = %id, actor = %actor.id, "记录已更新");
        self.resource.redact(&mut record);
        Ok(record)
    }

    /// 删除记录，`before_delete` 可以否决
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<Record> {
        let result = self.do_delete(actor, id).await;
        record_outcome(R::ENTITY, "delete", &result);
        result
    }

    async fn do_delete(&self, actor: &Actor, id: Uuid) -> Result<Record> {
        let ctx = self.context(actor);

        if let Err(e) = self.resource.before_delete(&ctx, id).await {
            warn!(entity = R::ENTITY, id = %id, reason = %e, "删除被拒绝");
            return Err(e);
        }

        let mut record = self
            .store
            .delete(R::TABLE, id)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))?;
        self.resource.after_delete(&ctx, &record).await?;

        info!(entity = R::ENTITY, id = %id, actor = %actor.id, "记录已删除");
        self.resource.redact(&mut record);
        Ok(record)
    }

    /// 分页列表，最新的在前
    pub async fn list(&self, params: &PaginationParams) -> Result<PageResponse<Record>> {
        let limit = params.limit();
        let mut items = self.store.list(R::TABLE, limit, params.offset()).await?;
        let total = self.store.count(R::TABLE).await?;

        for item in &mut items {
            self.resource.redact(item);
        }
        Ok(PageResponse::new(items, total, params.page.max(1), limit))
    }

    pub async fn get(&self, id: Uuid) -> Result<Record> {
        let mut record = self
            .store
            .get(R::TABLE, id)
            .await?
            .ok_or_else(|| AdminError::not_found(R::ENTITY, id))?;
        self.resource.redact(&mut record);
        Ok(record)
    }
}

fn record_outcome(entity: &str, action: &str, result: &Result<Record>) {
    let status = match result {
        Ok(_) => "success",
        Err(AdminError::Validation(_) | AdminError::Rejected(_)) => "rejected",
        Err(AdminError::NotFound { .. }) => "not_found",
        Err(_) => "error",
    };
    metrics::record_crud_operation(entity, action, status);
}

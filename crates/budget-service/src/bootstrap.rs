//! 首次启动初始化
//!
//! 用户管理接口需要管理员 Token，空库时没有人能登录，
//! 因此在 `users` 表为空时用环境变量里的账户创建第一个管理员。

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::crud::{Actor, CrudActions, Record, RecordStore, Resource};
use crate::error::Result;
use crate::resources::{Role, UserInput, Users};

/// 初始化操作记在 nil 用户名下
const SYSTEM_ACTOR_ID: Uuid = Uuid::nil();

/// 初始管理员账户
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 没有任何用户时创建管理员，已有用户则什么都不做
///
/// `seed` 只在确实需要创建时才会被调用。
pub async fn ensure_admin<F>(store: Arc<dyn RecordStore>, seed: F) -> Result<Option<Record>>
where
    F: FnOnce() -> AdminSeed,
{
    if store.count(Users::TABLE).await? > 0 {
        return Ok(None);
    }

    let seed = seed();
    let input = UserInput {
        name: seed.name,
        email: seed.email,
        password: Some(seed.password),
        role: Some(Role::Admin),
        is_banned: false,
    };
    let actor = Actor {
        id: SYSTEM_ACTOR_ID,
        is_admin: true,
    };

    let record = CrudActions::new(Users, store).create(&actor, input).await?;
    info!(email = ?record.get("email"), "已创建初始管理员账户");
    Ok(Some(record))
}
